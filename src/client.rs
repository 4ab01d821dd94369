use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use futures::future::{self, BoxFuture, FutureExt};
use http::HeaderValue;
use tracing::debug;

use crate::chain::ExecutionChain;
use crate::config::{Method, RequestBody, RequestConfig, ResponseType};
use crate::error::{Error, Result};
use crate::interceptor::Interceptors;
use crate::merge::merge_config;
use crate::response::Response;
use crate::transport::{HttpTransport, Transport};
use crate::url_builder::transform_url;

/// The eventual outcome of a request
pub type ResponseFuture = BoxFuture<'static, Result<Response>>;

/// The ways a request can be described
#[derive(Debug, Clone)]
pub enum RequestInput {
    /// Only a URL; everything else comes from the defaults
    Url(String),
    /// A full config
    Config(RequestConfig),
    /// A URL plus the rest of the config
    UrlWithConfig(String, RequestConfig),
}

impl RequestInput {
    fn into_config(self) -> RequestConfig {
        match self {
            RequestInput::Url(url) => RequestConfig::new().url(url),
            RequestInput::Config(config) => config,
            RequestInput::UrlWithConfig(url, config) => config.url(url),
        }
    }
}

impl From<&str> for RequestInput {
    fn from(url: &str) -> Self {
        RequestInput::Url(url.to_string())
    }
}

impl From<String> for RequestInput {
    fn from(url: String) -> Self {
        RequestInput::Url(url)
    }
}

impl From<RequestConfig> for RequestInput {
    fn from(config: RequestConfig) -> Self {
        RequestInput::Config(config)
    }
}

impl From<(&str, RequestConfig)> for RequestInput {
    fn from((url, config): (&str, RequestConfig)) -> Self {
        RequestInput::UrlWithConfig(url.to_string(), config)
    }
}

impl From<(String, RequestConfig)> for RequestInput {
    fn from((url, config): (String, RequestConfig)) -> Self {
        RequestInput::UrlWithConfig(url, config)
    }
}

/// Main HTTP client for rxios
///
/// Every call merges its config over the client defaults, runs the request
/// interceptors, dispatches through the transport, and runs the response
/// interceptors. Clones share defaults, interceptors and transport.
///
/// # Examples
///
/// ```rust,no_run
/// use rxios::Client;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = Client::new();
///     let response = client.get("https://httpbin.org/json", None).await?;
///     println!("Status: {}", response.status());
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Client {
    defaults: Arc<RwLock<RequestConfig>>,
    interceptors: Interceptors,
    transport: Arc<dyn Transport>,
}

impl Client {
    /// Create a new client with default settings
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a new client builder
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Get the interceptor registries
    pub fn interceptors(&self) -> &Interceptors {
        &self.interceptors
    }

    /// Get a copy of the current defaults
    pub fn defaults(&self) -> RequestConfig {
        self.defaults
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Change the defaults; later requests see the change
    pub fn update_defaults<F>(&self, update: F)
    where
        F: FnOnce(&mut RequestConfig),
    {
        let mut defaults = self.defaults.write().unwrap_or_else(PoisonError::into_inner);
        update(&mut defaults);
    }

    /// Get the transport
    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    /// Send a request
    ///
    /// The config is merged and the chain is built before this returns, so
    /// interceptors added or ejected afterwards do not affect this request.
    /// A config without a URL fails with [`Error::Config`] before any
    /// interceptor runs.
    pub fn request(&self, input: impl Into<RequestInput>) -> ResponseFuture {
        let config = merge_config(&self.defaults(), input.into().into_config());
        if config.url.is_none() {
            return future::ready(Err(Error::config("url is required"))).boxed();
        }

        let chain = ExecutionChain::build(&self.interceptors, self.transport.clone());

        debug!(
            method = %config.method.unwrap_or_default(),
            url = config.url.as_deref().unwrap_or(""),
            steps = chain.len(),
            "starting request"
        );

        chain.run(config).boxed()
    }

    /// Send a GET request
    pub fn get(&self, url: &str, config: Option<RequestConfig>) -> ResponseFuture {
        self.request_without_data(Method::Get, url, config)
    }

    /// Send a DELETE request
    pub fn delete(&self, url: &str, config: Option<RequestConfig>) -> ResponseFuture {
        self.request_without_data(Method::Delete, url, config)
    }

    /// Send a HEAD request
    pub fn head(&self, url: &str, config: Option<RequestConfig>) -> ResponseFuture {
        self.request_without_data(Method::Head, url, config)
    }

    /// Send an OPTIONS request
    pub fn options(&self, url: &str, config: Option<RequestConfig>) -> ResponseFuture {
        self.request_without_data(Method::Options, url, config)
    }

    /// Send a POST request
    pub fn post(&self, url: &str, data: Option<RequestBody>, config: Option<RequestConfig>) -> ResponseFuture {
        self.request_with_data(Method::Post, url, data, config)
    }

    /// Send a PUT request
    pub fn put(&self, url: &str, data: Option<RequestBody>, config: Option<RequestConfig>) -> ResponseFuture {
        self.request_with_data(Method::Put, url, data, config)
    }

    /// Send a PATCH request
    pub fn patch(&self, url: &str, data: Option<RequestBody>, config: Option<RequestConfig>) -> ResponseFuture {
        self.request_with_data(Method::Patch, url, data, config)
    }

    /// Compose the URL a config would be sent to, without sending it
    pub fn get_uri(&self, config: Option<RequestConfig>) -> Result<String> {
        let config = merge_config(&self.defaults(), config.unwrap_or_default());
        transform_url(&config)
    }

    fn request_without_data(&self, method: Method, url: &str, config: Option<RequestConfig>) -> ResponseFuture {
        let config = config.unwrap_or_default().method(method).url(url);
        self.request(config)
    }

    fn request_with_data(
        &self,
        method: Method,
        url: &str,
        data: Option<RequestBody>,
        config: Option<RequestConfig>,
    ) -> ResponseFuture {
        let mut config = config.unwrap_or_default().method(method).url(url);
        config.data = data;
        self.request(config)
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience methods for common JSON operations
impl Client {
    /// Send a GET request and deserialize the JSON body
    pub async fn get_json<T>(&self, url: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.get(url, None).await?.json()
    }

    /// Send a POST request with a JSON body and deserialize the JSON reply
    pub async fn post_json<T, U>(&self, url: &str, body: &T) -> Result<U>
    where
        T: serde::Serialize,
        U: serde::de::DeserializeOwned,
    {
        let data = RequestBody::Json(serde_json::to_value(body)?);
        self.post(url, Some(data), None).await?.json()
    }
}

/// Builder for creating HTTP clients with custom configuration
///
/// # Examples
///
/// ```rust
/// use rxios::ClientBuilder;
/// use std::time::Duration;
///
/// let client = ClientBuilder::new()
///     .timeout(Duration::from_secs(30))
///     .user_agent("MyApp/1.0")
///     .unwrap()
///     .build();
/// ```
pub struct ClientBuilder {
    defaults: RequestConfig,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    /// Create a new client builder
    pub fn new() -> Self {
        Self {
            defaults: RequestConfig::defaults(),
            transport: None,
        }
    }

    /// Replace the defaults entirely
    pub fn defaults(mut self, defaults: RequestConfig) -> Self {
        self.defaults = defaults;
        self
    }

    /// Set the default timeout for all requests
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.defaults.timeout = Some(timeout);
        self
    }

    /// Set the base URL for relative request URLs
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.defaults.base_url = Some(url.into());
        self
    }

    /// Set a default header for all requests
    pub fn default_header(mut self, name: &str, value: &str) -> Result<Self> {
        let name = name.parse::<http::header::HeaderName>()?;
        let value = value.parse::<HeaderValue>()?;
        self.defaults.headers.insert(name, value);
        Ok(self)
    }

    /// Set the user agent
    pub fn user_agent(self, user_agent: &str) -> Result<Self> {
        self.default_header("User-Agent", user_agent)
    }

    /// Set how response bodies are decoded by default
    pub fn response_type(mut self, response_type: ResponseType) -> Self {
        self.defaults.response_type = Some(response_type);
        self
    }

    /// Use a custom transport
    pub fn transport<T>(mut self, transport: T) -> Self
    where
        T: Transport + 'static,
    {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Use a preconfigured reqwest client for the default transport
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.transport = Some(Arc::new(HttpTransport::with_client(client)));
        self
    }

    /// Build the client
    pub fn build(self) -> Client {
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(HttpTransport::new()));

        Client {
            defaults: Arc::new(RwLock::new(self.defaults)),
            interceptors: Interceptors::new(),
            transport,
        }
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
