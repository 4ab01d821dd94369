use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};

use crate::config::RequestConfig;
use crate::error::{Error, Result};
use crate::response::Response;

/// A processor pair attached to one stage of the pipeline
///
/// `on_fulfilled` receives the value produced by the previous step.
/// `on_rejected` receives the previous step's error and may recover by
/// returning a value; the default re-raises it, which is how an absent
/// rejection handler behaves.
#[async_trait]
pub trait Interceptor<T: Send + 'static>: Send + Sync {
    /// Process the value produced by the previous step
    async fn on_fulfilled(&self, value: T) -> Result<T>;

    /// Process the error produced by the previous step
    async fn on_rejected(&self, error: Error) -> Result<T> {
        Err(error)
    }

    /// Get the name of this interceptor
    fn name(&self) -> &str {
        "Unknown"
    }
}

type FulfilledFn<T> = Arc<dyn Fn(T) -> BoxFuture<'static, Result<T>> + Send + Sync>;
type RejectedFn<T> = Arc<dyn Fn(Error) -> BoxFuture<'static, Result<T>> + Send + Sync>;

/// Interceptor built from closures
pub struct FnInterceptor<T> {
    fulfilled: FulfilledFn<T>,
    rejected: Option<RejectedFn<T>>,
    name: String,
}

impl<T: Send + 'static> FnInterceptor<T> {
    /// Create an interceptor with only a fulfillment handler
    pub fn new<F, Fut>(fulfilled: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        Self {
            fulfilled: Arc::new(move |value| fulfilled(value).boxed()),
            rejected: None,
            name: "Fn".to_string(),
        }
    }

    /// Add a rejection handler
    pub fn with_rejection<R, RFut>(mut self, rejected: R) -> Self
    where
        R: Fn(Error) -> RFut + Send + Sync + 'static,
        RFut: Future<Output = Result<T>> + Send + 'static,
    {
        self.rejected = Some(Arc::new(move |error| rejected(error).boxed()));
        self
    }

    /// Set the name reported by [`Interceptor::name`]
    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }
}

#[async_trait]
impl<T: Send + 'static> Interceptor<T> for FnInterceptor<T> {
    async fn on_fulfilled(&self, value: T) -> Result<T> {
        (self.fulfilled)(value).await
    }

    async fn on_rejected(&self, error: Error) -> Result<T> {
        match &self.rejected {
            Some(rejected) => rejected(error).await,
            None => Err(error),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Stable identity of a registered interceptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InterceptorId(usize);

/// Ordered registry of interceptors for one stage
///
/// Ejected entries leave a hole so the ids of the others never shift.
pub struct InterceptorManager<T: Send + 'static> {
    entries: RwLock<Vec<Option<Arc<dyn Interceptor<T>>>>>,
}

impl<T: Send + 'static> InterceptorManager<T> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Register an interceptor
    pub fn add<I>(&self, interceptor: I) -> InterceptorId
    where
        I: Interceptor<T> + 'static,
    {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.push(Some(Arc::new(interceptor)));
        InterceptorId(entries.len() - 1)
    }

    /// Register a fulfillment handler
    pub fn add_fn<F, Fut>(&self, fulfilled: F) -> InterceptorId
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        self.add(FnInterceptor::new(fulfilled))
    }

    /// Register a fulfillment and a rejection handler
    pub fn add_fn_with_rejection<F, Fut, R, RFut>(&self, fulfilled: F, rejected: R) -> InterceptorId
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
        R: Fn(Error) -> RFut + Send + Sync + 'static,
        RFut: Future<Output = Result<T>> + Send + 'static,
    {
        self.add(FnInterceptor::new(fulfilled).with_rejection(rejected))
    }

    /// Remove an interceptor; returns false if it was already gone
    pub fn eject(&self, id: InterceptorId) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        match entries.get_mut(id.0) {
            Some(slot) => slot.take().is_some(),
            None => false,
        }
    }

    /// Visit every registered interceptor in registration order
    pub fn for_each<F>(&self, mut visit: F)
    where
        F: FnMut(&Arc<dyn Interceptor<T>>),
    {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.iter().flatten().for_each(|interceptor| visit(interceptor));
    }

    /// Registered interceptors in registration order
    pub fn snapshot(&self) -> Vec<Arc<dyn Interceptor<T>>> {
        let mut interceptors = Vec::new();
        self.for_each(|interceptor| interceptors.push(interceptor.clone()));
        interceptors
    }

    /// Get the number of registered interceptors
    pub fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.iter().flatten().count()
    }

    /// Check if no interceptor is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Send + 'static> Default for InterceptorManager<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The request-stage and response-stage registries of a client
#[derive(Clone, Default)]
pub struct Interceptors {
    pub request: Arc<InterceptorManager<RequestConfig>>,
    pub response: Arc<InterceptorManager<Response>>,
}

impl Interceptors {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Logging interceptor
///
/// Register it on the request stage, the response stage, or both.
pub struct LoggingInterceptor {
    level: log::Level,
    include_headers: bool,
}

impl LoggingInterceptor {
    /// Create a new logging interceptor
    pub fn new() -> Self {
        Self {
            level: log::Level::Info,
            include_headers: false,
        }
    }

    /// Set the log level
    pub fn level(mut self, level: log::Level) -> Self {
        self.level = level;
        self
    }

    /// Include headers in logs
    pub fn include_headers(mut self, include: bool) -> Self {
        self.include_headers = include;
        self
    }

    fn log_headers(&self, headers: &http::HeaderMap) {
        if self.include_headers {
            for (name, value) in headers {
                log::log!(self.level, "  {}: {}", name, value.to_str().unwrap_or(""));
            }
        }
    }
}

impl Default for LoggingInterceptor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Interceptor<RequestConfig> for LoggingInterceptor {
    async fn on_fulfilled(&self, config: RequestConfig) -> Result<RequestConfig> {
        log::log!(
            self.level,
            "{} {}",
            config.method.unwrap_or_default().to_http(),
            config.url.as_deref().unwrap_or("")
        );
        self.log_headers(&config.headers);
        Ok(config)
    }

    fn name(&self) -> &str {
        "Logging"
    }
}

#[async_trait]
impl Interceptor<Response> for LoggingInterceptor {
    async fn on_fulfilled(&self, response: Response) -> Result<Response> {
        log::log!(self.level, "Response: {}", response.status());
        self.log_headers(response.headers());
        Ok(response)
    }

    async fn on_rejected(&self, error: Error) -> Result<Response> {
        log::log!(self.level, "Request failed: {}", error);
        Err(error)
    }

    fn name(&self) -> &str {
        "Logging"
    }
}
