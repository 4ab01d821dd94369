use std::time::Duration;

use async_trait::async_trait;
use http::header::CONTENT_TYPE;
use http::HeaderMap;
use reqwest::Client as ReqwestClient;
use serde_json::{Map, Value};
use thiserror::Error;
use url::Url;

use crate::config::{Method, ResponseType};
use crate::headers::parse_headers;

/// A fully prepared request handed to a [`Transport`]
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
    /// `None` means no timeout
    pub timeout: Option<Duration>,
    pub response_type: ResponseType,
    /// Config fields the client passes through untouched
    pub extensions: Map<String, Value>,
}

impl TransportRequest {
    /// Create a transport request; `Content-Type` is dropped when there is no body
    pub fn new(method: Method, url: impl Into<String>, mut headers: HeaderMap, body: Option<Vec<u8>>) -> Self {
        if body.is_none() {
            headers.remove(CONTENT_TYPE);
        }
        Self {
            method,
            url: url.into(),
            headers,
            body,
            timeout: None,
            response_type: ResponseType::default(),
            extensions: Map::new(),
        }
    }

    /// Set the timeout
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the response type
    pub fn response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = response_type;
        self
    }

    /// Set the pass-through fields
    pub fn extensions(mut self, extensions: Map<String, Value>) -> Self {
        self.extensions = extensions;
        self
    }
}

/// What a transport reports for a completed exchange
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Create a response with the canonical status text and no headers or body
    pub fn new(status: u16) -> Self {
        let status_text = http::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("")
            .to_string();
        Self {
            status,
            status_text,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    /// Set the status text
    pub fn status_text(mut self, status_text: impl Into<String>) -> Self {
        self.status_text = status_text.into();
        self
    }

    /// Set the headers
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Set the headers from raw `Name: value` lines
    pub fn raw_headers(mut self, raw: &str) -> Self {
        self.headers = parse_headers(raw);
        self
    }

    /// Set the body
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }
}

/// Transport-level failures
#[derive(Error, Debug)]
pub enum TransportError {
    /// The exchange failed without an HTTP status
    #[error("{0}")]
    Network(String),

    /// The configured timeout elapsed
    #[error("timeout of {}ms exceeded", .0.as_millis())]
    Timeout(Duration),

    /// The request URL could not be used
    #[error("Invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Transport trait for HTTP operations
///
/// A transport performs exactly one exchange per call and reports success,
/// a network failure, or a timeout.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and return the response
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;

    /// Get the transport name/type
    fn name(&self) -> &str;
}

/// Default HTTP transport implementation using reqwest
#[derive(Clone)]
pub struct HttpTransport {
    client: ReqwestClient,
}

impl HttpTransport {
    /// Create a new HTTP transport
    pub fn new() -> Self {
        Self::with_client(ReqwestClient::new())
    }

    /// Create a transport around a configured reqwest client
    pub fn with_client(client: ReqwestClient) -> Self {
        Self { client }
    }

    /// Get the underlying reqwest client
    pub fn client(&self) -> &ReqwestClient {
        &self.client
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let url = Url::parse(&request.url).map_err(|source| TransportError::InvalidUrl {
            url: request.url.clone(),
            source,
        })?;
        let timeout = request.timeout;

        let mut builder = self
            .client
            .request(request.method.to_http(), url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let exchange = async move {
            let response = builder.send().await?;
            let status = response.status();
            let headers = response.headers().clone();
            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>(TransportResponse {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("").to_string(),
                headers,
                body: body.to_vec(),
            })
        };

        let result = if let Some(timeout) = timeout {
            tokio::time::timeout(timeout, exchange)
                .await
                .map_err(|_| TransportError::Timeout(timeout))?
        } else {
            exchange.await
        };

        result.map_err(|err| match timeout {
            Some(timeout) if err.is_timeout() => TransportError::Timeout(timeout),
            _ => TransportError::Network(err.to_string()),
        })
    }

    fn name(&self) -> &str {
        "reqwest"
    }
}
