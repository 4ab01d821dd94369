use std::time::Duration;
use thiserror::Error;

use crate::config::RequestConfig;
use crate::response::Response;

/// Result type for rxios operations
pub type Result<T> = std::result::Result<T, Error>;

/// Code attached to timeout errors, matching what browsers report for aborted requests
pub const TIMEOUT_CODE: &str = "ECONNABORTED";

/// Main error type for rxios
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid request configuration (method, URL, headers)
    #[error("Invalid request config: {0}")]
    Config(String),

    /// The transport failed without producing an HTTP status
    #[error("Network Error: {message}")]
    Network {
        message: String,
        config: Box<RequestConfig>,
    },

    /// The transport gave up after the configured timeout
    #[error("timeout of {}ms exceeded", .timeout.as_millis())]
    Timeout {
        timeout: Duration,
        code: &'static str,
        config: Box<RequestConfig>,
    },

    /// The request completed but the status failed validation
    #[error("Request failed with status code {}", .response.status().as_u16())]
    Status { response: Box<Response> },

    /// A user-registered interceptor or transform failed
    #[error("Handler error: {0}")]
    Handler(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Config,
    Network,
    Timeout,
    Status,
    Handler,
}

impl Error {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    /// Create a new handler error
    pub fn handler(message: impl Into<String>) -> Self {
        Error::Handler(message.into())
    }

    /// Create a new network error for the given request
    pub fn network(message: impl Into<String>, config: RequestConfig) -> Self {
        Error::Network {
            message: message.into(),
            config: Box::new(config),
        }
    }

    /// Create a new timeout error for the given request
    pub fn timeout(timeout: Duration, config: RequestConfig) -> Self {
        Error::Timeout {
            timeout,
            code: TIMEOUT_CODE,
            config: Box::new(config),
        }
    }

    /// Create a new status error carrying the rejected response
    pub fn status(response: Response) -> Self {
        Error::Status {
            response: Box::new(response),
        }
    }

    /// Get the kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_) => ErrorKind::Config,
            Error::Network { .. } => ErrorKind::Network,
            Error::Timeout { .. } => ErrorKind::Timeout,
            Error::Status { .. } => ErrorKind::Status,
            Error::Handler(_) | Error::Json(_) => ErrorKind::Handler,
        }
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }

    /// Check if this is a network error
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Network { .. })
    }

    /// Check if this is a status error
    pub fn is_status(&self) -> bool {
        matches!(self, Error::Status { .. })
    }

    /// Check if this is a configuration error
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_))
    }

    /// Get the response if this is a status error
    pub fn response(&self) -> Option<&Response> {
        match self {
            Error::Status { response } => Some(response),
            _ => None,
        }
    }

    /// Take the response out of a status error
    pub fn into_response(self) -> Option<Response> {
        match self {
            Error::Status { response } => Some(*response),
            _ => None,
        }
    }

    /// Get the config of the request that failed, when known
    pub fn request_config(&self) -> Option<&RequestConfig> {
        match self {
            Error::Network { config, .. } | Error::Timeout { config, .. } => Some(config),
            Error::Status { response } => Some(response.config()),
            _ => None,
        }
    }

    /// Get the error code, if any
    pub fn code(&self) -> Option<&str> {
        match self {
            Error::Timeout { code, .. } => Some(code),
            _ => None,
        }
    }
}

impl From<http::header::InvalidHeaderName> for Error {
    fn from(err: http::header::InvalidHeaderName) -> Self {
        Error::Config(format!("Invalid header name: {}", err))
    }
}

impl From<http::header::InvalidHeaderValue> for Error {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Error::Config(format!("Invalid header value: {}", err))
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Handler(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Handler(s.to_string())
    }
}
