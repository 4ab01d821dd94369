use http::{HeaderMap, HeaderValue, StatusCode};
use serde_json::Value;

use crate::config::{Method, RequestConfig};
use crate::error::Result;

/// Decoded response body
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseData {
    Empty,
    Text(String),
    Json(Value),
    Bytes(Vec<u8>),
}

impl ResponseData {
    /// Get the body as text, if it was decoded as text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseData::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Get the body as JSON, if it was decoded as JSON
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseData::Json(json) => Some(json),
            _ => None,
        }
    }

    /// Check if the body is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, ResponseData::Empty)
    }
}

/// What the transport was actually asked to send
#[derive(Debug, Clone)]
pub struct SentRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub transport: String,
}

/// HTTP response representation
///
/// Carries the decoded body, status line, parsed headers, the config that
/// produced it, and the request handed to the transport.
#[derive(Debug, Clone)]
pub struct Response {
    data: ResponseData,
    status: StatusCode,
    status_text: String,
    headers: HeaderMap,
    config: RequestConfig,
    request: SentRequest,
}

impl Response {
    /// Create a response
    pub fn new(
        data: ResponseData,
        status: StatusCode,
        status_text: impl Into<String>,
        headers: HeaderMap,
        config: RequestConfig,
        request: SentRequest,
    ) -> Self {
        Self {
            data,
            status,
            status_text: status_text.into(),
            headers,
            config,
            request,
        }
    }

    /// Get the decoded body
    pub fn data(&self) -> &ResponseData {
        &self.data
    }

    /// Get mutable access to the decoded body
    pub fn data_mut(&mut self) -> &mut ResponseData {
        &mut self.data
    }

    /// Take the decoded body
    pub fn into_data(self) -> ResponseData {
        self.data
    }

    /// Get the HTTP status code
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Get the status text reported by the transport
    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    /// Get the response headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get mutable access to headers
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Get a specific header value
    pub fn header(&self, name: &str) -> Option<&HeaderValue> {
        self.headers.get(name)
    }

    /// Get the content type
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
    }

    /// Get the config that produced this response
    pub fn config(&self) -> &RequestConfig {
        &self.config
    }

    /// Get the request handed to the transport
    pub fn request(&self) -> &SentRequest {
        &self.request
    }

    /// Check if the response is successful (2xx status code)
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Check if the response is a client error (4xx status code)
    pub fn is_client_error(&self) -> bool {
        self.status.is_client_error()
    }

    /// Check if the response is a server error (5xx status code)
    pub fn is_server_error(&self) -> bool {
        self.status.is_server_error()
    }

    /// Deserialize the body
    pub fn json<T>(&self) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let value: T = match &self.data {
            ResponseData::Empty => serde_json::from_str("null")?,
            ResponseData::Json(json) => serde::Deserialize::deserialize(json)?,
            ResponseData::Text(text) => serde_json::from_str(text)?,
            ResponseData::Bytes(bytes) => serde_json::from_slice(bytes)?,
        };
        Ok(value)
    }
}
