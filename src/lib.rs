//! rxios - an interceptor-driven async HTTP client for Rust
//!
//! Requests are described by a [`RequestConfig`], merged over the client
//! defaults, and sent through an ordered chain of steps: request
//! interceptors (most recently registered first), the dispatch step that
//! talks to the [`Transport`], and response interceptors (in registration
//! order). Every step may transform the value it receives or recover from
//! the error produced before it.
//!
//! ## Features
//!
//! - **Request and response interceptors** with stable ids for ejection
//! - **Config merging** with per-field strategies (headers are unioned)
//! - **Query serialization** for arrays, dates and nested objects
//! - **Typed errors** that tell network, timeout and status failures apart
//! - **Pluggable transport**, reqwest-backed by default
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rxios::{Client, RequestConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new();
//!     client.interceptors().request.add_fn(|config: RequestConfig| async move {
//!         config.header("X-Requested-With", "rxios")
//!     });
//!
//!     let response = client
//!         .get("https://httpbin.org/get", Some(RequestConfig::new().param("q", "rust")))
//!         .await?;
//!
//!     println!("Status: {}", response.status());
//!     println!("Body: {:?}", response.data());
//!
//!     Ok(())
//! }
//! ```

pub mod chain;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod headers;
pub mod interceptor;
pub mod merge;
pub mod response;
pub mod transform;
pub mod transport;
pub mod url_builder;

// Re-export main types for convenience
pub use client::{Client, ClientBuilder, RequestInput, ResponseFuture};
pub use config::{BasicAuth, Method, ParamValue, Params, RequestBody, RequestConfig, ResponseType};
pub use error::{Error, ErrorKind, Result};
pub use interceptor::{FnInterceptor, Interceptor, InterceptorId, InterceptorManager, Interceptors, LoggingInterceptor};
pub use merge::merge_config;
pub use response::{Response, ResponseData, SentRequest};
pub use transport::{HttpTransport, Transport, TransportError, TransportRequest, TransportResponse};
pub use url_builder::build_url;

// Re-export common HTTP types
pub use http::{HeaderMap, HeaderValue, StatusCode};

// Re-export JSON types
pub use serde_json::{Map as JsonMap, Value as JsonValue};

// Re-export common traits
pub use async_trait::async_trait;
