use http::StatusCode;
use tracing::debug;

use crate::config::RequestConfig;
use crate::error::{Error, Result};
use crate::headers::{apply_basic_auth, process_headers};
use crate::response::{Response, SentRequest};
use crate::transform::{transform_request, transform_response};
use crate::transport::{Transport, TransportError, TransportRequest};
use crate::url_builder::transform_url;

/// Statuses that resolve when no `validate_status` is configured: 2xx and 304
pub fn default_validate_status(status: StatusCode) -> bool {
    status.is_success() || status == StatusCode::NOT_MODIFIED
}

/// Send an effective config through the transport
///
/// Composes the final URL, encodes the body, prepares headers, and maps the
/// transport outcome onto [`Response`] or the matching [`Error`]. Failures are
/// never retried.
pub async fn dispatch_request(config: RequestConfig, transport: &dyn Transport) -> Result<Response> {
    let url = transform_url(&config)?;
    let body = transform_request(config.data.as_ref())?;

    let mut headers = config.headers.clone();
    process_headers(&mut headers, config.data.as_ref());
    if let Some(auth) = &config.auth {
        apply_basic_auth(&mut headers, auth)?;
    }

    let method = config.method.unwrap_or_default();
    let response_type = config.response_type.unwrap_or_default();
    let request = TransportRequest::new(method, url, headers, body)
        .timeout(config.effective_timeout())
        .response_type(response_type)
        .extensions(config.extensions.clone());

    let sent = SentRequest {
        method,
        url: request.url.clone(),
        headers: request.headers.clone(),
        transport: transport.name().to_string(),
    };

    debug!(method = %method, url = %sent.url, transport = %sent.transport, "dispatching request");

    let raw = match transport.send(request).await {
        Ok(raw) => raw,
        Err(TransportError::Timeout(timeout)) => {
            debug!(url = %sent.url, ?timeout, "request timed out");
            return Err(Error::timeout(timeout, config));
        }
        Err(TransportError::InvalidUrl { url, source }) => {
            return Err(Error::config(format!("Invalid URL {}: {}", url, source)));
        }
        Err(TransportError::Network(message)) => {
            debug!(url = %sent.url, %message, "network error");
            return Err(Error::network(message, config));
        }
    };

    let status = StatusCode::from_u16(raw.status)
        .map_err(|_| Error::network(format!("Invalid status code {}", raw.status), config.clone()))?;
    let data = transform_response(raw.body, response_type);

    debug!(url = %sent.url, status = status.as_u16(), "response received");

    let response = Response::new(data, status, raw.status_text, raw.headers, config, sent);
    settle(response)
}

/// Resolve or reject a completed response by its status
pub fn settle(response: Response) -> Result<Response> {
    let status = response.status();
    let valid = match &response.config().validate_status {
        Some(validator) => validator.validate(status),
        None => default_validate_status(status),
    };
    if valid {
        Ok(response)
    } else {
        Err(Error::status(response))
    }
}
