use http::header::{HeaderName, AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue};

use crate::config::{BasicAuth, RequestBody};
use crate::error::Result;

/// Parse raw header text (`Name: value` lines) into a header map
///
/// Lines without a colon or with an invalid name/value are skipped.
/// Values keep any colons after the first one.
pub fn parse_headers(raw: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();

    for line in raw.split("\r\n").flat_map(|line| line.split('\n')) {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let name = name.trim().to_ascii_lowercase();
        if name.is_empty() {
            continue;
        }
        let (Ok(name), Ok(value)) = (
            name.parse::<HeaderName>(),
            HeaderValue::from_str(value.trim()),
        ) else {
            continue;
        };
        headers.append(name, value);
    }

    headers
}

/// Fill in a `Content-Type` for bodies that need one
pub fn process_headers(headers: &mut HeaderMap, data: Option<&RequestBody>) {
    if headers.contains_key(CONTENT_TYPE) {
        return;
    }
    let content_type = match data {
        Some(RequestBody::Json(_)) => "application/json;charset=utf-8",
        Some(RequestBody::Form(_)) => "application/x-www-form-urlencoded",
        _ => return,
    };
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
}

/// Set an `Authorization: Basic` header from credentials
pub fn apply_basic_auth(headers: &mut HeaderMap, auth: &BasicAuth) -> Result<()> {
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
    let credentials = format!("{}:{}", auth.username, auth.password);
    let encoded = BASE64.encode(credentials.as_bytes());
    let value = format!("Basic {}", encoded).parse::<HeaderValue>()?;
    headers.insert(AUTHORIZATION, value);
    Ok(())
}
