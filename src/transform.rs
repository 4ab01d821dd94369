use crate::config::{RequestBody, ResponseType};
use crate::error::Result;
use crate::response::ResponseData;

/// Encode a request body into bytes for the transport
pub fn transform_request(data: Option<&RequestBody>) -> Result<Option<Vec<u8>>> {
    let bytes = match data {
        None => return Ok(None),
        Some(RequestBody::Text(text)) => text.as_bytes().to_vec(),
        Some(RequestBody::Json(json)) => serde_json::to_vec(json)?,
        Some(RequestBody::Bytes(bytes)) => bytes.clone(),
        Some(RequestBody::Form(pairs)) => url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish()
            .into_bytes(),
    };
    Ok(Some(bytes))
}

/// Decode a response body according to the requested type
///
/// Never fails: a body that is not valid JSON falls back to text, and a body
/// that is not valid UTF-8 falls back to bytes.
pub fn transform_response(body: Vec<u8>, response_type: ResponseType) -> ResponseData {
    if body.is_empty() {
        return ResponseData::Empty;
    }

    match response_type {
        ResponseType::Bytes => ResponseData::Bytes(body),
        ResponseType::Text => match String::from_utf8(body) {
            Ok(text) => ResponseData::Text(text),
            Err(err) => ResponseData::Bytes(err.into_bytes()),
        },
        ResponseType::Json => match serde_json::from_slice(&body) {
            Ok(json) => ResponseData::Json(json),
            Err(_) => match String::from_utf8(body) {
                Ok(text) => ResponseData::Text(text),
                Err(err) => ResponseData::Bytes(err.into_bytes()),
            },
        },
    }
}
