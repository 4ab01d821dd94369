use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use http::{HeaderMap, HeaderValue, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// HTTP verbs understood by the client
///
/// Parsing is case-insensitive and the string form is always lower case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    #[default]
    Get,
    Delete,
    Head,
    Options,
    Post,
    Put,
    Patch,
}

impl Method {
    /// Get the lower-case name of the method
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "get",
            Method::Delete => "delete",
            Method::Head => "head",
            Method::Options => "options",
            Method::Post => "post",
            Method::Put => "put",
            Method::Patch => "patch",
        }
    }

    /// Convert to the `http` crate's method type
    pub fn to_http(&self) -> http::Method {
        match self {
            Method::Get => http::Method::GET,
            Method::Delete => http::Method::DELETE,
            Method::Head => http::Method::HEAD,
            Method::Options => http::Method::OPTIONS,
            Method::Post => http::Method::POST,
            Method::Put => http::Method::PUT,
            Method::Patch => http::Method::PATCH,
        }
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(Method::Get),
            "delete" => Ok(Method::Delete),
            "head" => Ok(Method::Head),
            "options" => Ok(Method::Options),
            "post" => Ok(Method::Post),
            "put" => Ok(Method::Put),
            "patch" => Ok(Method::Patch),
            _ => Err(Error::config(format!("Unsupported method: {}", s))),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request body types
#[derive(Clone, PartialEq)]
pub enum RequestBody {
    /// String body
    Text(String),
    /// JSON body
    Json(Value),
    /// Bytes body
    Bytes(Vec<u8>),
    /// Form data
    Form(Vec<(String, String)>),
}

impl From<Value> for RequestBody {
    fn from(value: Value) -> Self {
        RequestBody::Json(value)
    }
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        RequestBody::Text(text)
    }
}

impl From<&str> for RequestBody {
    fn from(text: &str) -> Self {
        RequestBody::Text(text.to_string())
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(bytes: Vec<u8>) -> Self {
        RequestBody::Bytes(bytes)
    }
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestBody::Text(text) => write!(f, "Text({})", text),
            RequestBody::Json(json) => write!(f, "Json({})", json),
            RequestBody::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
            RequestBody::Form(data) => write!(f, "Form({} pairs)", data.len()),
        }
    }
}

/// How the response body should be decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    /// Try JSON, fall back to text
    #[default]
    Json,
    Text,
    Bytes,
}

/// HTTP basic authentication credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

/// A single query parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Skipped when serializing
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    /// Rendered as an ISO-8601 string
    Date(DateTime<Utc>),
    /// Rendered as repeated `key[]` pairs
    Array(Vec<ParamValue>),
    /// Rendered as JSON text
    Object(Value),
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::String(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::String(s)
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        ParamValue::Bool(b)
    }
}

macro_rules! impl_param_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for ParamValue {
            fn from(n: $t) -> Self {
                ParamValue::Number(n.into())
            }
        })*
    };
}

impl_param_from_int!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize);

impl From<f64> for ParamValue {
    fn from(n: f64) -> Self {
        match serde_json::Number::from_f64(n) {
            Some(n) => ParamValue::Number(n),
            None => ParamValue::String(n.to_string()),
        }
    }
}

impl From<DateTime<Utc>> for ParamValue {
    fn from(date: DateTime<Utc>) -> Self {
        ParamValue::Date(date)
    }
}

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(values: Vec<T>) -> Self {
        ParamValue::Array(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(ParamValue::Null)
    }
}

impl From<Value> for ParamValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ParamValue::Null,
            Value::Bool(b) => ParamValue::Bool(b),
            Value::Number(n) => ParamValue::Number(n),
            Value::String(s) => ParamValue::String(s),
            Value::Array(items) => {
                ParamValue::Array(items.into_iter().map(ParamValue::from).collect())
            }
            object @ Value::Object(_) => ParamValue::Object(object),
        }
    }
}

/// Query parameters attached to a request
#[derive(Debug, Clone, PartialEq)]
pub enum Params {
    /// Ordered key/value pairs
    Entries(Vec<(String, ParamValue)>),
    /// An already serialized query string, used verbatim
    Encoded(String),
}

impl Params {
    pub fn new() -> Self {
        Params::Entries(Vec::new())
    }

    /// Wrap an already serialized query string
    pub fn encoded(query: impl Into<String>) -> Self {
        Params::Encoded(query.into())
    }

    /// Set a parameter, replacing an existing key in place
    ///
    /// Setting a key on `Encoded` params converts them to an empty entry list first.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        let key = key.into();
        let value = value.into();
        if let Params::Encoded(_) = self {
            *self = Params::new();
        }
        if let Params::Entries(entries) = self {
            match entries.iter_mut().find(|(k, _)| *k == key) {
                Some(entry) => entry.1 = value,
                None => entries.push((key, value)),
            }
        }
    }

    /// Builder form of [`Params::insert`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Look up a parameter by key
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        match self {
            Params::Entries(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            Params::Encoded(_) => None,
        }
    }
}

impl Default for Params {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Params::new(), |params, (k, v)| params.with(k, v))
    }
}

/// Custom query-string serializer
#[derive(Clone)]
pub struct ParamsSerializer(Arc<dyn Fn(&Params) -> String + Send + Sync>);

impl ParamsSerializer {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Params) -> String + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn serialize(&self, params: &Params) -> String {
        (self.0)(params)
    }
}

impl fmt::Debug for ParamsSerializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ParamsSerializer")
    }
}

/// Predicate deciding which response statuses resolve successfully
#[derive(Clone)]
pub struct StatusValidator(Arc<dyn Fn(StatusCode) -> bool + Send + Sync>);

impl StatusValidator {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(StatusCode) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn validate(&self, status: StatusCode) -> bool {
        (self.0)(status)
    }
}

impl fmt::Debug for StatusValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StatusValidator")
    }
}

/// Description of a request
///
/// Every field is optional so that a per-call config can be merged over the
/// client defaults. Fields the client does not interpret travel to the
/// transport through `extensions`.
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    pub url: Option<String>,
    pub method: Option<Method>,
    /// Prefix for relative `url`s
    pub base_url: Option<String>,
    pub headers: HeaderMap,
    pub params: Option<Params>,
    pub params_serializer: Option<ParamsSerializer>,
    pub data: Option<RequestBody>,
    /// Zero means no timeout
    pub timeout: Option<Duration>,
    pub response_type: Option<ResponseType>,
    pub auth: Option<BasicAuth>,
    pub validate_status: Option<StatusValidator>,
    /// Opaque pass-through fields for transports
    pub extensions: Map<String, Value>,
}

impl RequestConfig {
    /// Create an empty config
    pub fn new() -> Self {
        Self::default()
    }

    /// The defaults a client starts with
    pub fn defaults() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::ACCEPT,
            HeaderValue::from_static("application/json, text/plain, */*"),
        );
        Self {
            method: Some(Method::Get),
            headers,
            ..Self::default()
        }
    }

    /// Set the URL
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the method
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Set the method from its name, in any case
    pub fn method_str(self, method: &str) -> Result<Self> {
        Ok(self.method(method.parse()?))
    }

    /// Set the base URL
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set a header
    pub fn header(mut self, name: &str, value: &str) -> Result<Self> {
        let name = name.parse::<http::header::HeaderName>()?;
        let value = value.parse::<HeaderValue>()?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Set multiple headers
    ///
    /// Each name in `headers` replaces all existing values for that name.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        let mut current = None;
        for (name, value) in headers {
            match name {
                Some(name) => {
                    self.headers.insert(name.clone(), value);
                    current = Some(name);
                }
                None => {
                    if let Some(name) = &current {
                        self.headers.append(name.clone(), value);
                    }
                }
            }
        }
        self
    }

    /// Set a single query parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params
            .get_or_insert_with(Params::new)
            .insert(key, value);
        self
    }

    /// Replace the query parameters
    pub fn params(mut self, params: Params) -> Self {
        self.params = Some(params);
        self
    }

    /// Use a custom query serializer
    pub fn params_serializer<F>(mut self, f: F) -> Self
    where
        F: Fn(&Params) -> String + Send + Sync + 'static,
    {
        self.params_serializer = Some(ParamsSerializer::new(f));
        self
    }

    /// Set the body
    pub fn data(mut self, data: impl Into<RequestBody>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Set a JSON body from any serializable value
    pub fn json<T>(mut self, body: &T) -> Result<Self>
    where
        T: Serialize,
    {
        self.data = Some(RequestBody::Json(serde_json::to_value(body)?));
        Ok(self)
    }

    /// Set form data
    pub fn form(mut self, data: Vec<(String, String)>) -> Self {
        self.data = Some(RequestBody::Form(data));
        self
    }

    /// Set timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set how the response body is decoded
    pub fn response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = Some(response_type);
        self
    }

    /// Set basic authentication
    pub fn basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = Some(BasicAuth {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    /// Decide which statuses resolve instead of rejecting
    pub fn validate_status<F>(mut self, f: F) -> Self
    where
        F: Fn(StatusCode) -> bool + Send + Sync + 'static,
    {
        self.validate_status = Some(StatusValidator::new(f));
        self
    }

    /// Attach an opaque field for the transport
    pub fn extension(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extensions.insert(key.into(), value);
        self
    }

    /// The timeout, with zero treated as none
    pub fn effective_timeout(&self) -> Option<Duration> {
        self.timeout.filter(|t| !t.is_zero())
    }
}
