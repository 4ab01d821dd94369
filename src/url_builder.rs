//! Request URL composition
//!
//! Query values are percent-encoded the way `encodeURIComponent` does, after
//! which `@ : $ , [ ]` are left readable and spaces become `+`.

use std::sync::OnceLock;

use chrono::SecondsFormat;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;

use crate::config::{ParamValue, Params, ParamsSerializer, RequestConfig};
use crate::error::{Error, Result};

const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'@')
    .remove(b':')
    .remove(b'$')
    .remove(b',')
    .remove(b'[')
    .remove(b']');

/// Percent-encode a query key or value
pub fn encode(value: &str) -> String {
    utf8_percent_encode(value, QUERY_COMPONENT)
        .to_string()
        .replace("%20", "+")
}

/// Append `params` to `url` as a query string
///
/// A custom `serializer` takes over serialization entirely. When the
/// serialized query is empty the URL is returned unchanged.
pub fn build_url(url: &str, params: Option<&Params>, serializer: Option<&ParamsSerializer>) -> String {
    let Some(params) = params else {
        return url.to_string();
    };

    let serialized = match (serializer, params) {
        (Some(serializer), _) => serializer.serialize(params),
        (None, Params::Encoded(query)) => query.clone(),
        (None, Params::Entries(entries)) => serialize_entries(entries),
    };

    if serialized.is_empty() {
        return url.to_string();
    }

    let base = match url.find('#') {
        Some(index) => &url[..index],
        None => url,
    };
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{}{}{}", base, separator, serialized)
}

fn serialize_entries(entries: &[(String, ParamValue)]) -> String {
    let mut parts = Vec::new();

    for (key, value) in entries {
        match value {
            ParamValue::Null => continue,
            ParamValue::Array(items) => {
                let key = encode(&format!("{}[]", key));
                for item in items {
                    parts.push(format!("{}={}", key, encode(&render(item))));
                }
            }
            other => parts.push(format!("{}={}", encode(key), encode(&render(other)))),
        }
    }

    parts.join("&")
}

fn render(value: &ParamValue) -> String {
    match value {
        ParamValue::Null => "null".to_string(),
        ParamValue::Bool(b) => b.to_string(),
        ParamValue::Number(n) => render_number(n),
        ParamValue::String(s) => s.clone(),
        ParamValue::Date(date) => date.to_rfc3339_opts(SecondsFormat::Millis, true),
        // nested arrays flatten the way Array.prototype.toString does
        ParamValue::Array(items) => items
            .iter()
            .map(|item| match item {
                ParamValue::Null => String::new(),
                other => render(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        ParamValue::Object(object) => object.to_string(),
    }
}

/// Integral floats print without a fraction, as `String(1.0)` gives `1`
fn render_number(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => {
            if f == 0.0 {
                "0".to_string()
            } else {
                format!("{:.0}", f)
            }
        }
        _ => n.to_string(),
    }
}

/// Whether `url` carries a scheme or is protocol-relative
pub fn is_absolute_url(url: &str) -> bool {
    static ABSOLUTE: OnceLock<Regex> = OnceLock::new();
    ABSOLUTE
        .get_or_init(|| Regex::new(r"(?i)^([a-z][a-z\d+\-.]*:)?//").expect("valid regex"))
        .is_match(url)
}

/// Join a base URL and a relative path with exactly one slash
pub fn combine_url(base_url: &str, relative_url: &str) -> String {
    if relative_url.is_empty() {
        return base_url.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        relative_url.trim_start_matches('/')
    )
}

/// Compose the final URL of a config: base URL, path and query
pub fn transform_url(config: &RequestConfig) -> Result<String> {
    let url = config
        .url
        .as_deref()
        .ok_or_else(|| Error::config("url is required"))?;

    let full_url = match config.base_url.as_deref() {
        Some(base_url) if !is_absolute_url(url) => combine_url(base_url, url),
        _ => url.to_string(),
    };

    Ok(build_url(
        &full_url,
        config.params.as_ref(),
        config.params_serializer.as_ref(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn test_no_params_returns_url() {
        assert_eq!(build_url("/x?a=1#top", None, None), "/x?a=1#top");
    }

    #[test]
    fn test_arrays_nulls_and_dates() {
        let params = Params::new()
            .with("ids", vec![1, 2])
            .with("q", ParamValue::Null)
            .with("d", Utc.timestamp_opt(0, 0).unwrap());

        let url = build_url("/x", Some(&params), None);
        assert_eq!(url, "/x?ids[]=1&ids[]=2&d=1970-01-01T00:00:00.000Z");
        assert!(!url.contains("q="));
        assert!(!url.contains("%5B"));
    }

    #[test]
    fn test_fragment_is_dropped() {
        let params = Params::new().with("a", 1);
        assert_eq!(build_url("/x#frag", Some(&params), None), "/x?a=1");
    }

    #[test]
    fn test_existing_query_uses_ampersand() {
        let params = Params::new().with("b", "2");
        assert_eq!(build_url("/x?a=1", Some(&params), None), "/x?a=1&b=2");
    }

    #[test]
    fn test_empty_params_leave_url_unchanged() {
        let params = Params::new().with("q", ParamValue::Null);
        assert_eq!(build_url("/x#frag", Some(&params), None), "/x#frag");
        assert_eq!(build_url("/x", Some(&Params::new()), None), "/x");
    }

    #[test]
    fn test_special_characters() {
        let params = Params::new().with("foo", "@:$, []");
        let url = build_url("/x", Some(&params), None);
        assert_eq!(url, "/x?foo=@:$,+[]");
        assert!(!url.contains("%20"));

        let params = Params::new().with("q", "a&b=c/d");
        assert_eq!(build_url("/x", Some(&params), None), "/x?q=a%26b%3Dc%2Fd");
    }

    #[test]
    fn test_numbers_render_like_javascript() {
        let params = Params::new()
            .with("a", 1.0)
            .with("b", -0.0)
            .with("c", 2.5)
            .with("d", 42)
            .with("e", 3e20);
        assert_eq!(
            build_url("/x", Some(&params), None),
            "/x?a=1&b=0&c=2.5&d=42&e=300000000000000000000"
        );
    }

    #[test]
    fn test_objects_render_as_json() {
        let params = Params::new().with("filter", json!({"bar": "baz"}));
        assert_eq!(
            build_url("/x", Some(&params), None),
            "/x?filter=%7B%22bar%22:%22baz%22%7D"
        );
    }

    #[test]
    fn test_encoded_params_are_used_verbatim() {
        let params = Params::encoded("a=1&b=two%20words");
        assert_eq!(
            build_url("/x", Some(&params), None),
            "/x?a=1&b=two%20words"
        );
    }

    #[test]
    fn test_custom_serializer_takes_over() {
        let serializer = ParamsSerializer::new(|_| "custom=yes".to_string());
        let params = Params::new().with("ignored", 1);
        assert_eq!(
            build_url("/x", Some(&params), Some(&serializer)),
            "/x?custom=yes"
        );
    }

    #[test]
    fn test_absolute_urls() {
        assert!(is_absolute_url("https://example.com/a"));
        assert!(is_absolute_url("custom-scheme-v1.0://example.com/"));
        assert!(is_absolute_url("//example.com/"));
        assert!(!is_absolute_url("/users"));
        assert!(!is_absolute_url("123://example.com/"));
        assert!(!is_absolute_url("!valid://example.com/"));
    }

    #[test]
    fn test_combine_url() {
        assert_eq!(combine_url("https://api.github.com", "/users"), "https://api.github.com/users");
        assert_eq!(combine_url("https://api.github.com/", "/users"), "https://api.github.com/users");
        assert_eq!(combine_url("https://api.github.com/", ""), "https://api.github.com/");
    }

    #[test]
    fn test_transform_url() {
        let config = RequestConfig::new()
            .base_url("https://api.example.com/v1/")
            .url("/users")
            .param("page", 2);
        assert_eq!(
            transform_url(&config).unwrap(),
            "https://api.example.com/v1/users?page=2"
        );

        let config = RequestConfig::new()
            .base_url("https://api.example.com")
            .url("https://other.example.com/x");
        assert_eq!(transform_url(&config).unwrap(), "https://other.example.com/x");

        assert!(transform_url(&RequestConfig::new()).unwrap_err().is_config());
    }
}
