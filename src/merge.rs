use http::HeaderMap;

use crate::config::RequestConfig;

/// Merge a per-call config over the client defaults
///
/// Headers are unioned with the override's names replacing the defaults';
/// `extensions` merge key by key; every other field is taken from
/// `overrides` when set and from `defaults` otherwise. The result always
/// carries a method.
pub fn merge_config(defaults: &RequestConfig, overrides: RequestConfig) -> RequestConfig {
    let RequestConfig {
        url,
        method,
        base_url,
        headers,
        params,
        params_serializer,
        data,
        timeout,
        response_type,
        auth,
        validate_status,
        extensions,
    } = overrides;

    let mut merged_extensions = defaults.extensions.clone();
    merged_extensions.extend(extensions);

    RequestConfig {
        url: url.or_else(|| defaults.url.clone()),
        method: Some(method.or(defaults.method).unwrap_or_default()),
        base_url: base_url.or_else(|| defaults.base_url.clone()),
        headers: merge_headers(&defaults.headers, headers),
        params: params.or_else(|| defaults.params.clone()),
        params_serializer: params_serializer.or_else(|| defaults.params_serializer.clone()),
        data: data.or_else(|| defaults.data.clone()),
        timeout: timeout.or(defaults.timeout),
        response_type: response_type.or(defaults.response_type),
        auth: auth.or_else(|| defaults.auth.clone()),
        validate_status: validate_status.or_else(|| defaults.validate_status.clone()),
        extensions: merged_extensions,
    }
}

/// Union of two header maps; every name present in `overrides` replaces the default's values
pub fn merge_headers(defaults: &HeaderMap, overrides: HeaderMap) -> HeaderMap {
    let mut merged = defaults.clone();
    for name in overrides.keys() {
        merged.remove(name);
        for value in overrides.get_all(name) {
            merged.append(name.clone(), value.clone());
        }
    }
    merged
}
