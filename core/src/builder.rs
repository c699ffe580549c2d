//! Request builder: URL and query string construction, header defaulting
//! and JSON body serialization.
//!
//! # Design
//! Building is pure and never touches the network, so every failure here
//! (malformed URL, unserializable body) is reported before a transport is
//! involved.

use serde::Serialize;
use serde_json::{Map, Value};
use ureq::http::Uri;
use url::form_urlencoded::byte_serialize;
use url::Url;

use crate::error::{ErrorKind, RequestError};
use crate::http::{HttpMethod, HttpRequest};

/// Flat key/value mapping used for query parameters.
///
/// Keys iterate in sorted order, which keeps query strings deterministic.
pub type Params = Map<String, Value>;

/// Render a parameter mapping as `key=value` segments joined by `&`.
///
/// Array values expand to one segment per element, in array order. Keys
/// and values are form-urlencoded.
pub fn query_string(params: &Params) -> String {
    let mut segments = Vec::with_capacity(params.len());
    for (key, value) in params {
        let key = encode(key);
        match value {
            Value::Array(items) => {
                segments.extend(items.iter().map(|item| format!("{key}={}", encode(&scalar(item)))));
            }
            other => segments.push(format!("{key}={}", encode(&scalar(other)))),
        }
    }
    segments.join("&")
}

fn encode(raw: &str) -> String {
    byte_serialize(raw.as_bytes()).collect()
}

/// Plain string form of a value: strings render unquoted, everything else
/// uses its JSON text.
fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Append the query string to `url` if there are any parameters, then check
/// that the result is an absolute URL the transport will accept as is.
///
/// `Url::parse` alone is too forgiving: it silently escapes spaces and
/// non-ASCII characters that `http::Uri` rejects at dispatch time.
pub fn build_url(url: &str, params: &Params) -> Result<String, RequestError> {
    let full = if params.is_empty() {
        url.to_string()
    } else {
        format!("{url}?{}", query_string(params))
    };
    if let Err(err) = Url::parse(&full) {
        tracing::warn!(url = %full, error = %err, "rejecting malformed URL");
        return Err(RequestError::new(ErrorKind::UrlError));
    }
    if let Err(err) = Uri::try_from(full.as_str()) {
        tracing::warn!(url = %full, error = %err, "rejecting URL the transport cannot send");
        return Err(RequestError::new(ErrorKind::UrlError));
    }
    Ok(full)
}

/// Caller headers first, then each default whose name the caller did not
/// set. Names compare case-insensitively.
pub fn merge_headers(
    caller: &[(&str, &str)],
    defaults: &[(String, String)],
) -> Vec<(String, String)> {
    let mut headers: Vec<(String, String)> = Vec::with_capacity(caller.len() + defaults.len());
    for (name, value) in caller {
        match headers
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
        {
            Some(slot) => slot.1 = value.to_string(),
            None => headers.push((name.to_string(), value.to_string())),
        }
    }
    for (name, value) in defaults {
        if !headers.iter().any(|(existing, _)| existing.eq_ignore_ascii_case(name)) {
            headers.push((name.clone(), value.clone()));
        }
    }
    headers
}

/// Serialize a request body. An empty JSON object means "no body".
pub fn serialize_body<B>(body: &B) -> Result<Option<String>, RequestError>
where
    B: Serialize + ?Sized,
{
    let value = serde_json::to_value(body).map_err(|err| {
        tracing::warn!(error = %err, "request body is not serializable");
        RequestError::new(ErrorKind::JsonParseError)
    })?;
    match value {
        Value::Object(ref map) if map.is_empty() => Ok(None),
        value => Ok(Some(value.to_string())),
    }
}

/// Build a GET or DELETE request. These only take query parameters.
pub fn build_query_request(
    method: HttpMethod,
    url: &str,
    params: &Params,
    headers: &[(&str, &str)],
    defaults: &[(String, String)],
) -> Result<HttpRequest, RequestError> {
    Ok(HttpRequest {
        method,
        url: build_url(url, params)?,
        headers: merge_headers(headers, defaults),
        body: None,
    })
}

/// Build a POST, PUT or PATCH request with a JSON body.
pub fn build_body_request<B>(
    method: HttpMethod,
    url: &str,
    body: &B,
    headers: &[(&str, &str)],
    defaults: &[(String, String)],
) -> Result<HttpRequest, RequestError>
where
    B: Serialize + ?Sized,
{
    let url = build_url(url, &Params::new())?;
    let body = serialize_body(body)?;
    Ok(HttpRequest {
        method,
        url,
        headers: merge_headers(headers, defaults),
        body,
    })
}
