//! Normalized result of one request attempt.
//!
//! # Design
//! Every call produces a `Response`, success or failure. Failure is marked
//! solely by `error` being set; the body and headers of a non-2xx response
//! stay readable. `parsed_body` is a best-effort decode and never fails the
//! response.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ErrorKind, RequestError};
use crate::http::HttpResponse;

/// Body of the value returned by callback-mode calls before the real
/// response is known.
pub const PLACEHOLDER_BODY: &str = "Could not perform request";

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// 0 when no status line was received.
    pub status_code: u16,
    pub body: Option<String>,
    /// Header names are lowercased; repeated headers are joined with `", "`.
    pub headers: BTreeMap<String, String>,
    pub parsed_body: Option<Value>,
    pub error: Option<RequestError>,
}

impl Response {
    /// A response for an attempt that never got a status line.
    pub fn failed(error: RequestError) -> Self {
        Self {
            status_code: 0,
            body: None,
            headers: BTreeMap::new(),
            parsed_body: None,
            error: Some(error),
        }
    }

    /// The stand-in returned synchronously by callback-mode calls. It is not
    /// the result of the request.
    pub fn placeholder() -> Self {
        Self {
            status_code: 0,
            body: Some(PLACEHOLDER_BODY.to_string()),
            headers: BTreeMap::new(),
            parsed_body: None,
            error: None,
        }
    }

    /// Normalize a completed transport response. Non-2xx statuses get an
    /// error from the status table but keep body and headers.
    pub fn from_http(response: HttpResponse) -> Self {
        let Some(bytes) = response.body else {
            return Self::failed(RequestError::new(ErrorKind::UnknownError));
        };
        let body = String::from_utf8_lossy(&bytes).into_owned();
        let error = if (200..=299).contains(&response.status) {
            None
        } else {
            Some(RequestError::from_status(response.status, Some(&body)))
        };
        let mut headers: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in response.headers {
            match headers.entry(name.to_ascii_lowercase()) {
                Entry::Occupied(mut slot) => {
                    let joined = slot.get_mut();
                    joined.push_str(", ");
                    joined.push_str(&value);
                }
                Entry::Vacant(slot) => {
                    slot.insert(value);
                }
            }
        }
        Self {
            status_code: response.status,
            parsed_body: serde_json::from_str(&body).ok(),
            body: Some(body),
            headers,
            error,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none() && (200..=299).contains(&self.status_code)
    }

    pub fn is_placeholder(&self) -> bool {
        self.status_code == 0
            && self.error.is_none()
            && self.body.as_deref() == Some(PLACEHOLDER_BODY)
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Decode the body into `T`. Unlike `parsed_body`, this reports why
    /// decoding failed.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(self.body.as_deref().unwrap_or_default())
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Response Code: {}", self.status_code)?;
        writeln!(f, "Response Str: {}", self.body.as_deref().unwrap_or_default())?;
        match &self.parsed_body {
            Some(json) => writeln!(f, "Response JSON: {json}")?,
            None => writeln!(f, "Response JSON: none")?,
        }
        write!(f, "Headers:")?;
        if self.headers.is_empty() {
            write!(f, " none")?;
        }
        for (name, value) in &self.headers {
            write!(f, "\n  {name}: {value}")?;
        }
        writeln!(f)?;
        match &self.error {
            Some(err) => write!(f, "Error: {err}"),
            None => write!(f, "Error: none"),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn http(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: Some(body.as_bytes().to_vec()),
        }
    }

    #[test]
    fn success_has_no_error_and_parsed_body() {
        let resp = Response::from_http(http(200, r#"{"ok":true}"#));
        assert_eq!(resp.status_code, 200);
        assert!(resp.error.is_none());
        assert!(resp.is_success());
        assert_eq!(resp.parsed_body, Some(json!({"ok": true})));
        assert_eq!(resp.header("content-type"), Some("application/json"));
        assert_eq!(resp.header("CONTENT-TYPE"), Some("application/json"));
    }

    #[test]
    fn error_status_keeps_body_readable() {
        let resp = Response::from_http(http(404, "missing"));
        assert_eq!(resp.status_code, 404);
        assert_eq!(resp.body.as_deref(), Some("missing"));
        let err = resp.error.unwrap();
        assert_eq!(err.kind, ErrorKind::NotFound { msg: "missing".into() });
    }

    #[test]
    fn repeated_headers_are_joined_in_order() {
        let resp = Response::from_http(HttpResponse {
            status: 200,
            headers: vec![
                ("Set-Cookie".to_string(), "a=1".to_string()),
                ("Vary".to_string(), "Accept".to_string()),
                ("set-cookie".to_string(), "b=2".to_string()),
            ],
            body: Some(b"{}".to_vec()),
        });
        assert_eq!(resp.header("set-cookie"), Some("a=1, b=2"));
        assert_eq!(resp.header("vary"), Some("Accept"));
        assert_eq!(resp.headers.len(), 2);
    }

    #[test]
    fn non_json_body_is_silently_unparsed() {
        let resp = Response::from_http(http(200, "plain text"));
        assert!(resp.parsed_body.is_none());
        assert!(resp.error.is_none());
    }

    #[test]
    fn missing_body_data_is_a_failure() {
        let resp = Response::from_http(HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: None,
        });
        assert_eq!(resp.status_code, 0);
        assert_eq!(resp.error.unwrap().kind, ErrorKind::UnknownError);
    }

    #[test]
    fn placeholder_is_recognizable() {
        let resp = Response::placeholder();
        assert_eq!(resp.status_code, 0);
        assert_eq!(resp.body.as_deref(), Some(PLACEHOLDER_BODY));
        assert!(resp.is_placeholder());
        assert!(!resp.is_success());
    }

    #[test]
    fn typed_json_decoding() {
        #[derive(serde::Deserialize)]
        struct Flag {
            ok: bool,
        }
        let resp = Response::from_http(http(200, r#"{"ok":true}"#));
        assert!(resp.json::<Flag>().unwrap().ok);
        assert!(Response::from_http(http(200, "nope")).json::<Flag>().is_err());
    }

    #[test]
    fn rendering_lists_all_fields() {
        let resp = Response::from_http(http(400, r#"{"why":"bad"}"#));
        let text = resp.to_string();
        assert_eq!(
            text,
            "Response Code: 400\n\
             Response Str: {\"why\":\"bad\"}\n\
             Response JSON: {\"why\":\"bad\"}\n\
             Headers:\n  content-type: application/json\n\
             Error: 400 => {\"why\":\"bad\"} (bad request: {\"why\":\"bad\"})"
        );
    }

    #[test]
    fn rendering_without_error_or_headers() {
        let text = Response::placeholder().to_string();
        assert!(text.contains("Headers: none\n"));
        assert!(text.ends_with("Error: none"));
    }
}
