//! Error types carried inside a `Response`.
//!
//! # Design
//! `ErrorKind` is a closed taxonomy. Status-mapped kinds are produced by
//! `ErrorKind::from_status`, a pure function of the status code and body, so
//! new codes are added here without touching dispatch. Build-time and
//! transport-time kinds are constructed directly by the builder and executor.

use thiserror::Error;

/// Body used for errors that have no response text behind them.
pub const UNKNOWN_ERROR_BODY: &str = "Unknown Error";

/// Classification of a failed request attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// The URL (with its query string) did not parse.
    #[error("malformed URL")]
    UrlError,

    /// The request body could not be serialized to JSON.
    #[error("request body could not be serialized to JSON")]
    JsonParseError,

    /// The transport failed without a more specific cause.
    #[error("unknown transport error")]
    UnknownError,

    /// The transport reported a failure of its own.
    #[error("transport error: {0}")]
    Transport(String),

    /// A non-2xx status without a dedicated kind.
    #[error("invalid response status {code}")]
    InvalidResponse { code: u16 },

    #[error("bad request: {msg}")]
    BadRequest { msg: String },

    #[error("unauthorized: {msg}")]
    Unauthorized { msg: String },

    #[error("forbidden: {msg}")]
    Forbidden { msg: String },

    #[error("not found: {msg}")]
    NotFound { msg: String },

    #[error("unprocessable entity: {msg}")]
    UnprocessableEntity { msg: String },

    #[error("internal server error")]
    InternalServer,

    #[error("bad gateway")]
    BadGateway,

    #[error("service unavailable")]
    ServiceUnavailable,

    #[error("gateway timeout")]
    GatewayTimeout,
}

impl ErrorKind {
    /// Map a response status code to its kind. Total over all codes; 2xx
    /// codes land in `InvalidResponse` since callers only ask for non-2xx.
    pub fn from_status(code: u16, body: Option<&str>) -> Self {
        let msg = body.unwrap_or_default().to_string();
        match code {
            400 => ErrorKind::BadRequest { msg },
            401 => ErrorKind::Unauthorized { msg },
            403 => ErrorKind::Forbidden { msg },
            404 => ErrorKind::NotFound { msg },
            422 => ErrorKind::UnprocessableEntity { msg },
            500 => ErrorKind::InternalServer,
            502 => ErrorKind::BadGateway,
            503 => ErrorKind::ServiceUnavailable,
            504 => ErrorKind::GatewayTimeout,
            code => ErrorKind::InvalidResponse { code },
        }
    }
}

/// Structured error attached to a `Response` that did not fully succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code} => {body} ({kind})")]
pub struct RequestError {
    /// HTTP status code, or 0 when no status line was received.
    pub code: u16,
    /// Raw response text, or `UNKNOWN_ERROR_BODY` when there was none.
    pub body: String,
    pub kind: ErrorKind,
}

impl RequestError {
    /// A code-0 error for failures that happen before or outside HTTP.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            code: 0,
            body: UNKNOWN_ERROR_BODY.to_string(),
            kind,
        }
    }

    /// Build the error for a completed response with a non-2xx status.
    pub fn from_status(code: u16, body: Option<&str>) -> Self {
        Self {
            code,
            body: body.unwrap_or(UNKNOWN_ERROR_BODY).to_string(),
            kind: ErrorKind::from_status(code, body),
        }
    }
}

/// Failure reported by a `Transport` in place of a response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The transport finished without producing any response.
    #[error("no response received")]
    NoResponse,

    /// Network or protocol failure, carried as text.
    #[error("{0}")]
    Failed(String),
}

impl From<ureq::Error> for TransportError {
    fn from(err: ureq::Error) -> Self {
        TransportError::Failed(err.to_string())
    }
}

impl From<TransportError> for RequestError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::NoResponse => RequestError::new(ErrorKind::UnknownError),
            TransportError::Failed(msg) => RequestError::new(ErrorKind::Transport(msg)),
        }
    }
}

/// Invalid client configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_table_maps_every_listed_code() {
        let body = Some("oops");
        let msg = "oops".to_string();
        let table = [
            (400, ErrorKind::BadRequest { msg: msg.clone() }),
            (401, ErrorKind::Unauthorized { msg: msg.clone() }),
            (403, ErrorKind::Forbidden { msg: msg.clone() }),
            (404, ErrorKind::NotFound { msg: msg.clone() }),
            (422, ErrorKind::UnprocessableEntity { msg }),
            (500, ErrorKind::InternalServer),
            (502, ErrorKind::BadGateway),
            (503, ErrorKind::ServiceUnavailable),
            (504, ErrorKind::GatewayTimeout),
        ];
        for (code, expected) in table {
            assert_eq!(ErrorKind::from_status(code, body), expected, "status {code}");
        }
    }

    #[test]
    fn unlisted_codes_are_invalid_response() {
        for code in [301, 402, 418, 429, 501, 599] {
            assert_eq!(
                ErrorKind::from_status(code, Some("x")),
                ErrorKind::InvalidResponse { code }
            );
        }
    }

    #[test]
    fn missing_body_gives_empty_message() {
        assert_eq!(
            ErrorKind::from_status(404, None),
            ErrorKind::NotFound { msg: String::new() }
        );
        let err = RequestError::from_status(404, None);
        assert_eq!(err.body, UNKNOWN_ERROR_BODY);
    }

    #[test]
    fn request_error_keeps_code_and_body() {
        let err = RequestError::from_status(500, Some("boom"));
        assert_eq!(err.code, 500);
        assert_eq!(err.body, "boom");
        assert_eq!(err.kind, ErrorKind::InternalServer);
        assert_eq!(err.to_string(), "500 => boom (internal server error)");
    }

    #[test]
    fn transport_errors_convert_to_code_zero() {
        let err: RequestError = TransportError::NoResponse.into();
        assert_eq!(err.code, 0);
        assert_eq!(err.kind, ErrorKind::UnknownError);

        let err: RequestError = TransportError::Failed("connection refused".into()).into();
        assert_eq!(err.kind, ErrorKind::Transport("connection refused".into()));
    }
}
