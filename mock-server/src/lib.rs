use axum::{
    extract::{Path, RawQuery},
    http::{HeaderMap, Method, StatusCode},
    routing::any,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::net::TcpListener;

/// Body returned by `/status/{code}`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusReply {
    pub code: u16,
    pub description: String,
}

/// Body returned by `/echo`: what the server saw of the request.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EchoReply {
    pub method: String,
    /// Query string as `(key, value)` pairs in the order they were sent.
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    /// The request body decoded as JSON, `null` when absent or not JSON.
    pub body: Value,
}

pub fn app() -> Router {
    Router::new()
        .route("/status/{code}", any(status))
        .route("/echo", any(echo))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn status(Path(code): Path<u16>) -> Result<(StatusCode, Json<StatusReply>), StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    let reply = StatusReply {
        code,
        description: status.canonical_reason().unwrap_or("Unknown").to_string(),
    };
    Ok((status, Json(reply)))
}

async fn echo(
    method: Method,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: String,
) -> Json<EchoReply> {
    Json(EchoReply {
        method: method.to_string(),
        query: parse_query(query.as_deref().unwrap_or_default()),
        headers: headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect(),
        body: serde_json::from_str(&body).unwrap_or(Value::Null),
    })
}

fn parse_query(raw: &str) -> Vec<(String, String)> {
    raw.split('&')
        .filter(|segment| !segment.is_empty())
        .map(|segment| match segment.split_once('=') {
            Some((key, value)) => (key.to_string(), value.to_string()),
            None => (segment.to_string(), String::new()),
        })
        .collect()
}
