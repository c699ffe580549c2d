//! The seam between the executor and the network.
//!
//! # Design
//! A `Transport` receives a fully built `HttpRequest` and a completion, and
//! must invoke the completion exactly once, from whatever thread it likes.
//! The executor never blocks inside a transport; blocking mode waits on the
//! `PendingResponse` fed by the completion instead.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use ureq::typestate::WithBody;
use ureq::{Agent, Body, RequestBuilder};

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Result a transport reports for one request.
pub type TransportResult = Result<HttpResponse, TransportError>;

/// Completion handler passed to `Transport::dispatch`.
pub type Completion = Box<dyn FnOnce(TransportResult) + Send + 'static>;

/// Issues HTTP requests. Implementations must be safe to share across
/// threads and to dispatch from several threads at once.
pub trait Transport: Send + Sync {
    /// Start `request` and call `on_complete` exactly once when it finishes.
    fn dispatch(&self, request: HttpRequest, on_complete: Completion);
}

/// Default transport backed by one shared `ureq::Agent`.
///
/// Each dispatch runs on its own worker thread. Status codes are returned
/// as data rather than errors so 4xx/5xx bodies reach the caller.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new(timeout: Option<Duration>) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Transport for UreqTransport {
    fn dispatch(&self, request: HttpRequest, on_complete: Completion) {
        let agent = self.agent.clone();
        let slot = Arc::new(Mutex::new(Some(on_complete)));
        let worker_slot = Arc::clone(&slot);

        let spawned = thread::Builder::new()
            .name("request-transport".to_string())
            .spawn(move || {
                let outcome = execute(&agent, request);
                if let Some(complete) = take(&worker_slot) {
                    complete(outcome);
                }
            });

        if let Err(err) = spawned {
            tracing::warn!(error = %err, "could not start transport thread");
            if let Some(complete) = take(&slot) {
                complete(Err(TransportError::Failed(err.to_string())));
            }
        }
    }
}

fn take(slot: &Mutex<Option<Completion>>) -> Option<Completion> {
    slot.lock().ok()?.take()
}

/// Run one request to completion on the current thread.
fn execute(agent: &Agent, request: HttpRequest) -> TransportResult {
    let HttpRequest {
        method,
        url,
        headers,
        body,
    } = request;

    let result = match method {
        HttpMethod::Get => with_headers(agent.get(&url), &headers).call(),
        HttpMethod::Delete => with_headers(agent.delete(&url), &headers).call(),
        HttpMethod::Post => send(with_headers(agent.post(&url), &headers), body),
        HttpMethod::Put => send(with_headers(agent.put(&url), &headers), body),
        HttpMethod::Patch => send(with_headers(agent.patch(&url), &headers), body),
    };
    let mut response = result?;

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();
    let body = response.body_mut().read_to_vec()?;

    Ok(HttpResponse {
        status,
        headers,
        body: Some(body),
    })
}

fn with_headers<B>(mut builder: RequestBuilder<B>, headers: &[(String, String)]) -> RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn send(
    builder: RequestBuilder<WithBody>,
    body: Option<String>,
) -> Result<ureq::http::Response<Body>, ureq::Error> {
    match body {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
}
