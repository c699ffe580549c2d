//! Request executor: the public `get`/`post`/`put`/`patch`/`delete` surface.
//!
//! # Design
//! Each verb is split into a `build_*` method that produces an
//! `HttpRequest` and a dispatch step that hands it to the transport. The
//! call style is chosen by whether a callback is supplied:
//!
//! - no callback: dispatch, then block on the `PendingResponse` until the
//!   transport completes, and return the real response;
//! - callback: register the callback as the continuation before dispatch,
//!   return `Response::placeholder()` immediately, and deliver the real
//!   response to the callback from the transport's completion context.
//!
//! `execute` and `execute_with` expose the same two paths without the
//! placeholder for callers that build requests themselves.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::builder::{build_body_request, build_query_request, Params};
use crate::config::ClientConfig;
use crate::error::RequestError;
use crate::http::{HttpMethod, HttpRequest};
use crate::pending::{Callback, CallbackGuard, PendingResponse};
use crate::response::Response;
use crate::transport::{Transport, UreqTransport};

/// JSON HTTP client over a shareable transport.
///
/// The client holds no per-call state; every request and response is local
/// to its call, so one instance can serve concurrent callers.
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    config: ClientConfig,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Client {
    /// Client with default configuration over a `ureq` transport.
    pub fn new() -> Self {
        Self::from_config(ClientConfig::default())
    }

    pub fn from_config(config: ClientConfig) -> Self {
        let transport = UreqTransport::new(config.timeout);
        Self::with_transport(Arc::new(transport), config)
    }

    pub fn with_transport(transport: Arc<dyn Transport>, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn build_get(
        &self,
        url: &str,
        params: &Params,
        headers: &[(&str, &str)],
    ) -> Result<HttpRequest, RequestError> {
        build_query_request(HttpMethod::Get, url, params, headers, &self.config.default_headers)
    }

    pub fn build_delete(
        &self,
        url: &str,
        params: &Params,
        headers: &[(&str, &str)],
    ) -> Result<HttpRequest, RequestError> {
        build_query_request(HttpMethod::Delete, url, params, headers, &self.config.default_headers)
    }

    pub fn build_post<B>(
        &self,
        url: &str,
        body: &B,
        headers: &[(&str, &str)],
    ) -> Result<HttpRequest, RequestError>
    where
        B: Serialize + ?Sized,
    {
        build_body_request(HttpMethod::Post, url, body, headers, &self.config.default_headers)
    }

    pub fn build_put<B>(
        &self,
        url: &str,
        body: &B,
        headers: &[(&str, &str)],
    ) -> Result<HttpRequest, RequestError>
    where
        B: Serialize + ?Sized,
    {
        build_body_request(HttpMethod::Put, url, body, headers, &self.config.default_headers)
    }

    pub fn build_patch<B>(
        &self,
        url: &str,
        body: &B,
        headers: &[(&str, &str)],
    ) -> Result<HttpRequest, RequestError>
    where
        B: Serialize + ?Sized,
    {
        build_body_request(HttpMethod::Patch, url, body, headers, &self.config.default_headers)
    }

    pub fn get(
        &self,
        url: &str,
        params: &Params,
        headers: &[(&str, &str)],
        on_complete: Option<Callback>,
    ) -> Response {
        self.run(self.build_get(url, params, headers), on_complete)
    }

    pub fn delete(
        &self,
        url: &str,
        params: &Params,
        headers: &[(&str, &str)],
        on_complete: Option<Callback>,
    ) -> Response {
        self.run(self.build_delete(url, params, headers), on_complete)
    }

    pub fn post<B>(
        &self,
        url: &str,
        body: &B,
        headers: &[(&str, &str)],
        on_complete: Option<Callback>,
    ) -> Response
    where
        B: Serialize + ?Sized,
    {
        self.run(self.build_post(url, body, headers), on_complete)
    }

    pub fn put<B>(
        &self,
        url: &str,
        body: &B,
        headers: &[(&str, &str)],
        on_complete: Option<Callback>,
    ) -> Response
    where
        B: Serialize + ?Sized,
    {
        self.run(self.build_put(url, body, headers), on_complete)
    }

    pub fn patch<B>(
        &self,
        url: &str,
        body: &B,
        headers: &[(&str, &str)],
        on_complete: Option<Callback>,
    ) -> Response
    where
        B: Serialize + ?Sized,
    {
        self.run(self.build_patch(url, body, headers), on_complete)
    }

    /// Dispatch a built request and return a handle to its response.
    pub fn execute(&self, request: HttpRequest) -> PendingResponse {
        let (responder, pending) = PendingResponse::channel();
        self.dispatch(request, move |response| responder.respond(response));
        pending
    }

    /// Dispatch a built request and deliver its response to `callback`
    /// from the transport's completion context.
    ///
    /// If the transport drops the request without completing it, the
    /// callback receives an `UnknownError` response instead.
    pub fn execute_with(&self, request: HttpRequest, callback: Callback) {
        let guard = CallbackGuard::new(callback);
        self.dispatch(request, move |response| guard.deliver(response));
    }

    fn run(
        &self,
        built: Result<HttpRequest, RequestError>,
        on_complete: Option<Callback>,
    ) -> Response {
        let request = match built {
            Ok(request) => request,
            Err(err) => {
                // Nothing was dispatched, so the failure is both returned
                // and handed to the callback on this thread.
                let response = Response::failed(err);
                if let Some(callback) = on_complete {
                    callback(response.clone());
                }
                return response;
            }
        };

        match on_complete {
            None => self.execute(request).wait(),
            Some(callback) => {
                self.execute_with(request, callback);
                Response::placeholder()
            }
        }
    }

    fn dispatch<F>(&self, request: HttpRequest, deliver: F)
    where
        F: FnOnce(Response) + Send + 'static,
    {
        let request_id = Uuid::new_v4();
        tracing::debug!(
            %request_id,
            method = %request.method,
            url = %request.url,
            "dispatching request"
        );

        self.transport.dispatch(
            request,
            Box::new(move |outcome| {
                let response = match outcome {
                    Ok(http) => Response::from_http(http),
                    Err(err) => {
                        tracing::warn!(%request_id, error = %err, "transport failed");
                        Response::failed(err.into())
                    }
                };
                tracing::debug!(%request_id, status = response.status_code, "request completed");
                deliver(response);
            }),
        );
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::ErrorKind;
    use crate::transport::Completion;

    /// Transport that must never be reached.
    struct Unreachable;

    impl Transport for Unreachable {
        fn dispatch(&self, request: HttpRequest, _: Completion) {
            panic!("unexpected dispatch of {} {}", request.method, request.url);
        }
    }

    fn client() -> Client {
        Client::with_transport(Arc::new(Unreachable), ClientConfig::default())
    }

    fn params(value: serde_json::Value) -> Params {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn build_get_produces_correct_request() {
        let req = client()
            .build_get("https://example.com/items", &params(json!({"page": 2})), &[])
            .unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "https://example.com/items?page=2");
        assert!(req.body.is_none());
        assert_eq!(req.header("accept"), Some("application/json"));
    }

    #[test]
    fn build_post_produces_correct_request() {
        let req = client()
            .build_post("https://example.com/items", &json!({"test": true}), &[("X-Id", "7")])
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "https://example.com/items");
        assert_eq!(req.header("x-id"), Some("7"));
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"test": true}));
    }

    #[test]
    fn build_put_and_patch_use_their_methods() {
        let c = client();
        let body = json!({"a": 1});
        assert_eq!(
            c.build_put("https://example.com", &body, &[]).unwrap().method,
            HttpMethod::Put
        );
        assert_eq!(
            c.build_patch("https://example.com", &body, &[]).unwrap().method,
            HttpMethod::Patch
        );
    }

    #[test]
    fn config_headers_are_defaults() {
        let config = ClientConfig::default().with_default_header("User-Agent", "request-core");
        let c = Client::with_transport(Arc::new(Unreachable), config);
        let req = c.build_delete("https://example.com", &Params::new(), &[]).unwrap();
        assert_eq!(req.header("user-agent"), Some("request-core"));
        assert_eq!(req.url, "https://example.com");
    }

    #[test]
    fn build_failure_never_reaches_transport() {
        let resp = client().get("", &Params::new(), &[], None);
        assert_eq!(resp.status_code, 0);
        assert_eq!(resp.error.unwrap().kind, ErrorKind::UrlError);
    }

    #[test]
    fn build_failure_is_also_delivered_to_callback() {
        let (tx, rx) = std::sync::mpsc::channel();
        let resp = client().delete(
            "::not a url::",
            &Params::new(),
            &[],
            Some(Box::new(move |r| tx.send(r).unwrap())),
        );
        let delivered = rx.recv().unwrap();
        assert_eq!(delivered, resp);
        assert_eq!(delivered.error.unwrap().kind, ErrorKind::UrlError);
    }
}
