//! JSON HTTP client with blocking and callback call styles.
//!
//! # Overview
//! `Client` offers `get`, `post`, `put`, `patch` and `delete`. Each call
//! builds an `HttpRequest` (URL plus query string, merged default headers,
//! JSON body), hands it to a `Transport`, and normalizes the outcome into a
//! `Response`. Every call yields a `Response`; failures are marked by its
//! `error` field, never by a separate error channel.
//!
//! # Design
//! - Without a callback a call blocks until the transport completes. With a
//!   callback it returns `Response::placeholder()` at once and the real
//!   response goes to the callback.
//! - `Transport` is the only I/O seam. `UreqTransport` is the default; tests
//!   substitute stubs.
//! - Blocking waits have no timeout of their own. Configure a transport
//!   timeout or use `PendingResponse::wait_timeout` to bound them.

pub mod builder;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod pending;
pub mod response;
pub mod transport;

pub use builder::{query_string, Params};
pub use client::Client;
pub use config::ClientConfig;
pub use error::{ConfigError, ErrorKind, RequestError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use pending::{Callback, PendingResponse};
pub use response::Response;
pub use transport::{Completion, Transport, TransportResult, UreqTransport};
