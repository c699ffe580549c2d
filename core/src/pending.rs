//! Handle for a dispatched request whose response has not arrived yet.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::Duration;

use crate::error::{ErrorKind, RequestError};
use crate::response::Response;

/// Continuation invoked with the real response of a callback-mode call.
pub type Callback = Box<dyn FnOnce(Response) + Send + 'static>;

/// Receiving half of a single-use response slot.
///
/// The sending half (`Responder`) is moved into the transport completion
/// and consumed when the response is delivered, so a response is delivered
/// at most once. If the responder is dropped without delivering, the
/// handle resolves to an `UnknownError` response instead of blocking
/// forever.
#[derive(Debug)]
pub struct PendingResponse {
    rx: Receiver<Response>,
}

/// Sending half of a `PendingResponse`.
#[derive(Debug)]
pub struct Responder {
    tx: Sender<Response>,
}

impl PendingResponse {
    pub fn channel() -> (Responder, PendingResponse) {
        let (tx, rx) = mpsc::channel();
        (Responder { tx }, PendingResponse { rx })
    }

    /// A handle that is already resolved, used when a request fails to build.
    pub fn ready(response: Response) -> Self {
        let (responder, pending) = Self::channel();
        responder.respond(response);
        pending
    }

    /// Block until the transport completes.
    ///
    /// There is no timeout: an unresponsive transport blocks the caller
    /// until the transport's own timeout (if configured) fires.
    pub fn wait(self) -> Response {
        self.rx.recv().unwrap_or_else(|_| abandoned())
    }

    /// Block for at most `timeout`. Returns `None` if the response has not
    /// arrived in time; the handle stays usable.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Response> {
        match self.rx.recv_timeout(timeout) {
            Ok(response) => Some(response),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(abandoned()),
        }
    }

    /// Poll without blocking. The response is handed out once; polling
    /// again after that reports the request as abandoned.
    pub fn try_response(&self) -> Option<Response> {
        match self.rx.try_recv() {
            Ok(response) => Some(response),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(abandoned()),
        }
    }
}

impl Responder {
    pub fn respond(self, response: Response) {
        // The receiver may already be gone; nobody is waiting then.
        let _ = self.tx.send(response);
    }
}

/// Owns a callback until a response is delivered to it.
///
/// If the guard is dropped first, for example because the transport
/// discarded its completion or panicked, the callback receives an
/// `UnknownError` response, so it still runs exactly once.
pub(crate) struct CallbackGuard {
    callback: Option<Callback>,
}

impl CallbackGuard {
    pub(crate) fn new(callback: Callback) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    pub(crate) fn deliver(mut self, response: Response) {
        if let Some(callback) = self.callback.take() {
            callback(response);
        }
    }
}

impl Drop for CallbackGuard {
    fn drop(&mut self) {
        if let Some(callback) = self.callback.take() {
            callback(abandoned());
        }
    }
}

fn abandoned() -> Response {
    tracing::warn!("transport dropped a request without completing it");
    Response::failed(RequestError::new(ErrorKind::UnknownError))
}
