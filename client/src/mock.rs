//! In-memory test doubles for the request lifecycle.
//!
//! All doubles append to one shared [`CallLog`] so tests can assert the exact
//! interleaving of owner callbacks, notifications and transport calls.
//!
//! **WARNING**: Do NOT use in production. This is for testing only!

use crate::error::FetchError;
use crate::notify::Notifier;
use crate::transport::{HttpRequest, HttpResponse, Method, RequestBody, Transport};
use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use w2kit_core::{LockOptions, Owner};

/// One observed side effect.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    /// `owner.lock(msg)`.
    Lock(String),
    /// `owner.unlock()`.
    Unlock,
    /// `owner.reload()`.
    Reload,
    /// `owner.message(text)`.
    Message(String),
    /// Notification with its display time.
    Notify(String, Duration),
    /// Request handed to the transport.
    Send {
        /// Method.
        method: Method,
        /// URL.
        url: String,
        /// Payload.
        body: RequestBody,
    },
}

/// Shared, ordered record of [`Call`]s.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl CallLog {
    /// An empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a call.
    pub fn push(&self, call: Call) {
        self.guard().push(call);
    }

    /// Snapshot of all calls so far.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.guard().clone()
    }

    fn guard(&self) -> MutexGuard<'_, Vec<Call>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Transport returning queued responses in order.
///
/// Once the queue is empty every request gets `200 {}`.
#[derive(Debug, Clone)]
pub struct MockTransport {
    responses: Arc<Mutex<VecDeque<Result<HttpResponse, FetchError>>>>,
    log: CallLog,
}

impl MockTransport {
    /// A transport and the log it records into.
    #[must_use]
    pub fn recording() -> (Self, CallLog) {
        let log = CallLog::new();
        (Self::with_log(&log), log)
    }

    /// A transport recording into an existing log.
    #[must_use]
    pub fn with_log(log: &CallLog) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            log: log.clone(),
        }
    }

    /// Queue a response.
    pub fn respond(&self, response: HttpResponse) {
        self.queue().push_back(Ok(response));
    }

    /// Queue a transport failure.
    pub fn fail(&self, error: FetchError) {
        self.queue().push_back(Err(error));
    }

    fn queue(&self) -> MutexGuard<'_, VecDeque<Result<HttpResponse, FetchError>>> {
        self.responses.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Transport for MockTransport {
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, FetchError>> + Send {
        self.log.push(Call::Send {
            method: request.method,
            url: request.url,
            body: request.body,
        });
        let next = self
            .queue()
            .pop_front()
            .unwrap_or_else(|| Ok(HttpResponse::new(200, b"{}".to_vec())));

        async move { next }
    }
}

/// Owner recording its callbacks.
#[derive(Debug, Clone)]
pub struct RecordingOwner {
    log: CallLog,
}

impl RecordingOwner {
    /// An owner recording into `log`.
    #[must_use]
    pub fn new(log: &CallLog) -> Self {
        Self { log: log.clone() }
    }
}

impl Owner for RecordingOwner {
    fn lock(&self, options: &LockOptions) {
        self.log.push(Call::Lock(options.msg.clone()));
    }

    fn unlock(&self) {
        self.log.push(Call::Unlock);
    }

    fn reload(&self) {
        self.log.push(Call::Reload);
    }

    fn message(&self, text: &str) {
        self.log.push(Call::Message(text.to_string()));
    }
}

/// Notifier recording what it was asked to show.
#[derive(Debug, Clone)]
pub struct RecordingNotifier {
    log: CallLog,
}

impl RecordingNotifier {
    /// A notifier recording into `log`.
    #[must_use]
    pub fn new(log: &CallLog) -> Self {
        Self { log: log.clone() }
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str, duration: Duration) {
        self.log.push(Call::Notify(message.to_string(), duration));
    }
}
