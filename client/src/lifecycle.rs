//! The request lifecycle: lock the owner, send one request, surface the
//! outcome, unlock.
//!
//! Within one call the order is strictly lock → request → parse →
//! notify/reload → unlock. Nothing is shared between calls, so concurrent
//! calls against the same owner are not serialized.

use crate::error::FetchError;
use crate::notify::{Notifier, TracingNotifier};
use crate::transport::{HttpRequest, HttpResponse, Method, RequestBody, Transport};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::time::Duration;
use w2kit_core::{LockOptions, Owner};

/// Default notification display time.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Options for a single request.
///
/// The owner is borrowed for the duration of the call only.
#[derive(Clone)]
pub struct RequestOptions<'a> {
    /// Widget receiving lifecycle callbacks.
    pub owner: Option<&'a dyn Owner>,
    /// Reload the owner after a successful response.
    pub reload: bool,
    /// Lock message; the owner is locked only when this is set and non-empty.
    pub lock: Option<String>,
    /// Target URL.
    pub url: String,
    /// HTTP method.
    pub method: Method,
    /// Extra headers.
    pub headers: Vec<(String, String)>,
    /// Payload.
    pub body: RequestBody,
    /// How long the success notification stays visible.
    ///
    /// This does not cancel the request; configure a deadline on the
    /// transport for that.
    pub timeout: Duration,
}

impl<'a> RequestOptions<'a> {
    /// A `GET` request to `url` with no owner.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            owner: None,
            reload: false,
            lock: None,
            url: url.into(),
            method: Method::GET,
            headers: Vec::new(),
            body: RequestBody::Empty,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// A `POST` request to `url` with no owner.
    #[must_use]
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(url).with_method(Method::POST)
    }

    /// Attach the widget that receives lifecycle callbacks.
    #[must_use]
    pub fn with_owner(mut self, owner: &'a dyn Owner) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Lock the owner with `message` while the request is in flight.
    #[must_use]
    pub fn with_lock(mut self, message: impl Into<String>) -> Self {
        self.lock = Some(message.into());
        self
    }

    /// Reload the owner after success.
    #[must_use]
    pub const fn with_reload(mut self, reload: bool) -> Self {
        self.reload = reload;
        self
    }

    /// Set the method.
    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Add a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the payload.
    #[must_use]
    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    /// Send `value` as a JSON payload.
    #[must_use]
    pub fn with_json(self, value: Value) -> Self {
        self.with_body(RequestBody::Json(value))
    }

    /// Set the notification display time.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn lock_message(&self) -> Option<&str> {
        self.lock.as_deref().filter(|msg| !msg.is_empty())
    }
}

impl fmt::Debug for RequestOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestOptions")
            .field("owner", &self.owner.is_some())
            .field("reload", &self.reload)
            .field("lock", &self.lock)
            .field("url", &self.url)
            .field("method", &self.method)
            .field("headers", &self.headers)
            .field("body", &self.body)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Parsed success body: an optional `message` plus whatever else the server sent.
///
/// Decoding is lenient: any JSON body is accepted. A non-string `message` is
/// kept in its JSON text form, and a body that is not an object carries no
/// message and no fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct ServerResult {
    /// Text to show the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Remaining members.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl From<Value> for ServerResult {
    fn from(value: Value) -> Self {
        let Value::Object(mut fields) = value else {
            return Self::default();
        };
        let message = match fields.remove("message") {
            None | Some(Value::Null) => None,
            Some(Value::String(text)) => Some(text),
            Some(other) => Some(other.to_string()),
        };
        Self { message, fields }
    }
}

impl ServerResult {
    /// The message, if present and non-empty.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref().filter(|msg| !msg.is_empty())
    }
}

/// Unlocks the owner when dropped, so every exit path releases the lock.
struct LockGuard<'a> {
    owner: Option<&'a dyn Owner>,
}

impl<'a> LockGuard<'a> {
    fn acquire(owner: Option<&'a dyn Owner>, message: Option<&str>) -> Self {
        match (owner, message) {
            (Some(owner), Some(msg)) => {
                owner.lock(&LockOptions::spinner(msg));
                Self { owner: Some(owner) }
            }
            _ => Self { owner: None },
        }
    }
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        if let Some(owner) = self.owner {
            owner.unlock();
        }
    }
}

/// Runs requests through a [`Transport`] and reports outcomes through a
/// [`Notifier`] and the request's [`Owner`].
///
/// # Example
///
/// ```no_run
/// use w2kit_client::{RequestLifecycle, RequestOptions, ReqwestTransport};
///
/// # async fn run() {
/// let lifecycle = RequestLifecycle::new(ReqwestTransport::new());
/// let result = lifecycle
///     .execute(RequestOptions::post("http://localhost:3000/api/item")
///         .with_json(serde_json::json!({"name": "x"})))
///     .await;
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RequestLifecycle<T, N = TracingNotifier> {
    transport: T,
    notifier: N,
}

impl<T: Transport> RequestLifecycle<T> {
    /// A lifecycle that logs notifications through `tracing`.
    #[must_use]
    pub const fn new(transport: T) -> Self {
        Self {
            transport,
            notifier: TracingNotifier,
        }
    }
}

impl<T: Transport, N: Notifier> RequestLifecycle<T, N> {
    /// Replace the notifier.
    #[must_use]
    pub fn with_notifier<M: Notifier>(self, notifier: M) -> RequestLifecycle<T, M> {
        RequestLifecycle {
            transport: self.transport,
            notifier,
        }
    }

    /// The underlying transport.
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Perform one request and return its outcome.
    ///
    /// The owner is locked and unlocked as configured, notified and reloaded on
    /// success, but errors are returned rather than shown.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Transport`] if no response arrived
    /// - [`FetchError::Status`] for non-2xx responses, carrying the body's
    ///   `message` or the status text
    /// - [`FetchError::Parse`] if a 2xx body is not a JSON object
    pub async fn execute(&self, options: RequestOptions<'_>) -> Result<ServerResult, FetchError> {
        self.run(options, false).await
    }

    /// Perform one request, showing any error through `owner.message`.
    ///
    /// Returns the parsed result on success and `None` on failure.
    pub async fn execute_and_report(&self, options: RequestOptions<'_>) -> Option<ServerResult> {
        self.run(options, true).await.ok()
    }

    pub(crate) async fn run(
        &self,
        options: RequestOptions<'_>,
        report: bool,
    ) -> Result<ServerResult, FetchError> {
        let owner = options.owner;
        let guard = LockGuard::acquire(owner, options.lock_message());

        let result = self.perform(options).await;

        if report {
            if let Err(err) = &result {
                tracing::warn!(error = %err, "request failed");
                if let Some(owner) = owner {
                    owner.message(&err.to_string());
                }
            }
        }

        drop(guard);
        result
    }

    async fn perform(&self, options: RequestOptions<'_>) -> Result<ServerResult, FetchError> {
        let RequestOptions {
            owner,
            reload,
            url,
            method,
            headers,
            body,
            timeout,
            ..
        } = options;

        let response = self
            .transport
            .send(HttpRequest {
                method,
                url,
                headers,
                body,
            })
            .await?;

        if !response.is_success() {
            return Err(status_error(&response));
        }

        let result = parse_success(&response)?;

        if let Some(message) = result.message() {
            self.notifier.notify(message, timeout);
        }

        if reload {
            if let Some(owner) = owner {
                owner.reload();
            }
        }

        Ok(result)
    }
}

fn status_error(response: &HttpResponse) -> FetchError {
    let message = response
        .json::<ServerResult>()
        .ok()
        .and_then(|body| body.message)
        .filter(|msg| !msg.is_empty())
        .unwrap_or_else(|| {
            if response.status_text.is_empty() {
                format!("HTTP {}", response.status)
            } else {
                response.status_text.clone()
            }
        });

    FetchError::Status {
        status: response.status,
        message,
    }
}

fn parse_success(response: &HttpResponse) -> Result<ServerResult, FetchError> {
    if response.body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ServerResult::default());
    }
    response
        .json()
        .map_err(|e| FetchError::Parse(e.to_string()))
}
