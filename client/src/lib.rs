//! # w2kit Client
//!
//! Fetch-with-lock/notify/reload for widgets talking to a JSON backend.
//!
//! One call to [`RequestLifecycle::execute`] locks the [`Owner`](w2kit_core::Owner)
//! (when a lock message is given), sends the request, shows the response's
//! `message` through a [`Notifier`], reloads the owner on success and always
//! unlocks. [`RequestLifecycle::execute_and_report`] additionally routes any
//! error to `owner.message`.
//!
//! ## Example
//!
//! ```no_run
//! use w2kit_client::{RequestLifecycle, RequestOptions, ReqwestTransport};
//! use w2kit_core::{LockOptions, Owner};
//!
//! struct Grid;
//!
//! impl Owner for Grid {
//!     fn lock(&self, options: &LockOptions) { println!("lock: {}", options.msg) }
//!     fn unlock(&self) {}
//!     fn reload(&self) {}
//!     fn message(&self, text: &str) { eprintln!("{text}") }
//! }
//!
//! # async fn run() {
//! let lifecycle = RequestLifecycle::new(
//!     ReqwestTransport::new().with_base_url("http://localhost:3000"),
//! );
//! let grid = Grid;
//! lifecycle
//!     .execute_and_report(
//!         RequestOptions::post("/api/v1/todo/save")
//!             .with_owner(&grid)
//!             .with_lock("Saving")
//!             .with_reload(true)
//!             .with_json(serde_json::json!({"changes": []})),
//!     )
//!     .await;
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod lifecycle;
pub mod notify;
pub mod transport;
pub mod upload;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use error::FetchError;
pub use lifecycle::{DEFAULT_TIMEOUT, RequestLifecycle, RequestOptions, ServerResult};
pub use notify::{Notifier, TracingNotifier};
pub use transport::{
    HttpRequest, HttpResponse, Method, RequestBody, ReqwestTransport, Transport, UploadFile,
};
pub use upload::{UPLOAD_FIELD, UploadOptions};
