//! Axum integration for w2ui backends.
//!
//! This crate provides the HTTP edge for handlers built on `w2kit-postgres`:
//!
//! - [`W2Query`] and [`W2Json`] decode widget requests
//! - [`UploadedFiles`] collects `files[]` uploads with a per-file size limit
//! - [`AppError`] answers failures with the toolkit's error envelope and a
//!   matching status code
//!
//! # Request Flow
//!
//! 1. **HTTP Request** arrives at an axum handler
//! 2. **Extract** the widget request (query parameter or JSON body)
//! 3. **Run** the database handler, usually inside `within_transaction`
//! 4. **Return** the response type as JSON, or an [`AppError`]
//!
//! # Example
//!
//! ```ignore
//! use axum::{Json, Router, extract::State, routing::get};
//! use w2kit_core::protocol::{DropdownRequest, DropdownResponse, DropdownValue};
//! use w2kit_postgres::{DbError, DropdownOptions, get_dropdown};
//! use w2kit_web::{W2Query, WebResult};
//!
//! async fn status_dropdown(
//!     State(pool): State<PgPool>,
//!     W2Query(request): W2Query<DropdownRequest>,
//! ) -> WebResult<Json<DropdownResponse<DropdownValue>>> {
//!     let options = DropdownOptions::new("status", "id", "name", "position");
//!     let mut conn = pool.acquire().await.map_err(DbError::from)?;
//!     Ok(Json(get_dropdown(&mut conn, &request, &options).await?))
//! }
//!
//! let app = Router::new()
//!     .route("/api/v1/status/dropdown", get(status_dropdown))
//!     .with_state(pool);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod upload;

pub use error::AppError;
pub use extractors::{REQUEST_PARAM, W2Json, W2Query};
pub use upload::{DEFAULT_MAX_FILE_SIZE, UPLOAD_FIELD, UploadLimits, UploadedFile, UploadedFiles};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
