//! Multipart file uploads.
//!
//! Browsers post every selected file under the `files[]` field. [`UploadedFiles`]
//! buffers those parts in memory and rejects the request with 413 as soon as any
//! single file exceeds [`UploadLimits::max_file_size`].
//!
//! Limits are read from the request extensions, so a router configures them with
//! an [`Extension`](axum::Extension) layer:
//!
//! ```ignore
//! let app = Router::new()
//!     .route("/api/v1/files", post(upload))
//!     .layer(Extension(UploadLimits::new(8 << 20)))
//!     .layer(DefaultBodyLimit::max(64 << 20));
//! ```
//!
//! Axum's own request body limit still applies to the multipart stream as a
//! whole.

use crate::error::AppError;
use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Multipart, Request, multipart::MultipartError},
    http::StatusCode,
};

/// Multipart field the browser uses for each selected file.
pub const UPLOAD_FIELD: &str = "files[]";

/// Default per-file maximum: 32 MiB.
pub const DEFAULT_MAX_FILE_SIZE: usize = 32 << 20;

/// Size limits applied by [`UploadedFiles`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    /// Largest accepted file, in bytes.
    pub max_file_size: usize,
}

impl UploadLimits {
    /// Accept files up to `max_file_size` bytes.
    #[must_use]
    pub const fn new(max_file_size: usize) -> Self {
        Self { max_file_size }
    }
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FILE_SIZE)
    }
}

/// One uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// File name as sent by the browser, if any.
    pub file_name: Option<String>,
    /// Declared MIME type, if any.
    pub content_type: Option<String>,
    /// File contents.
    pub data: Bytes,
}

impl UploadedFile {
    /// Size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the file is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// All `files[]` parts of a multipart request, in the order they were sent.
///
/// Other fields are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadedFiles(pub Vec<UploadedFile>);

impl UploadedFiles {
    /// Consume the extractor, returning the files.
    #[must_use]
    pub fn into_inner(self) -> Vec<UploadedFile> {
        self.0
    }
}

fn multipart_error(err: &MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::payload_too_large()
    } else {
        AppError::new(err.status(), err.body_text())
    }
}

#[async_trait]
impl<S> FromRequest<S> for UploadedFiles
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let limits = req
            .extensions()
            .get::<UploadLimits>()
            .copied()
            .unwrap_or_default();

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|rejection| AppError::new(rejection.status(), rejection.body_text()))?;

        let mut files = Vec::new();
        while let Some(mut field) = multipart
            .next_field()
            .await
            .map_err(|err| multipart_error(&err))?
        {
            if field.name() != Some(UPLOAD_FIELD) {
                continue;
            }

            let file_name = field.file_name().map(ToString::to_string);
            let content_type = field.content_type().map(ToString::to_string);

            let mut data = Vec::new();
            while let Some(chunk) = field.chunk().await.map_err(|err| multipart_error(&err))? {
                if data.len() + chunk.len() > limits.max_file_size {
                    tracing::warn!(
                        file_name = file_name.as_deref().unwrap_or_default(),
                        max_file_size = limits.max_file_size,
                        "rejecting oversized upload"
                    );
                    return Err(AppError::payload_too_large());
                }
                data.extend_from_slice(&chunk);
            }

            files.push(UploadedFile {
                file_name,
                content_type,
                data: Bytes::from(data),
            });
        }

        tracing::debug!(count = files.len(), "received uploaded files");
        metrics::counter!("w2kit.upload.files").increment(files.len() as u64);

        Ok(Self(files))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)] // Test code can use expect for clear failure messages
mod tests {
    use super::*;
    use axum::{Extension, Json, Router, extract::DefaultBodyLimit, routing::post};
    use axum_test::{
        TestServer,
        multipart::{MultipartForm, Part},
    };
    use serde_json::{Value, json};

    async fn describe(UploadedFiles(files): UploadedFiles) -> Json<Value> {
        let files: Vec<Value> = files
            .iter()
            .map(|file| {
                json!({
                    "name": file.file_name,
                    "type": file.content_type,
                    "size": file.len(),
                })
            })
            .collect();
        Json(json!({ "files": files }))
    }

    fn server(limits: Option<UploadLimits>) -> TestServer {
        let mut app = Router::new()
            .route("/upload", post(describe))
            .layer(DefaultBodyLimit::disable());
        if let Some(limits) = limits {
            app = app.layer(Extension(limits));
        }
        TestServer::new(app).expect("test server starts")
    }

    #[tokio::test]
    async fn test_collects_files_in_order() {
        let form = MultipartForm::new()
            .add_part(
                UPLOAD_FIELD,
                Part::bytes(b"hello".to_vec())
                    .file_name("a.txt")
                    .mime_type("text/plain"),
            )
            .add_text("comment", "ignored")
            .add_part(UPLOAD_FIELD, Part::bytes(vec![0_u8; 3]).file_name("b.bin"));

        let response = server(None).post("/upload").multipart(form).await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["files"][0], json!({"name": "a.txt", "type": "text/plain", "size": 5}));
        assert_eq!(body["files"][1]["name"], "b.bin");
        assert_eq!(body["files"][1]["size"], 3);
        assert_eq!(body["files"].as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn test_oversized_file_is_rejected() {
        let form = MultipartForm::new()
            .add_part(UPLOAD_FIELD, Part::bytes(vec![1_u8; 16]).file_name("small.bin"))
            .add_part(UPLOAD_FIELD, Part::bytes(vec![1_u8; 64]).file_name("large.bin"));

        let response = server(Some(UploadLimits::new(32)))
            .post("/upload")
            .multipart(form)
            .await;

        assert_eq!(response.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        let body: Value = response.json();
        assert_eq!(body, json!({"status": "error", "message": "Payload Too Large"}));
    }

    #[tokio::test]
    async fn test_file_at_limit_is_accepted() {
        let form = MultipartForm::new()
            .add_part(UPLOAD_FIELD, Part::bytes(vec![1_u8; 32]).file_name("exact.bin"));

        let response = server(Some(UploadLimits::new(32)))
            .post("/upload")
            .multipart(form)
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_non_multipart_body_is_rejected() {
        let response = server(None).post("/upload").text("plain").await;

        assert!(response.status_code().is_client_error());
        let body: Value = response.json();
        assert_eq!(body["status"], "error");
    }

    #[test]
    fn test_default_limit() {
        assert_eq!(UploadLimits::default().max_file_size, 32 * 1024 * 1024);
    }
}
