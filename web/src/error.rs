//! Error responses for widget handlers.
//!
//! Every failure is answered with the toolkit's error envelope,
//! `{"status": "error", "message": "..."}`, so grids and forms can show the
//! message to the user.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;
use w2kit_core::{ProtocolError, protocol::BaseResponse};
use w2kit_postgres::DbError;

/// Application error type for widget handlers.
///
/// # Examples
///
/// ```ignore
/// async fn get_form(
///     State(pool): State<PgPool>,
///     W2Query(request): W2Query<FormRequest>,
/// ) -> Result<Json<FormResponse<Todo>>, AppError> {
///     let mut conn = pool.acquire().await.map_err(DbError::from)?;
///     Ok(Json(get_form(&mut conn, &request, &options).await?))
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    /// Internal error (for logging)
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            source: None,
        }
    }

    /// Attach the underlying error.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Create a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Create a 404 Not Found error with the canonical reason as message.
    #[must_use]
    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not Found")
    }

    /// Create a 413 Payload Too Large error with the canonical reason as message.
    #[must_use]
    pub fn payload_too_large() -> Self {
        Self::new(StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large")
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// HTTP status of the response.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Message shown to the user.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.status.as_u16(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            if let Some(source) = &self.source {
                tracing::error!(
                    status = %self.status,
                    message = %self.message,
                    error = %source,
                    "Internal server error"
                );
            } else {
                tracing::error!(
                    status = %self.status,
                    message = %self.message,
                    "Internal server error"
                );
            }
        } else {
            tracing::debug!(status = %self.status, message = %self.message, "request rejected");
        }

        (self.status, Json(BaseResponse::error(self.message))).into_response()
    }
}

/// Message sent for 5xx errors; the underlying error is only logged.
pub const INTERNAL_ERROR_MESSAGE: &str = "An internal error occurred";

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound => Self::not_found(),
            err if err.is_client_error() => Self::bad_request(err.to_string()),
            err => Self::internal(INTERNAL_ERROR_MESSAGE).with_source(err),
        }
    }
}

impl From<ProtocolError> for AppError {
    fn from(err: ProtocolError) -> Self {
        Self::bad_request(err.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)] // Test code can use expect for clear failure messages
mod tests {
    use super::*;
    use w2kit_core::ReorderError;

    #[test]
    fn test_error_display() {
        let err = AppError::bad_request("missing request parameter");
        assert_eq!(err.to_string(), "[400] missing request parameter");
    }

    #[test]
    fn test_db_error_mapping() {
        let err = AppError::from(DbError::NotFound);
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), "Not Found");

        let err = AppError::from(DbError::InvalidRequest("id must not be empty".to_string()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "id must not be empty");

        let err = AppError::from(DbError::MissingOption("table"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), INTERNAL_ERROR_MESSAGE);

        let err = AppError::from(DbError::Reorder(ReorderError::IdNotFound(7)));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = AppError::from(DbError::Database(sqlx::Error::PoolTimedOut));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), INTERNAL_ERROR_MESSAGE);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_protocol_error_is_bad_request() {
        let err = AppError::from(ProtocolError::MissingRequest);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_internal_error_body_hides_source() {
        let err = AppError::from(DbError::Database(sqlx::Error::Protocol(
            "null value in column \"quantity\" violates not-null constraint".to_string(),
        )));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(
            body,
            serde_json::json!({"status": "error", "message": INTERNAL_ERROR_MESSAGE})
        );
    }

    #[tokio::test]
    async fn test_error_body() {
        let response = AppError::payload_too_large().into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(
            body,
            serde_json::json!({"status": "error", "message": "Payload Too Large"})
        );
    }
}
