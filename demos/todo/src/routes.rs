//! Router configuration for the todo server.

use crate::config::Config;
use crate::{files, status, todo};
use axum::{
    Extension, Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use sqlx::{PgPool, Postgres, pool::PoolConnection};
use tower_http::{
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use w2kit_postgres::DbError;
use w2kit_web::{AppError, UploadLimits};

/// Check a connection out of the pool.
///
/// # Errors
///
/// Returns a 500 [`AppError`] if the pool cannot provide a connection.
pub async fn connection(pool: &PgPool) -> Result<PoolConnection<Postgres>, AppError> {
    Ok(pool.acquire().await.map_err(DbError::from)?)
}

/// Build the complete router.
///
/// `GET /` serves `index.html` and `/lib/` serves the browser helpers, both from
/// [`Config::static_dir`]. All endpoints live under `/api/v1`:
///
/// | Method   | Path                    |
/// |----------|-------------------------|
/// | GET      | `/todo/grid/records`    |
/// | POST     | `/todo/grid/save`       |
/// | POST     | `/todo/grid/remove`     |
/// | GET/POST | `/todo/form`            |
/// | GET      | `/status/dropdown`      |
/// | GET      | `/status/grid/records`  |
/// | POST     | `/status/grid/reorder`  |
/// | POST     | `/files`                |
pub fn build_router(pool: PgPool, config: &Config) -> Router {
    let api_routes = Router::new()
        // Todo grid
        .route("/todo/grid/records", get(todo::grid_records))
        .route("/todo/grid/save", post(todo::grid_save))
        .route("/todo/grid/remove", post(todo::grid_remove))
        // Todo form
        .route("/todo/form", get(todo::form_get).post(todo::form_save))
        // Status
        .route("/status/dropdown", get(status::dropdown))
        .route("/status/grid/records", get(status::grid_records))
        .route("/status/grid/reorder", post(status::grid_reorder))
        // Uploads
        .route("/files", post(files::upload));

    Router::new()
        .route_service("/", ServeFile::new(config.static_dir.join("index.html")))
        .nest_service("/lib", ServeDir::new(config.static_dir.join("lib")))
        .nest("/api/v1", api_routes)
        .layer(Extension(UploadLimits::new(config.max_upload_size)))
        .layer(DefaultBodyLimit::max(config.max_request_size))
        .layer(TraceLayer::new_for_http())
        .with_state(pool)
}

#[cfg(test)]
#[allow(clippy::expect_used)] // Test code can use expect for clear failure messages
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
    };
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    // Requests rejected before a connection is checked out never touch the database.
    fn app(config: &Config) -> Router {
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .expect("valid database url");
        build_router(pool, config)
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    fn multipart(boundary: &str, files: &[(&str, &[u8])]) -> Body {
        let mut body = Vec::new();
        for (name, data) in files {
            body.extend_from_slice(
                format!(
                    "--{boundary}\r\nContent-Disposition: form-data; name=\"files[]\"; \
                     filename=\"{name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
        Body::from(body)
    }

    #[tokio::test]
    async fn test_grid_records_require_request() {
        let request = Request::builder()
            .uri("/api/v1/todo/grid/records")
            .body(Body::empty())
            .expect("Valid request");

        let response = app(&Config::default())
            .oneshot(request)
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"status": "error", "message": "missing request parameter"})
        );
    }

    #[tokio::test]
    async fn test_malformed_save_is_rejected() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/todo/grid/save")
            .body(Body::from(r#"{"changes": [{"id": "one"}]}"#))
            .expect("Valid request");

        let response = app(&Config::default())
            .oneshot(request)
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["status"], "error");
    }

    #[tokio::test]
    async fn test_upload_reports_file_count() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/files")
            .header("content-type", "multipart/form-data; boundary=XYZ")
            .body(multipart("XYZ", &[("a.txt", b"hello"), ("b.txt", b"world")]))
            .expect("Valid request");

        let response = app(&Config::default())
            .oneshot(request)
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"status": "success", "message": "2 file(s) uploaded"})
        );
    }

    #[tokio::test]
    async fn test_upload_over_limit() {
        let config = Config {
            max_upload_size: 4,
            ..Config::default()
        };
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/files")
            .header("content-type", "multipart/form-data; boundary=XYZ")
            .body(multipart("XYZ", &[("a.txt", b"hello")]))
            .expect("Valid request");

        let response = app(&config).oneshot(request).await.expect("router responds");

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body_json(response).await["message"], "Payload Too Large");
    }

    #[tokio::test]
    async fn test_index_page() {
        let request = Request::builder()
            .uri("/")
            .body(Body::empty())
            .expect("Valid request");

        let response = app(&Config::default())
            .oneshot(request)
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert!(content_type.starts_with("text/html"), "got {content_type}");
    }

    #[tokio::test]
    async fn test_helpers_script() {
        let request = Request::builder()
            .uri("/lib/w2ui.helpers.js")
            .body(Body::empty())
            .expect("Valid request");

        let response = app(&Config::default())
            .oneshot(request)
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let script = String::from_utf8(bytes.to_vec()).expect("utf-8 script");
        assert!(script.contains("export async function w2fetch"));
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let request = Request::builder()
            .uri("/api/v2/todo/grid/records")
            .body(Body::empty())
            .expect("Valid request");

        let response = app(&Config::default())
            .oneshot(request)
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
