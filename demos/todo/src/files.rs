//! File upload endpoint.

use axum::Json;
use w2kit_core::protocol::BaseResponse;
use w2kit_web::{UploadedFiles, WebResult};

/// Accept the `files[]` parts and report how many arrived.
///
/// The files are logged and dropped; a real backend would store them.
#[allow(clippy::unused_async)]
pub async fn upload(UploadedFiles(files): UploadedFiles) -> WebResult<Json<BaseResponse>> {
    for file in &files {
        tracing::info!(
            file_name = file.file_name.as_deref().unwrap_or_default(),
            content_type = file.content_type.as_deref().unwrap_or_default(),
            size = file.len(),
            "received file"
        );
    }

    Ok(Json(
        BaseResponse::success().with_message(format!("{} file(s) uploaded", files.len())),
    ))
}
