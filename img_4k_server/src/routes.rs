//! HTTP handlers.

use crate::error::ApiError;
use crate::state::AppState;
use crate::upload::{process_batch, UploadReport, UploadedFile};
use axum::body::Body;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use shared_utils::common_utils::get_extension_lowercase;
use shared_utils::{
    bundle_outputs, clear_directory, list_outputs, resolve_output, AppError, OutputEntry,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

/// Runs blocking file-system work off the async workers.
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> shared_utils::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::internal(format!("Worker task failed: {}", e)))?
        .map_err(ApiError::from)
}

fn multipart_error(e: MultipartError, limit_bytes: usize) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge { limit_bytes }.into()
    } else {
        AppError::InvalidRequest(e.body_text()).into()
    }
}

fn attachment(content_type: &str, filename: &str, body: Body) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}

/// `POST /upload`: multipart `files` (or `file`) parts plus optional `tool_name`.
pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<UploadReport>), ApiError> {
    let mut multipart =
        multipart.map_err(|e| ApiError::from(AppError::InvalidRequest(e.body_text())))?;
    let limit = state.config.max_upload_bytes;

    let mut files = Vec::new();
    let mut label = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "files" | "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(|e| multipart_error(e, limit))?;
                files.push(UploadedFile::new(filename, bytes));
            }
            "tool_name" => {
                label = Some(field.text().await.map_err(|e| multipart_error(e, limit))?);
            }
            other => debug!(field = other, "Ignoring unknown multipart field"),
        }
    }

    if files.is_empty() {
        return Err(AppError::MissingFile.into());
    }

    info!(files = files.len(), label = ?label, "Upload received");
    let config = Arc::clone(&state.config);
    let report =
        tokio::task::spawn_blocking(move || process_batch(&config, files, label.as_deref()))
            .await
            .map_err(|e| ApiError::internal(format!("Upload worker failed: {}", e)))?;

    Ok((report.status_code(), Json(report)))
}

/// `GET /download/{filename}`: streams the file instead of buffering it.
pub async fn download(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let dir = state.config.output_dir.clone();
    let path = blocking(move || resolve_output(&dir, &filename)).await?;
    let file = tokio::fs::File::open(&path)
        .await
        .map_err(|e| AppError::io(&path, e))?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let content_type = match get_extension_lowercase(&path).as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        _ => "application/octet-stream",
    };
    debug!(file = %name, "Streaming download");
    Ok(attachment(
        content_type,
        &name,
        Body::from_stream(ReaderStream::new(file)),
    ))
}

/// `GET /list-outputs`
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<OutputEntry>>, ApiError> {
    let dir = state.config.output_dir.clone();
    Ok(Json(blocking(move || list_outputs(&dir)).await?))
}

/// `GET /download-all`: every output in one zip.
pub async fn download_all(State(state): State<AppState>) -> Result<Response, ApiError> {
    let dir = state.config.output_dir.clone();
    let archive = blocking(move || bundle_outputs(&dir)).await?;
    let name = format!(
        "4k_outputs_{}.zip",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );
    Ok(attachment("application/zip", &name, Body::from(archive)))
}

async fn clear(dir: PathBuf) -> (StatusCode, Json<Value>) {
    let target = dir.clone();
    match blocking(move || clear_directory(&target)).await {
        Ok(deleted) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": format!("Cleared {} file(s) from {}", deleted, dir.display()),
                "deleted": deleted,
            })),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "success": false, "error": e.message() })),
        ),
    }
}

/// `POST /clear-input`
pub async fn clear_input(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    clear(state.config.upload_dir.clone()).await
}

/// `POST /clear-output`
pub async fn clear_output(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    clear(state.config.output_dir.clone()).await
}

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}
