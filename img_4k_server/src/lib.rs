//! exact4k upload service
//!
//! Axum router around the shared conversion routine: multipart uploads are
//! stretched to 3840x2160 JPEGs and the output directory can be listed,
//! downloaded (single file or zip) and cleared.

pub mod error;
pub mod routes;
pub mod state;
pub mod upload;

pub use error::ApiError;
pub use state::AppState;
pub use upload::{process_batch, UploadReport, UploadResult, UploadedFile};

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use shared_utils::ServiceConfig;

pub fn build_router(config: ServiceConfig) -> Router {
    let body_limit = config.max_upload_bytes;
    Router::new()
        .route("/upload", post(routes::upload))
        .route("/download/{filename}", get(routes::download))
        .route("/list-outputs", get(routes::list))
        .route("/download-all", get(routes::download_all))
        .route("/clear-input", post(routes::clear_input))
        .route("/clear-output", post(routes::clear_output))
        .route("/health", get(routes::health))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(AppState::new(config))
}
