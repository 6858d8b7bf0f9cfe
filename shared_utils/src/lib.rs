//! Shared Utilities for exact4k tools
//!
//! Common functionality for the batch scanner (`img_4k`) and the upload
//! service (`img_4k_server`):
//! - Exact 4K conversion (decode, color normalization, Lanczos3, JPEG q95)
//! - Output naming (timestamped / numbered / labelled)
//! - Output directory management (list, zip bundle, clear)
//! - Configuration and extension profiles
//! - Unified error type
//! - Logging and batch reporting

pub mod app_error;
pub mod batch;
pub mod common_utils;
pub mod config;
pub mod logging;
pub mod naming;
pub mod output_store;
pub mod report;
pub mod resize_4k;

pub use app_error::{AppError, ErrorKind, Result};
pub use batch::{collect_files, BatchFailure, BatchResult};
pub use config::{
    BatchConfig, ExtensionProfile, ServiceConfig, BATCH_EXTENSIONS, DEFAULT_MAX_UPLOAD_BYTES,
    JPEG_QUALITY, TARGET_HEIGHT, TARGET_WIDTH, UPLOAD_EXTENSIONS,
};
pub use naming::{secure_filename, OutputNaming};
pub use output_store::{bundle_outputs, clear_directory, list_outputs, resolve_output, OutputEntry};
pub use resize_4k::{
    convert_image_bytes, convert_to_4k, ImageMetadata, SourceImage, TARGET_SIZE_LABEL,
};
