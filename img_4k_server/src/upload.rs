//! Upload batch processing.
//!
//! Runs on a blocking thread. Every file is validated, spooled into the
//! upload directory, converted and recorded on its own; one bad file never
//! aborts the rest of the request.

use axum::body::Bytes;
use axum::http::StatusCode;
use serde::Serialize;
use shared_utils::common_utils::get_extension_lowercase;
use shared_utils::{
    convert_to_4k, AppError, BatchResult, ImageMetadata, OutputNaming, Result, ServiceConfig,
};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{info, warn};

/// One multipart file part as received.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadResult {
    /// 1-based position in the request.
    pub index: usize,
    pub original_filename: String,
    pub output_filename: String,
    pub metadata: ImageMetadata,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadReport {
    pub success: bool,
    pub results: Vec<UploadResult>,
    /// `"<filename>: <message>"` per failed file.
    pub errors: Vec<String>,
    pub total_files: usize,
    pub successful: usize,
    #[serde(skip)]
    pub batch: BatchResult,
}

impl UploadReport {
    fn new(results: Vec<UploadResult>, batch: BatchResult) -> Self {
        Self {
            success: batch.succeeded > 0,
            errors: batch.error_messages(),
            total_files: batch.total,
            successful: batch.succeeded,
            results,
            batch,
        }
    }

    /// 200 if anything converted. Otherwise 400 when every failure was the
    /// client's fault, 500 when at least one was ours.
    pub fn status_code(&self) -> StatusCode {
        if self.successful > 0 {
            StatusCode::OK
        } else if self.batch.only_invalid_input() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Writes the upload to a hidden temp file in `upload_dir`. The file is
/// removed when the returned guard drops.
fn spool(upload_dir: &Path, file: &UploadedFile) -> Result<NamedTempFile> {
    let ext = get_extension_lowercase(Path::new(&file.filename));
    let suffix = if ext.is_empty() {
        String::new()
    } else {
        format!(".{}", ext)
    };
    let mut temp = tempfile::Builder::new()
        .prefix(".upload-")
        .suffix(&suffix)
        .tempfile_in(upload_dir)
        .map_err(|e| AppError::io(upload_dir, e))?;
    temp.write_all(&file.bytes)
        .map_err(|e| AppError::io(temp.path(), e))?;
    temp.flush().map_err(|e| AppError::io(temp.path(), e))?;
    Ok(temp)
}

fn process_one(
    config: &ServiceConfig,
    naming: &OutputNaming,
    index: usize,
    file: &UploadedFile,
) -> Result<UploadResult> {
    if file.filename.is_empty() {
        return Err(AppError::EmptyFilename);
    }
    let profile = &config.allowed_extensions;
    if !profile.allows_name(&file.filename) {
        return Err(profile.reject(&file.filename));
    }

    let spooled = spool(&config.upload_dir, file)?;
    let output_filename = naming.file_name(&file.filename, index);
    let output_path = config.output_dir.join(&output_filename);
    let metadata = convert_to_4k(spooled.path(), &output_path)?;

    Ok(UploadResult {
        index,
        original_filename: file.filename.clone(),
        output_filename,
        metadata,
    })
}

/// Converts every file in request order. `label` selects
/// `<label>_image_NNN.jpg` names; without it names are timestamped.
pub fn process_batch(
    config: &ServiceConfig,
    files: Vec<UploadedFile>,
    label: Option<&str>,
) -> UploadReport {
    let naming = OutputNaming::from_label(label, OutputNaming::Timestamped);
    let mut batch = BatchResult::new();
    let mut results = Vec::with_capacity(files.len());

    for (position, file) in files.iter().enumerate() {
        let index = position + 1;
        match process_one(config, &naming, index, file) {
            Ok(result) => {
                batch.success();
                results.push(result);
            }
            Err(e) => {
                warn!(
                    index,
                    filename = %file.filename,
                    kind = %e.kind(),
                    error = %e,
                    "Upload conversion failed"
                );
                let name = if file.filename.is_empty() {
                    format!("file {}", index)
                } else {
                    file.filename.clone()
                };
                batch.fail(name, &e);
            }
        }
    }

    info!(
        total = batch.total,
        succeeded = batch.succeeded,
        failed = batch.failed,
        labelled = naming.is_deterministic(),
        "Upload batch processed"
    );
    UploadReport::new(results, batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use std::io::Cursor;
    use tempfile::TempDir;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img =
            DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([9, 99, 199])));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn config_in(temp: &TempDir) -> ServiceConfig {
        let config = ServiceConfig::new()
            .with_upload_dir(temp.path().join("uploads"))
            .with_output_dir(temp.path().join("outputs"));
        config.ensure_dirs().unwrap();
        config
    }

    fn dir_len(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn test_rejected_extension_never_spooled() {
        let temp = TempDir::new().unwrap();
        let config = config_in(&temp);

        let report = process_batch(
            &config,
            vec![
                UploadedFile::new("notes.txt", b"hello".to_vec()),
                UploadedFile::new("anim.gif", b"GIF89a".to_vec()),
            ],
            None,
        );
        assert_eq!(report.total_files, 2);
        assert_eq!(report.successful, 0);
        assert!(!report.success);
        assert_eq!(
            report.errors[0],
            "notes.txt: Invalid file type. Allowed: BMP, JPEG, JPG, PNG, TIFF, WEBP"
        );
        assert_eq!(report.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(dir_len(&config.upload_dir), 0);
        assert_eq!(dir_len(&config.output_dir), 0);
    }

    #[test]
    fn test_empty_filename_is_invalid_input() {
        let temp = TempDir::new().unwrap();
        let config = config_in(&temp);

        let report = process_batch(&config, vec![UploadedFile::new("", Vec::<u8>::new())], None);
        assert_eq!(report.errors, vec!["file 1: No file selected"]);
        assert_eq!(report.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_corrupt_upload_is_server_error_and_cleans_spool() {
        let temp = TempDir::new().unwrap();
        let config = config_in(&temp);

        let report = process_batch(
            &config,
            vec![UploadedFile::new("broken.png", b"\x89PNG not really".to_vec())],
            None,
        );
        assert_eq!(report.successful, 0);
        assert_eq!(report.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(dir_len(&config.upload_dir), 0);
        assert_eq!(dir_len(&config.output_dir), 0);
    }

    #[test]
    fn test_mixed_batch_with_label() {
        let temp = TempDir::new().unwrap();
        let config = config_in(&temp);

        let report = process_batch(
            &config,
            vec![
                UploadedFile::new("one.png", png_bytes(16, 9)),
                UploadedFile::new("two.jpg", b"garbage".to_vec()),
                UploadedFile::new("three.png", png_bytes(9, 16)),
            ],
            Some("demo"),
        );
        assert_eq!(report.total_files, 3);
        assert_eq!(report.successful, 2);
        assert_eq!(report.status_code(), StatusCode::OK);
        assert_eq!(report.results[0].output_filename, "demo_image_001.jpg");
        assert_eq!(report.results[1].index, 3);
        assert_eq!(report.results[1].output_filename, "demo_image_003.jpg");
        assert_eq!(report.results[1].metadata.original_size, "9x16");
        assert!(report.errors[0].starts_with("two.jpg: "));
        assert!(config.output_dir.join("demo_image_003.jpg").is_file());
        assert_eq!(dir_len(&config.upload_dir), 0);
    }

    #[test]
    fn test_timestamped_names_are_distinct() {
        let temp = TempDir::new().unwrap();
        let config = config_in(&temp);

        let report = process_batch(
            &config,
            vec![
                UploadedFile::new("same.png", png_bytes(4, 4)),
                UploadedFile::new("same.png", png_bytes(4, 4)),
            ],
            Some("   "),
        );
        assert_eq!(report.successful, 2);
        let first = &report.results[0].output_filename;
        let second = &report.results[1].output_filename;
        assert!(first.starts_with("same_4K_") && first.ends_with(".jpg"));
        assert_ne!(first, second);
        assert_eq!(dir_len(&config.output_dir), 2);
    }
}
