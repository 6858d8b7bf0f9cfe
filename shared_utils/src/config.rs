//! Configuration for the upload service and the batch scanner.
//!
//! The two entry points accept different extension sets: the batch scanner
//! also takes `gif`, the upload endpoint does not.

use crate::app_error::{AppError, Result};
use crate::common_utils::ensure_dir_exists;
use std::path::{Path, PathBuf};

/// Output width in pixels.
pub const TARGET_WIDTH: u32 = 3840;
/// Output height in pixels.
pub const TARGET_HEIGHT: u32 = 2160;
/// JPEG quality used for every output.
pub const JPEG_QUALITY: u8 = 95;
/// Default request body cap for the upload endpoint (50 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

pub const UPLOAD_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "bmp", "tiff"];

pub const BATCH_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "bmp", "tiff", "gif"];

/// A named allow-list of lowercase file extensions (without the dot).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionProfile {
    name: &'static str,
    extensions: Vec<String>,
}

impl ExtensionProfile {
    pub fn new(name: &'static str, extensions: &[&str]) -> Self {
        Self {
            name,
            extensions: extensions.iter().map(|e| e.to_ascii_lowercase()).collect(),
        }
    }

    pub fn upload() -> Self {
        Self::new("upload", UPLOAD_EXTENSIONS)
    }

    pub fn batch() -> Self {
        Self::new("batch", BATCH_EXTENSIONS)
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub fn extensions(&self) -> Vec<&str> {
        self.extensions.iter().map(String::as_str).collect()
    }

    /// Checks the suffix after the last dot of a client-supplied file name.
    /// A name without a dot is never allowed.
    pub fn allows_name(&self, filename: &str) -> bool {
        match filename.rsplit_once('.') {
            Some((_, ext)) => self.allows_extension(ext),
            None => false,
        }
    }

    pub fn allows_extension(&self, ext: &str) -> bool {
        let ext = ext.to_ascii_lowercase();
        self.extensions.iter().any(|e| *e == ext)
    }

    /// Human readable list for error messages, e.g. `BMP, JPEG, JPG, PNG`.
    pub fn display_list(&self) -> String {
        let mut upper: Vec<String> = self
            .extensions
            .iter()
            .map(|e| e.to_ascii_uppercase())
            .collect();
        upper.sort();
        upper.join(", ")
    }

    pub fn reject(&self, filename: &str) -> AppError {
        AppError::UnsupportedExtension {
            filename: filename.to_string(),
            allowed: self.display_list(),
        }
    }
}

/// Settings handed to the upload service at construction time.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Holding area for uploads while they are converted.
    pub upload_dir: PathBuf,
    pub output_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub allowed_extensions: ExtensionProfile,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            output_dir: PathBuf::from("outputs"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            allowed_extensions: ExtensionProfile::upload(),
        }
    }
}

impl ServiceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_upload_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.upload_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_output_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.output_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = bytes;
        self
    }

    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [&self.upload_dir, &self.output_dir] {
            ensure_dir_exists(dir)?;
        }
        Ok(())
    }
}

/// Settings for one run of the directory scanner.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub allowed_extensions: ExtensionProfile,
    /// Optional label; switches output names to `<label>_image_NNN.jpg`.
    pub tool_name: Option<String>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("outputs"),
            allowed_extensions: ExtensionProfile::batch(),
            tool_name: None,
        }
    }
}

impl BatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.input_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_output_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.output_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_tool_name(mut self, name: Option<String>) -> Self {
        self.tool_name = name;
        self
    }

    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [&self.input_dir, &self.output_dir] {
            ensure_dir_exists(dir)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_upload_profile_rejects_gif() {
        let upload = ExtensionProfile::upload();
        assert!(upload.allows_name("cat.PNG"));
        assert!(upload.allows_name("archive.tar.jpeg"));
        assert!(!upload.allows_name("loop.gif"));
        assert!(!upload.allows_name("notes.txt"));
        assert!(!upload.allows_name("png"));
    }

    #[test]
    fn test_batch_profile_accepts_gif() {
        let batch = ExtensionProfile::batch();
        assert!(batch.allows_name("loop.gif"));
        assert!(batch.allows_name("loop.GIF"));
        assert!(!batch.allows_name("readme"));
    }

    #[test]
    fn test_display_list_sorted_upper() {
        assert_eq!(
            ExtensionProfile::upload().display_list(),
            "BMP, JPEG, JPG, PNG, TIFF, WEBP"
        );
    }

    #[test]
    fn test_service_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.output_dir, PathBuf::from("outputs"));
        assert_eq!(config.max_upload_bytes, 50 * 1024 * 1024);
        assert_eq!(config.allowed_extensions.name(), "upload");
    }

    #[test]
    fn test_ensure_dirs_creates_both() {
        let temp = TempDir::new().unwrap();
        let config = ServiceConfig::new()
            .with_upload_dir(temp.path().join("up"))
            .with_output_dir(temp.path().join("nested/out"));
        config.ensure_dirs().unwrap();
        assert!(config.upload_dir.is_dir());
        assert!(config.output_dir.is_dir());

        let batch = BatchConfig::new()
            .with_input_dir(temp.path().join("in"))
            .with_output_dir(temp.path().join("out"));
        batch.ensure_dirs().unwrap();
        assert!(batch.input_dir.is_dir());
        assert!(batch.output_dir.is_dir());
    }
}
