//! AppError - 统一的应用错误类型
//!
//! One error type for the whole conversion chain. Callers branch on
//! [`AppError::kind`] instead of matching message strings.

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Coarse classification used by the HTTP layer and the batch report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The caller sent something we refuse to process.
    InvalidInput,
    /// Decoding, color conversion, resampling or encoding failed.
    Conversion,
    /// Missing files/directories or I/O failures.
    Filesystem,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::InvalidInput => write!(f, "INVALID_INPUT"),
            ErrorKind::Conversion => write!(f, "CONVERSION"),
            ErrorKind::Filesystem => write!(f, "FILESYSTEM"),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("No files provided")]
    MissingFile,

    #[error("No file selected")]
    EmptyFilename,

    #[error("Invalid file type. Allowed: {allowed}")]
    UnsupportedExtension { filename: String, allowed: String },

    #[error("Request body exceeds the {limit_bytes} byte upload limit")]
    PayloadTooLarge { limit_bytes: usize },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Failed to encode JPEG: {0}")]
    Encode(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Failed to build archive: {0}")]
    Archive(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AppError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        AppError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::MissingFile
            | AppError::EmptyFilename
            | AppError::UnsupportedExtension { .. }
            | AppError::PayloadTooLarge { .. }
            | AppError::InvalidRequest(_) => ErrorKind::InvalidInput,

            AppError::Decode(_) | AppError::Encode(_) => ErrorKind::Conversion,

            AppError::NotFound(_) | AppError::Archive(_) | AppError::Io { .. } => {
                ErrorKind::Filesystem
            }
        }
    }

    pub fn is_invalid_input(&self) -> bool {
        self.kind() == ErrorKind::InvalidInput
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }
}

impl From<jpeg_encoder::EncodingError> for AppError {
    fn from(e: jpeg_encoder::EncodingError) -> Self {
        AppError::Encode(e.to_string())
    }
}

impl From<zip::result::ZipError> for AppError {
    fn from(e: zip::result::ZipError) -> Self {
        AppError::Archive(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
