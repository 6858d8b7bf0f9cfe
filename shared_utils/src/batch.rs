//! Batch Processing Module
//!
//! File collection for directory scans and the running tally of a batch.
//! A failed file is recorded and the batch moves on.

use crate::app_error::ErrorKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Regular files directly inside `dir` whose extension is in `extensions`,
/// sorted by path. Subdirectories are not entered.
pub fn collect_files(dir: &Path, extensions: &[&str]) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| crate::common_utils::has_extension(e.path(), extensions))
        .map(|e| e.path().to_path_buf())
        .collect();
    files.sort();
    files
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    /// Client-visible name of the file (upload name or path).
    pub name: String,
    pub message: String,
    pub kind: ErrorKind,
}

#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub errors: Vec<BatchFailure>,
}

impl BatchResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(&mut self) {
        self.total += 1;
        self.succeeded += 1;
    }

    pub fn fail(&mut self, name: impl Into<String>, error: &crate::AppError) {
        self.total += 1;
        self.failed += 1;
        self.errors.push(BatchFailure {
            name: name.into(),
            message: error.to_string(),
            kind: error.kind(),
        });
    }

    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.succeeded as f64 / self.total as f64) * 100.0
        }
    }

    /// True when at least one file failed and every failure was the caller's fault.
    pub fn only_invalid_input(&self) -> bool {
        !self.errors.is_empty()
            && self
                .errors
                .iter()
                .all(|e| e.kind == ErrorKind::InvalidInput)
    }

    /// `"<name>: <message>"` lines, in processing order.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .map(|e| format!("{}: {}", e.name, e.message))
            .collect()
    }
}
