//! Output directory management: list, zip bundle, clear, resolve downloads.
//!
//! Pure file-system operations; nothing here touches pixels.

use crate::app_error::{AppError, Result};
use crate::common_utils::{bytes_to_mib, is_hidden_file};
use serde::{Deserialize, Serialize};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputEntry {
    pub filename: String,
    /// Size in bytes.
    pub size: u64,
    /// Size in MiB, two decimals.
    pub size_mb: f64,
}

/// Visible regular files of `dir`, sorted by name. Missing `dir` yields `[]`.
fn visible_files(dir: &Path) -> Result<Vec<(String, PathBuf, u64)>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let entries = std::fs::read_dir(dir).map_err(|e| AppError::io(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| AppError::io(dir, e))?;
        let path = entry.path();
        let metadata = entry.metadata().map_err(|e| AppError::io(&path, e))?;
        if !metadata.is_file() || is_hidden_file(&path) {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        files.push((name, path, metadata.len()));
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}

pub fn list_outputs(dir: &Path) -> Result<Vec<OutputEntry>> {
    Ok(visible_files(dir)?
        .into_iter()
        .map(|(filename, _, size)| OutputEntry {
            filename,
            size,
            size_mb: bytes_to_mib(size),
        })
        .collect())
}

/// Zips every listed output into an in-memory archive.
pub fn bundle_outputs(dir: &Path) -> Result<Vec<u8>> {
    if !dir.is_dir() {
        return Err(AppError::NotFound(format!(
            "Output directory {} does not exist",
            dir.display()
        )));
    }
    let files = visible_files(dir)?;
    if files.is_empty() {
        return Err(AppError::NotFound("No output files to download".to_string()));
    }

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, path, _) in &files {
        let bytes = std::fs::read(path).map_err(|e| AppError::io(path, e))?;
        zip.start_file(name.as_str(), options)?;
        zip.write_all(&bytes).map_err(|e| AppError::io(path, e))?;
    }
    let archive = zip.finish()?.into_inner();

    info!(
        dir = %dir.display(),
        files = files.len(),
        archive_bytes = archive.len(),
        "Bundled outputs"
    );
    Ok(archive)
}

/// Deletes every regular file in `dir` and returns how many were removed.
/// A missing directory is a no-op.
pub fn clear_directory(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        debug!(dir = %dir.display(), "Nothing to clear, directory absent");
        return Ok(0);
    }

    let entries = std::fs::read_dir(dir).map_err(|e| AppError::io(dir, e))?;
    let mut removed = 0;
    for entry in entries {
        let entry = entry.map_err(|e| AppError::io(dir, e))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| AppError::io(&path, e))?;
        if !file_type.is_file() {
            continue;
        }
        match std::fs::remove_file(&path) {
            Ok(()) => removed += 1,
            // Raced with a concurrent request's cleanup.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(AppError::io(&path, e)),
        }
    }

    info!(dir = %dir.display(), removed, "Cleared directory");
    Ok(removed)
}

/// Maps a requested download name onto an existing file inside `dir`.
///
/// The name is looked up literally, exactly as `list_outputs` reports it.
/// Anything that could leave `dir` (separators, `.`, `..`) or that names a
/// hidden file is refused.
pub fn resolve_output(dir: &Path, requested: &str) -> Result<PathBuf> {
    if requested.is_empty()
        || requested.contains(['/', '\\'])
        || requested.starts_with('.')
    {
        return Err(AppError::NotFound(requested.to_string()));
    }
    let path = dir.join(requested);
    if path.is_file() {
        Ok(path)
    } else {
        Err(AppError::NotFound(requested.to_string()))
    }
}
