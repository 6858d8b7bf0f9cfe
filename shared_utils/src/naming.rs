//! Output file naming.
//!
//! Three schemes exist:
//! - upload without label: `<base>_4K_<YYYYmmdd_HHMMSS_ffffff>.jpg`
//! - batch without label: `<NNN>.jpg`
//! - any entry point with a label: `<label>_image_<NNN>.jpg`
//!
//! `NNN` is the 1-based position of the file in its request or scan,
//! zero-padded to three digits.

use chrono::{DateTime, Local, Utc};
use std::path::Path;
use std::sync::Mutex;

pub const OUTPUT_EXTENSION: &str = "jpg";

/// Microseconds since the epoch of the last timestamp handed out.
static LAST_STAMP_MICROS: Mutex<i64> = Mutex::new(0);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputNaming {
    /// `<base>_4K_<timestamp>.jpg`, used by the upload endpoint.
    Timestamped,
    /// `<NNN>.jpg`, used by the batch scanner.
    Numbered,
    /// `<label>_image_<NNN>.jpg`; the label is already sanitized.
    Labelled(String),
}

impl OutputNaming {
    /// Labelled when a usable label is present, `fallback` otherwise.
    pub fn from_label(label: Option<&str>, fallback: OutputNaming) -> Self {
        match normalize_label(label) {
            Some(label) => OutputNaming::Labelled(label),
            None => fallback,
        }
    }

    pub fn file_name(&self, original_name: &str, index: usize) -> String {
        match self {
            OutputNaming::Timestamped => timestamped_name(original_name),
            OutputNaming::Numbered => format!("{:03}.{}", index, OUTPUT_EXTENSION),
            OutputNaming::Labelled(label) => labelled_name(label, index),
        }
    }

    pub fn is_deterministic(&self) -> bool {
        !matches!(self, OutputNaming::Timestamped)
    }
}

/// Replaces spaces and path separators with underscores.
pub fn sanitize_tool_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            other => other,
        })
        .collect()
}

/// Trims the label and strips leading dots so labelled outputs are never
/// hidden files; blank labels count as absent.
pub fn normalize_label(label: Option<&str>) -> Option<String> {
    label
        .map(|l| l.trim_start_matches(|c: char| c == '.' || c.is_whitespace()).trim_end())
        .filter(|l| !l.is_empty())
        .map(sanitize_tool_name)
}

pub fn labelled_name(label: &str, index: usize) -> String {
    format!("{}_image_{:03}.{}", label, index, OUTPUT_EXTENSION)
}

pub fn timestamped_name(original_name: &str) -> String {
    format!(
        "{}_4K_{}.{}",
        base_name(original_name),
        unique_timestamp(),
        OUTPUT_EXTENSION
    )
}

/// Secured file stem of a client supplied name; `image` when nothing survives.
pub fn base_name(original_name: &str) -> String {
    let secured = secure_filename(original_name);
    let stem = Path::new(&secured)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();
    if stem.is_empty() {
        "image".to_string()
    } else {
        stem
    }
}

/// Reduces a client supplied name to a flat, portable file name.
///
/// Only the last path component is kept, whitespace becomes `_`, anything
/// outside `[A-Za-z0-9._-]` is dropped and leading/trailing dots and
/// underscores are trimmed. May return an empty string.
pub fn secure_filename(name: &str) -> String {
    let last = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let flattened: String = last
        .chars()
        .filter_map(|c| {
            if c.is_whitespace() {
                Some('_')
            } else if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                Some(c)
            } else {
                None
            }
        })
        .collect();
    flattened.trim_matches(['.', '_']).to_string()
}

/// `YYYYmmdd_HHMMSS_ffffff` in local time, strictly increasing within the
/// process even when the clock stalls or several names are requested in the
/// same microsecond.
pub fn unique_timestamp() -> String {
    let now = Local::now();
    let micros = {
        let mut last = LAST_STAMP_MICROS
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        let candidate = now.timestamp_micros().max(*last + 1);
        *last = candidate;
        candidate
    };

    match DateTime::<Utc>::from_timestamp_micros(micros) {
        Some(utc) => utc
            .with_timezone(&Local)
            .format("%Y%m%d_%H%M%S_%6f")
            .to_string(),
        None => now.format("%Y%m%d_%H%M%S_%6f").to_string(),
    }
}
