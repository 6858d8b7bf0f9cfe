//! Common Utilities Module
//!
//! 通用工具函数集合：扩展名判断、隐藏文件判断、目录创建。

use crate::app_error::{AppError, Result};
use std::path::Path;

/// 获取小写扩展名，没有扩展名时返回空字符串
///
/// ```
/// use std::path::Path;
/// use shared_utils::common_utils::get_extension_lowercase;
///
/// assert_eq!(get_extension_lowercase(Path::new("test.JPG")), "jpg");
/// assert_eq!(get_extension_lowercase(Path::new("noext")), "");
/// ```
pub fn get_extension_lowercase(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default()
}

/// 扩展名是否在列表中（不区分大小写，列表不带点号）
///
/// ```
/// use std::path::Path;
/// use shared_utils::common_utils::has_extension;
///
/// assert!(has_extension(Path::new("photo.JPEG"), &["jpg", "jpeg"]));
/// assert!(!has_extension(Path::new("clip.mp4"), &["jpg", "jpeg"]));
/// ```
pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    let ext = get_extension_lowercase(path);
    !ext.is_empty() && extensions.contains(&ext.as_str())
}

/// Dot-files are in-flight temporaries (see `resize_4k::write_atomically`)
/// or OS clutter; listings and bundles skip them.
pub fn is_hidden_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}

pub fn ensure_dir_exists(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| AppError::io(dir, e))
}

/// Bytes to MiB rounded to two decimals.
pub fn bytes_to_mib(bytes: u64) -> f64 {
    let mib = bytes as f64 / (1024.0 * 1024.0);
    (mib * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_extension_case_insensitive() {
        let exts = &["png", "tiff"];
        assert!(has_extension(Path::new("a/b/scan.TIFF"), exts));
        assert!(has_extension(Path::new("x.Png"), exts));
        assert!(!has_extension(Path::new("x.png.bak"), exts));
        assert!(!has_extension(Path::new("png"), exts));
    }

    #[test]
    fn test_is_hidden_file() {
        assert!(is_hidden_file(Path::new("outputs/.partial-abc.jpg.tmp")));
        assert!(is_hidden_file(Path::new(".DS_Store")));
        assert!(!is_hidden_file(Path::new("outputs/001.jpg")));
    }

    #[test]
    fn test_bytes_to_mib_rounding() {
        assert_eq!(bytes_to_mib(0), 0.0);
        assert_eq!(bytes_to_mib(1024 * 1024), 1.0);
        assert_eq!(bytes_to_mib(1_572_864), 1.5);
        // 1234567 B = 1.17737... MiB
        assert_eq!(bytes_to_mib(1_234_567), 1.18);
    }
}
