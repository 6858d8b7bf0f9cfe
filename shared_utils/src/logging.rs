//! Logging Module - 统一的日志系统
//!
//! 基于 tracing 的日志初始化：
//! - 每日轮转的日志文件（默认写入系统临时目录）
//! - stderr 彩色输出（只含程序自身的事件，级别可单独设置）
//! - `RUST_LOG` 覆盖默认级别
//! - 只保留最近 N 个日志文件
//!
//! ```no_run
//! use shared_utils::logging::{init_logging, LogConfig};
//!
//! init_logging("img_4k", LogConfig::default()).expect("Failed to initialize logging");
//! tracing::info!("Program started");
//! ```

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// 日志配置
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// 日志目录（默认系统临时目录）
    pub log_dir: PathBuf,
    /// 保留的最大日志文件数量
    pub max_files: usize,
    /// File layer level.
    pub level: Level,
    /// stderr layer level; CLIs that print their own report keep this quiet.
    pub console_level: Level,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: std::env::temp_dir(),
            max_files: 5,
            level: Level::INFO,
            console_level: Level::INFO,
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.log_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_max_files(mut self, count: usize) -> Self {
        self.max_files = count;
        self
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_console_level(mut self, level: Level) -> Self {
        self.console_level = level;
        self
    }

    /// File layer directive: the program's own crate plus `shared_utils`.
    pub fn default_directive(&self, program_name: &str) -> String {
        format!(
            "{}={},shared_utils={}",
            program_name, self.level, self.level
        )
    }

    /// stderr layer directive: the program's own crate only.
    pub fn console_directive(&self, program_name: &str) -> String {
        format!("{}={}", program_name, self.console_level)
    }
}

/// `RUST_LOG` wins over the built-in directive.
fn env_filter_or(directive: String) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive))
}

/// 初始化日志系统，文件名为 `{program_name}.log.<date>`
///
/// Can only succeed once per process; later calls return an error.
pub fn init_logging(program_name: &str, config: LogConfig) -> Result<()> {
    std::fs::create_dir_all(&config.log_dir)
        .with_context(|| format!("Failed to create log directory: {:?}", config.log_dir))?;

    let log_file_name = format!("{}.log", program_name);
    let file_appender = RollingFileAppender::new(Rotation::DAILY, &config.log_dir, &log_file_name);

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_filter(env_filter_or(config.default_directive(program_name)));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .with_line_number(false)
        .with_filter(env_filter_or(config.console_directive(program_name)));

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .context("Global tracing subscriber already installed")?;

    tracing::info!(
        program = program_name,
        log_dir = ?config.log_dir,
        log_file = log_file_name,
        max_files = config.max_files,
        level = ?config.level,
        console_level = ?config.console_level,
        "Logging system initialized"
    );

    cleanup_old_logs(&config.log_dir, program_name, config.max_files)?;
    Ok(())
}

/// 清理旧日志，只保留最近修改的 `max_files` 个
fn cleanup_old_logs(log_dir: &Path, program_name: &str, max_files: usize) -> Result<()> {
    let entries = std::fs::read_dir(log_dir)
        .with_context(|| format!("Failed to read log directory: {:?}", log_dir))?;

    let mut log_files: Vec<(PathBuf, std::time::SystemTime)> = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        if !file_name.starts_with(program_name) || !file_name.contains(".log") {
            continue;
        }
        if let Ok(modified) = std::fs::metadata(&path).and_then(|m| m.modified()) {
            log_files.push((path, modified));
        }
    }

    if log_files.len() <= max_files {
        return Ok(());
    }

    log_files.sort_by(|a, b| b.1.cmp(&a.1));
    for (path, _) in log_files.iter().skip(max_files) {
        match std::fs::remove_file(path) {
            Ok(()) => tracing::debug!(path = ?path, "Removed old log file"),
            Err(e) => tracing::warn!(path = ?path, error = %e, "Failed to remove old log file"),
        }
    }
    Ok(())
}

/// 记录操作结束
pub fn log_operation_end(operation: &str, duration: Duration, success: bool) {
    if success {
        tracing::info!(
            operation = operation,
            duration_secs = duration.as_secs_f64(),
            "Operation completed successfully"
        );
    } else {
        tracing::warn!(
            operation = operation,
            duration_secs = duration.as_secs_f64(),
            "Operation completed with failures"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_log_config_default() {
        let config = LogConfig::default();
        assert_eq!(config.max_files, 5);
        assert_eq!(config.level, Level::INFO);
        assert_eq!(config.log_dir, std::env::temp_dir());
        assert_eq!(config.console_level, Level::INFO);
    }

    #[test]
    fn test_console_directive_excludes_shared_utils() {
        let config = LogConfig::new().with_console_level(Level::ERROR);
        assert_eq!(config.console_directive("img_4k"), "img_4k=ERROR");
        assert!(!config.console_directive("img_4k").contains("shared_utils"));
        assert_eq!(
            config.default_directive("img_4k"),
            "img_4k=INFO,shared_utils=INFO"
        );
    }

    #[test]
    fn test_log_config_builder() {
        let temp_dir = TempDir::new().unwrap();
        let config = LogConfig::new()
            .with_log_dir(temp_dir.path())
            .with_max_files(3)
            .with_level(Level::DEBUG);

        assert_eq!(config.log_dir, temp_dir.path());
        assert_eq!(config.max_files, 3);
        assert_eq!(config.level, Level::DEBUG);
        assert_eq!(
            config.default_directive("img_4k_server"),
            "img_4k_server=DEBUG,shared_utils=DEBUG"
        );
    }

    #[test]
    fn test_cleanup_old_logs() {
        let temp_dir = TempDir::new().unwrap();
        let program_name = "test_program";

        for i in 0..10 {
            let file_path = temp_dir
                .path()
                .join(format!("{}.log.2026-01-{:02}", program_name, i + 1));
            fs::write(&file_path, format!("log content {}", i)).unwrap();
            // 确保修改时间不同
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        fs::write(temp_dir.path().join("unrelated.txt"), "keep").unwrap();

        cleanup_old_logs(temp_dir.path(), program_name, 3).unwrap();

        let remaining: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(program_name))
            .collect();
        assert_eq!(remaining.len(), 3);
        assert!(temp_dir.path().join("unrelated.txt").exists());
        assert!(temp_dir
            .path()
            .join(format!("{}.log.2026-01-10", program_name))
            .exists());
    }
}
