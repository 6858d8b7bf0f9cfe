//! Directory scanner: every supported file in the input directory becomes a
//! numbered 3840x2160 JPEG in the output directory.
//!
//! Files are handled one after another in name order. A failure is reported
//! and counted, never fatal to the rest of the batch.

use shared_utils::logging::log_operation_end;
use shared_utils::naming::{normalize_label, OutputNaming};
use shared_utils::{
    collect_files, report, AppError, BatchConfig, BatchResult, Result, SourceImage,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{info, warn};

#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub result: BatchResult,
    /// Written files, in processing order.
    pub outputs: Vec<PathBuf>,
    pub duration: Duration,
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Creates both directories, converts every matching input and prints the
/// console report to stdout. Only directory setup errors are returned as `Err`.
pub fn run_batch(config: &BatchConfig) -> Result<BatchOutcome> {
    run_batch_with(config, &mut std::io::stdout().lock())
}

fn report_err(e: std::io::Error) -> AppError {
    AppError::io("<report>", e)
}

/// [`run_batch`] with the console report written to `out`.
pub fn run_batch_with<W: Write>(config: &BatchConfig, out: &mut W) -> Result<BatchOutcome> {
    let start = Instant::now();
    config.ensure_dirs()?;

    let extensions = config.allowed_extensions.extensions();
    let files = collect_files(&config.input_dir, &extensions);
    if files.is_empty() {
        report::print_no_images(out, &extensions).map_err(report_err)?;
        return Ok(BatchOutcome {
            duration: start.elapsed(),
            ..BatchOutcome::default()
        });
    }

    let label = normalize_label(config.tool_name.as_deref());
    let naming = match &label {
        Some(label) => OutputNaming::Labelled(label.clone()),
        None => OutputNaming::Numbered,
    };
    report::print_batch_header(out, files.len(), label.as_deref()).map_err(report_err)?;
    info!(
        input_dir = %config.input_dir.display(),
        output_dir = %config.output_dir.display(),
        files = files.len(),
        "Starting batch conversion"
    );

    let mut result = BatchResult::new();
    let mut outputs = Vec::with_capacity(files.len());

    for (position, path) in files.iter().enumerate() {
        let name = display_name(path);
        let output_name = naming.file_name(&name, position + 1);
        let output_path = config.output_dir.join(&output_name);

        report::print_file_start(out, &name).map_err(report_err)?;
        let converted = SourceImage::open(path).and_then(|source| {
            report::print_original_size(out, &source.metadata.original_size)
                .map_err(report_err)?;
            source.save_4k(&output_path)
        });
        match converted {
            Ok(_) => {
                report::print_file_success(out, &output_name).map_err(report_err)?;
                result.success();
                outputs.push(output_path);
            }
            Err(e) => {
                warn!(file = %path.display(), error = %e, kind = %e.kind(), "Conversion failed");
                report::print_file_failure(out, &name, &e.to_string()).map_err(report_err)?;
                result.fail(name, &e);
            }
        }
        writeln!(out).map_err(report_err)?;
    }

    report::print_batch_summary(out, &result, &config.output_dir).map_err(report_err)?;
    let duration = start.elapsed();
    log_operation_end("batch_convert", duration, result.failed == 0);

    Ok(BatchOutcome {
        result,
        outputs,
        duration,
    })
}
