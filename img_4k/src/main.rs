use clap::Parser;
use img_4k::run_batch;
use shared_utils::logging::{init_logging, LogConfig};
use shared_utils::BatchConfig;
use tracing::Level;

#[derive(Parser)]
#[command(name = "img-4k")]
#[command(
    version,
    about = "Stretch every image in ./input to an exact 3840x2160 JPEG in ./outputs",
    long_about = None
)]
struct Cli {
    /// Optional label; outputs are named <TOOL_NAME>_image_001.jpg, ... instead of 001.jpg, ...
    #[arg(value_name = "TOOL_NAME")]
    tool_name: Option<String>,
}

fn main() -> anyhow::Result<()> {
    // stdout carries the batch report; stderr only gets errors.
    let _ = init_logging(
        "img_4k",
        LogConfig::default().with_console_level(Level::ERROR),
    );

    let cli = Cli::parse();
    let config = BatchConfig::default().with_tool_name(cli.tool_name);

    // Partial failures are reported on stdout; the exit status stays 0.
    let outcome = run_batch(&config)?;
    tracing::info!(
        succeeded = outcome.result.succeeded,
        failed = outcome.result.failed,
        success_rate = outcome.result.success_rate(),
        duration_secs = outcome.duration.as_secs_f64(),
        "Batch finished"
    );
    Ok(())
}
