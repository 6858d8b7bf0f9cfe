use anyhow::{Context, Result};
use clap::Parser;
use img_4k_server::build_router;
use shared_utils::logging::{init_logging, LogConfig};
use shared_utils::ServiceConfig;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "img-4k-server")]
#[command(version, about = "Upload service that converts images to exact 3840x2160 JPEGs", long_about = None)]
struct Cli {
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    #[arg(long, default_value_t = 5000)]
    port: u16,

    /// Holding area for uploads during conversion
    #[arg(long, default_value = "uploads")]
    upload_dir: PathBuf,

    #[arg(long, default_value = "outputs")]
    output_dir: PathBuf,

    /// Request body cap in MiB
    #[arg(long, default_value_t = 50)]
    max_upload_mb: usize,
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = init_logging("img_4k_server", LogConfig::default());

    let cli = Cli::parse();
    let config = ServiceConfig::new()
        .with_upload_dir(&cli.upload_dir)
        .with_output_dir(&cli.output_dir)
        .with_max_upload_bytes(cli.max_upload_mb.saturating_mul(1024 * 1024));
    config
        .ensure_dirs()
        .context("Failed to create service directories")?;

    let addr = format!("{}:{}", cli.host, cli.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!(
        addr = %addr,
        upload_dir = %config.upload_dir.display(),
        output_dir = %config.output_dir.display(),
        max_upload_bytes = config.max_upload_bytes,
        "Server listening"
    );

    axum::serve(listener, build_router(config))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;
    Ok(())
}
