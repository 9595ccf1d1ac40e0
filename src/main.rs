use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use facilityd::{achievements::seed, config::FacilityConfig, rest, storage::Storage, AppContext};

#[derive(Parser)]
#[command(
    name = "facilityd",
    about = "Campus facility locator — backend service",
    version
)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP server port
    #[arg(long, env = "FACILITYD_PORT")]
    port: Option<u16>,

    /// Data directory for config and the SQLite database
    #[arg(long, env = "FACILITYD_DATA_DIR")]
    data_dir: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "FACILITYD_LOG")]
    log: Option<String>,

    /// Bind address for the HTTP server (default: 127.0.0.1; use 0.0.0.0 for LAN access)
    #[arg(long, env = "FACILITYD_BIND")]
    bind_address: Option<String>,

    /// Write logs to this file path (rotated daily). Optional.
    #[arg(long, env = "FACILITYD_LOG_FILE")]
    log_file: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server (default when no subcommand given).
    Serve,
    /// Seed the built-in achievement definitions and exit.
    ///
    /// Safe to re-run; definitions are upserted by id.
    Seed,
}

/// Returns the appender guard when logging to a file; dropping it flushes
/// buffered log lines on shutdown.
fn init_tracing(
    config: &FacilityConfig,
    log_file: Option<&Path>,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = tracing_subscriber::EnvFilter::try_new(&config.log)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if let Some(path) = log_file {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let file = path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_else(|| "facilityd.log".to_string());
        let appender = tracing_appender::rolling::daily(dir, file);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        if config.log_format == "json" {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .json()
                .init();
        } else {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
        }
        Some(guard)
    } else {
        if config.log_format == "json" {
            tracing_subscriber::fmt().with_env_filter(filter).json().init();
        } else {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
        None
    }
}

async fn serve(config: Arc<FacilityConfig>) -> Result<()> {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        data_dir = %config.data_dir.display(),
        "facilityd starting"
    );

    let storage = Arc::new(Storage::new(&config.data_dir).await?);
    // Definitions are static at runtime; refreshing them here keeps a fresh
    // database usable without a separate seed step.
    seed::seed(&storage).await?;

    let ctx = Arc::new(AppContext::new(config, storage));
    rest::start_rest_server(ctx).await
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Arc::new(FacilityConfig::new(
        args.port,
        args.data_dir,
        args.log,
        args.bind_address,
    ));
    let _guard = init_tracing(&config, args.log_file.as_deref());

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Seed => {
            let storage = Storage::new(&config.data_dir).await?;
            let count = seed::seed(&storage).await?;
            println!("seeded {count} achievement definitions");
            Ok(())
        }
    }
}
