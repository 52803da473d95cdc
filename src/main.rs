//! Stage Relay - presentation control server
//!
//! Serves the control and display pages, the scripture API and the
//! real-time session endpoint.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stage_relay::api::{self, AppState};
use stage_relay::config::AppConfig;
use stage_relay::hub::EventHub;
use stage_relay::scripture::{BibleApi, LocalBible, ScriptureService};
use stage_relay::songs::{SongLibrary, SongStoreActor};
use stage_relay::state::StateActor;

/// Stage Relay - drive a display screen from a control page
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to an optional YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// HTTP port
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Directory holding songs.json and kjv.json
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory with the static control and display pages
    #[arg(long)]
    public_dir: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Also write daily-rotated log files to this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_logging(&args.log_level, args.log_dir.as_deref())?;

    info!("Starting Stage Relay...");

    let config = load_config(&args).await?;
    info!("Data directory: {}", config.data_dir.display());

    let hub = EventHub::default();

    let local = match LocalBible::load(config.bible_path()).await {
        Ok(bible) => {
            info!("KJV Bible loaded successfully ({} books)", bible.book_count());
            Some(bible)
        }
        Err(e) => {
            warn!("Bible data not found, will use API fallback: {:#}", e);
            None
        }
    };
    let remote = BibleApi::new(&config.scripture.api_url, config.scripture.translation.clone())?;

    let library = SongLibrary::load(config.songs_path()).await;
    info!("Song library loaded ({} songs)", library.len());

    let state = Arc::new(AppState {
        presentation: StateActor::spawn(hub.clone()),
        songs: SongStoreActor::spawn(library, hub),
        scripture: ScriptureService::new(local, remote),
    });
    info!(
        local = state.scripture.has_local_data(),
        api = %config.scripture.api_url,
        "Scripture lookups ready"
    );

    api::start_server(state.clone(), config.port, &config.public_dir, shutdown_signal()).await?;

    state.presentation.shutdown();
    state.songs.shutdown();

    info!("Stage Relay shutdown complete");
    Ok(())
}

/// Build the effective configuration: file (or defaults), then CLI / env overrides
async fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => {
            info!("Configuration file: {}", path.display());
            AppConfig::load(path).await?
        }
        None => AppConfig::default(),
    };

    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(dir) = &args.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(dir) = &args.public_dir {
        config.public_dir = dir.clone();
    }

    config.validate()?;
    Ok(config)
}

fn init_logging(level: &str, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false);

    let (file, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "stage-relay.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .init();

    Ok(guard)
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
    info!("Shutdown signal received");
}
