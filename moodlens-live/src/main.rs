//! Moodlens Live (moodlens-live) - Main entry point
//!
//! Runs the live mood loop against an HTTP classifier and exposes the
//! control/SSE API.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use moodlens_common::config::{load_toml_config, resolve_config_path, CONFIG_ENV_VAR};
use moodlens_common::events::EventBus;
use moodlens_common::time::millis_to_duration;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use moodlens_live::api::{self, AppState};
use moodlens_live::capture::FileFrameSource;
use moodlens_live::consumer::EventBusConsumer;
use moodlens_live::inference::{Endpoint, HttpClassifier};
use moodlens_live::snapshot::SnapshotCapture;
use moodlens_live::{LiveLoop, LiveLoopDeps, LiveSettings};

/// Command-line arguments for moodlens-live
#[derive(Parser, Debug)]
#[command(name = "moodlens-live")]
#[command(about = "Adaptive live mood inference service")]
#[command(version)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "MOODLENS_PORT")]
    port: Option<u16>,

    /// Live analysis endpoint of the classifier
    #[arg(long, env = "MOODLENS_CLASSIFIER_URL")]
    classifier_url: Option<String>,

    /// Snapshot endpoint of the classifier
    #[arg(long, env = "MOODLENS_SNAPSHOT_URL")]
    snapshot_url: Option<String>,

    /// Frame file, or directory whose newest image is the current frame
    #[arg(short, long, env = "MOODLENS_FRAME_PATH")]
    frame_path: Option<PathBuf>,

    /// Start the live loop immediately
    #[arg(long)]
    autostart: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = resolve_config_path(args.config.as_deref(), CONFIG_ENV_VAR);
    let config = load_toml_config(config_path.as_deref()).context("Failed to load config")?;

    // Initialize tracing
    let default_filter = format!(
        "moodlens_live={level},moodlens_common={level},tower_http=info",
        level = config.logging.level
    );
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &config_path {
        Some(path) => info!("Config file: {}", path.display()),
        None => info!("No config file, using built-in defaults"),
    }

    // CLI/env override TOML
    let port = args.port.unwrap_or(config.port);
    let classifier_url = args.classifier_url.unwrap_or(config.classifier_url);
    let snapshot_url = args.snapshot_url.unwrap_or(config.snapshot_url);
    let Some(frame_path) = args.frame_path.or(config.frame_path) else {
        bail!("No frame source configured (use --frame-path, MOODLENS_FRAME_PATH or frame_path in the config file)");
    };
    let request_timeout = millis_to_duration(config.request_timeout_ms);
    let settings = LiveSettings::from_section(&config.live).context("Invalid [live] settings")?;

    info!("Starting Moodlens Live on port {}", port);
    info!("Classifier: {} (snapshot: {})", classifier_url, snapshot_url);
    info!("Frame source: {}", frame_path.display());

    let events = EventBus::new(256);
    let frames = Arc::new(FileFrameSource::new(frame_path));
    let consumer = Arc::new(EventBusConsumer::new(events.clone()));

    let live_classifier = HttpClassifier::new(classifier_url, Endpoint::Live, request_timeout)
        .context("Failed to build live classifier client")?;
    let snapshot_classifier =
        HttpClassifier::new(snapshot_url, Endpoint::Snapshot, request_timeout)
            .context("Failed to build snapshot classifier client")?;

    let live = LiveLoop::new(
        LiveLoopDeps {
            frames: frames.clone(),
            classifier: Arc::new(live_classifier),
            consumer: consumer.clone(),
            events: events.clone(),
        },
        settings,
        request_timeout,
    );
    let snapshot = Arc::new(SnapshotCapture::new(
        frames,
        Arc::new(snapshot_classifier),
        consumer,
        request_timeout,
    ));

    if args.autostart {
        let live = live.clone();
        tokio::spawn(async move {
            if let Err(e) = live.start().await {
                warn!("Autostart failed: {}", e);
            }
        });
    }

    let app = api::build_router(AppState {
        live: live.clone(),
        snapshot,
        events,
        startup_time: chrono::Utc::now(),
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    live.stop();
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down");
        },
    }
}
