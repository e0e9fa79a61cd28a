//! MoodTunes web service - main entry point
//!
//! Serves the mood -> artist -> songs pages and JSON API. Configuration is
//! resolved as CLI > environment > TOML file > compiled defaults.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use moodtunes_common::config::{
    load_toml_config, resolve_config_path, write_toml_config, ConfigOverrides, ProductVariant,
    TomlConfig,
};
use moodtunes_web::{build_router, AppState};
use tokio::signal;
use tracing::info;

mod logging;

/// Command-line arguments for moodtunes-web
#[derive(Parser, Debug)]
#[command(name = "moodtunes-web")]
#[command(about = "Mood-based music recommendation service")]
#[command(version)]
struct Args {
    /// Config file (overrides MOODTUNES_CONFIG and the platform default)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "MOODTUNES_PORT")]
    port: Option<u16>,

    /// Interface to bind to
    #[arg(long, env = "MOODTUNES_BIND_ADDR")]
    bind_addr: Option<String>,

    /// Product variant: guided or classic
    #[arg(long, env = "MOODTUNES_VARIANT")]
    variant: Option<ProductVariant>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "MOODTUNES_LOG_LEVEL")]
    log_level: Option<String>,

    /// YouTube Data API key for the youtube lookup backend
    #[arg(long, env = "MOODTUNES_YOUTUBE_API_KEY", hide_env_values = true)]
    youtube_api_key: Option<String>,

    /// Write a config file with default values to PATH and exit
    #[arg(long, value_name = "PATH")]
    write_default_config: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            bind_addr: self.bind_addr.clone(),
            port: self.port,
            variant: self.variant,
            log_level: self.log_level.clone(),
            youtube_api_key: self.youtube_api_key.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(path) = &args.write_default_config {
        write_toml_config(&TomlConfig::default(), path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    // Config first: it carries the log level and file
    let config_path = resolve_config_path(args.config.as_deref());
    let mut config =
        load_toml_config(config_path.as_deref()).context("Failed to load configuration")?;
    config.apply_overrides(args.overrides());

    let _log_guard = logging::init_logging(&config.logging).context("Failed to initialize logging")?;

    // Log build identification immediately after tracing init
    info!(
        "Starting MoodTunes (moodtunes-web) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match &config_path {
        Some(path) => info!("Config file: {}", path.display()),
        None => info!("No config file; using defaults"),
    }
    info!("Product variant: {}", config.variant);

    let addr = config.listen_addr();
    let state = AppState::from_config(config);
    let flows = Arc::clone(&state.flows);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("moodtunes-web listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    flows.shutdown().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
