//! # Captcha Gate
//!
//! Serves a challenge form, verifies the submitted answer with the CAPTCHA
//! authority, and keeps one verification session per issued challenge.
//!
//! ## Flow
//! ```text
//! GET /challenge → session + widget
//! POST /verify   → session.verify → Authority
//!                     ↓
//!        verified (session dropped) / re-render with error code
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;
mod routes;
mod state;

use config::AppConfig;
use state::AppState;

/// Captcha Gate - challenge/response verification front
#[derive(Parser, Debug)]
#[command(name = "captcha-gate")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/captcha-gate.toml")]
    config: String,

    /// Listen address (overrides config)
    #[arg(short, long, env = "LISTEN_ADDR")]
    listen: Option<String>,

    /// Site key embedded in the widget (overrides config)
    #[arg(long, env = "CAPTCHA_PUBLIC_KEY")]
    public_key: Option<String>,

    /// Secret key sent to the authority (overrides config)
    #[arg(long, env = "CAPTCHA_PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,

    /// Authority verify endpoint (overrides config)
    #[arg(long, env = "CAPTCHA_VERIFY_URL")]
    verify_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "LOG_LEVEL")]
    log_level: String,

    /// Enable JSON logging output
    #[arg(long, default_value = "false")]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up keys from .env before clap reads the environment
    dotenvy::dotenv().ok();

    let args = Args::parse();

    init_logging(&args.log_level, args.json_logs)?;

    info!("Starting Captcha Gate v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load(&args.config, &args)?;
    info!(
        verify_url = %config.authority.verify_url,
        session_ttl_secs = config.session_ttl_secs,
        "Configuration loaded from {}",
        args.config
    );

    let state = AppState::new(config.clone())?;
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
    info!("Captcha Gate listening on {}", config.listen_addr);

    let shutdown_signal = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("Shutdown signal received");
    };

    // Client socket addresses feed the authority's remoteip field
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal)
    .await
    .context("Server error")?;

    info!("Captcha Gate shutdown complete");
    Ok(())
}

/// Initialize structured logging with tracing
fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_thread_ids(true))
            .init();
    }

    Ok(())
}
