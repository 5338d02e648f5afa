//! huginnd — Huginn feedback analysis daemon.
//!
//! Serves `POST /analyze` and `GET /health` over HTTP. Classification
//! models are set up once at startup and shared by every request.

use std::net::SocketAddr;

use clap::Parser;
use tracing::{info, warn};

use huginn::server::config::{Config, Secrets};
use huginn::server::{AppState, build_analyzer};

/// Huginn daemon — comment sentiment and topic analysis service.
#[derive(Parser)]
#[command(name = "huginnd")]
#[command(version = huginn::PKG_VERSION)]
#[command(about = "Huginn feedback analysis daemon")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Address to bind to, overriding the config file.
    #[arg(short, long, env = "HUGINN_ADDRESS")]
    address: Option<String>,

    /// Enable debug logging.
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load configuration
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(address) = args.address {
        config.server.address = address;
    }
    config.server.debug |= args.debug;

    // Initialise tracing (default: info, debug in debug mode; override with RUST_LOG).
    let default_level = if config.server.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    if config.server.uses_default_secret_key() {
        warn!("no secret key configured; set HUGINN_SECRET_KEY before running in production");
    }

    let secrets = Secrets::load()?;
    let analyzer = build_analyzer(&config, &secrets)?;

    // Parse address
    let addr: SocketAddr =
        config.server.address.parse().map_err(|e| {
            huginn::HuginnError::Configuration(format!("Invalid address: {e}"))
        })?;

    info!(
        version = huginn::version_string(),
        %addr,
        debug = config.server.debug,
        threshold = config.analysis.threshold,
        "huginnd starting"
    );

    huginn::server::run(addr, AppState::new(analyzer)).await?;

    Ok(())
}
