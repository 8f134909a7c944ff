//! Pulsegate — server binary for the authenticated CLI bridge.
//!
//! One subcommand:
//! - `pulsegate serve`: HTTP server exposing the dynamic-cli bridge endpoint

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use pulsegate::{AppState, GatewayConfig, TokioSpawner, router};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Pulsegate — authenticated HTTP bridge for the pulse analytics CLI.
#[derive(Parser)]
#[command(
    name = "pulsegate",
    version,
    about = "Pulsegate — authenticated HTTP bridge for the pulse analytics CLI"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP bridge server
    Serve {
        /// Path to pulsegate.toml config file [default: ./pulsegate.toml or ~/.config/pulsegate/pulsegate.toml]
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Bind address, overrides the config file's `listen`
        #[arg(short, long)]
        listen: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with env filter (RUST_LOG controls verbosity)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cancel = CancellationToken::new();

    // Ctrl-C handler — cancels the root token for graceful shutdown
    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Shutting down Pulsegate...");
        cancel_for_signal.cancel();
    });

    match cli.command {
        Commands::Serve { config, listen } => {
            let config_path = resolve_config(config)?;
            run_serve(config_path, listen, cancel).await?;
        }
    }

    Ok(())
}

/// Start the HTTP bridge server.
///
/// Loads pulsegate.toml, validates it, resolves the auth secret and
/// interpreter path once, then serves the router via axum with graceful
/// shutdown on Ctrl-C.
async fn run_serve(
    config_path: PathBuf,
    listen_override: Option<String>,
    cancel: CancellationToken,
) -> Result<()> {
    let config = GatewayConfig::load(&config_path)
        .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid config: {}", e))?;

    let state = AppState::new(&config, Arc::new(TokioSpawner))
        .map_err(|e| anyhow::anyhow!("Failed to build gateway state: {}", e))?;

    tracing::info!(
        interpreter = %state.interpreter,
        module = %state.cli.module,
        timeout_secs = state.cli.timeout_secs,
        "analysis CLI resolved"
    );

    let app = router(state);

    let addr = listen_override.unwrap_or_else(|| config.listen.clone());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", addr, e))?;

    tracing::info!(addr = %addr, "Pulsegate HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await
        .map_err(|e| anyhow::anyhow!("Pulsegate HTTP server error: {}", e))?;

    tracing::info!("Pulsegate HTTP server stopped");
    Ok(())
}

/// Resolve config file path: explicit flag → ./pulsegate.toml → ~/.config/pulsegate/pulsegate.toml.
fn resolve_config(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }

    let local = Path::new("pulsegate.toml");
    if local.exists() {
        return Ok(local.to_path_buf());
    }

    if let Some(config_dir) = dirs::config_dir() {
        let xdg = config_dir.join("pulsegate").join("pulsegate.toml");
        if xdg.exists() {
            return Ok(xdg);
        }
    }

    Err(anyhow::anyhow!(
        "No pulsegate.toml found. Searched ./pulsegate.toml and ~/.config/pulsegate/pulsegate.toml. \
         Use --config to specify a path."
    ))
}
