//! HTTP surface for the Pulsegate bridge.

pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};

use crate::auth::AuthGuard;
use crate::bridge::launcher::ProcessSpawner;
use crate::config::{CliBridgeConfig, GatewayConfig};

/// Shared, read-only request-handler state. Built once at startup; every
/// request-scoped entity (subprocess, buffers, parse results) lives in the
/// handler itself.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthGuard,
    pub spawner: Arc<dyn ProcessSpawner>,
    /// Interpreter path, resolved once at startup (env overrides win).
    pub interpreter: String,
    pub cli: CliBridgeConfig,
}

impl AppState {
    /// Resolve secrets and paths from config and build the state.
    pub fn new(config: &GatewayConfig, spawner: Arc<dyn ProcessSpawner>) -> crate::Result<Self> {
        let secret = config.auth.resolve_secret()?;
        Ok(Self {
            auth: AuthGuard::new(secret.into_bytes()),
            spawner,
            interpreter: config.cli.resolve_interpreter(),
            cli: config.cli.clone(),
        })
    }
}

/// Build the gateway router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/dynamic-cli", post(routes::run_dynamic_cli))
        .route("/healthz", get(routes::healthz))
        .with_state(state)
}
