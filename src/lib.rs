//! Pulsegate — authenticated HTTP bridge for the pulse analytics CLI.
//! Verifies an admin bearer credential, launches the analysis process per
//! request, feeds it a scenario over stdin, collects its output streams, and
//! sanitizes failures before they reach the caller.

pub mod auth;
pub mod bridge;
pub mod config;
pub mod error;
pub mod server;

pub use auth::{AdminClaims, AuthGuard};
pub use bridge::collector::collect;
pub use bridge::launcher::{ChildStreams, ProcessHandle, ProcessSpawner, TokioSpawner};
pub use bridge::output::parse_output;
pub use bridge::sanitize::{classify_exit, sanitize_stderr};
pub use bridge::{
    Invocation, ParsedOutput, ProcessResult, ReportFormat, RequestOptions, RunReport, RunRequest,
    run_scenario,
};
pub use config::{CliBridgeConfig, GatewayConfig, parse_env_ref};
pub use error::{GatewayError, Result};
pub use server::{AppState, router};
