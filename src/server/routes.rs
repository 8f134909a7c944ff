//! Route handlers — the request state machine lives here.
//!
//! `POST /api/dynamic-cli` walks: authenticate → parse body → launch →
//! collect → classify. Auth failures and malformed bodies short-circuit
//! before any subprocess work; subprocess failures are classified by exit
//! code alone and sanitized before they reach the caller.

use std::time::{Duration, Instant};

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, header};

use crate::bridge::output::parse_output;
use crate::bridge::sanitize::{classify_exit, sanitize_stderr};
use crate::bridge::{self, Invocation, RunReport, RunRequest};
use crate::error::GatewayError;
use crate::server::AppState;

/// POST /api/dynamic-cli — run one scenario through the analysis CLI.
pub async fn run_dynamic_cli(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> crate::Result<Json<RunReport>> {
    // Auth gates entry; nothing below runs for an unauthenticated caller.
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let claims = state.auth.verify(auth_header)?;

    // Body is parsed by hand so a malformed request yields the gateway's
    // own `{ "error": … }` shape rather than an extractor rejection.
    let request: RunRequest = serde_json::from_slice(&body)
        .map_err(|e| GatewayError::MalformedRequest(e.to_string()))?;

    let invocation = Invocation::build(&state.interpreter, &state.cli.module, &request.options);

    let start = Instant::now();
    let result = bridge::run_scenario(
        state.spawner.as_ref(),
        &invocation,
        &request.scenario,
        Duration::from_secs(state.cli.timeout_secs),
    )
    .await?;

    tracing::info!(
        admin = claims.sub.as_deref().unwrap_or("-"),
        exit_code = result.exit_code,
        duration_ms = start.elapsed().as_millis() as u64,
        "analysis CLI invocation"
    );

    if result.exit_code != 0 {
        // Operator diagnostic channel gets the raw stderr; the caller only
        // ever sees the sanitized line.
        tracing::warn!(
            exit_code = result.exit_code,
            stderr = %result.stderr,
            "analysis CLI failed"
        );
        let message = sanitize_stderr(&result.stderr, result.exit_code);
        return Err(classify_exit(
            result.exit_code,
            message,
            &state.cli.validation_exit_codes,
        ));
    }

    let parsed = parse_output(&result.stdout, request.options.export_dataset);
    Ok(Json(RunReport {
        report: parsed.report_text,
        report_format: request.options.format,
        dataset: parsed.dataset,
    }))
}

/// GET /healthz — liveness probe.
pub async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
