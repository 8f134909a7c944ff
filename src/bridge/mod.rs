//! CLI bridge — translates an authenticated HTTP request into one analysis
//! subprocess invocation and back.
//!
//! The scenario payload is opaque to the gateway: it is serialized to the
//! child's stdin verbatim and never interpreted. Options travel as CLI flags.

pub mod collector;
pub mod launcher;
pub mod output;
pub mod sanitize;

#[cfg(test)]
pub(crate) mod testing;

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::io::AsyncWriteExt;

use crate::error::GatewayError;
use launcher::ProcessSpawner;

/// Requested rendering of the human report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl ReportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Text => "text",
            ReportFormat::Json => "json",
        }
    }
}

/// Options forwarded to the CLI as flags. All have serde defaults so sparse
/// request bodies stay valid.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestOptions {
    pub format: ReportFormat,
    pub indent: u32,
    /// Ordered — flag order on the command line matches request order.
    pub fine_tune_tags: Vec<String>,
    pub export_dataset: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            format: ReportFormat::Text,
            indent: 2,
            fine_tune_tags: Vec::new(),
            export_dataset: false,
        }
    }
}

/// POST /api/dynamic-cli request body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRequest {
    /// Opaque analytical input, passed through to the CLI untouched.
    pub scenario: serde_json::Value,
    #[serde(flatten)]
    pub options: RequestOptions,
}

/// 200 OK response body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub report: String,
    pub report_format: ReportFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset: Option<serde_json::Value>,
}

/// Resolved command line for one analysis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    /// Build the command line: `<interpreter> -m <module>` plus the flags
    /// derived from the request options. Structured args, never a shell.
    pub fn build(interpreter: &str, module: &str, options: &RequestOptions) -> Self {
        let mut args = vec![
            "-m".to_string(),
            module.to_string(),
            "--format".to_string(),
            options.format.as_str().to_string(),
            "--indent".to_string(),
            options.indent.to_string(),
        ];
        for tag in &options.fine_tune_tags {
            args.push("--fine-tune-tag".to_string());
            args.push(tag.clone());
        }
        if options.export_dataset {
            args.push("--dataset".to_string());
        }
        Self {
            program: interpreter.to_string(),
            args,
        }
    }
}

/// Outcome of one subprocess run. Produced exactly once per request.
#[derive(Debug, Clone)]
pub struct ProcessResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Split of a successful run's stdout.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedOutput {
    pub report_text: String,
    pub dataset: Option<serde_json::Value>,
}

/// Run one scenario through the analysis CLI.
///
/// Spawns the child via the injected spawner, writes the JSON-serialized
/// scenario to its stdin and closes the pipe, then collects both output
/// streams and the exit code. The stdin write completes (or fails) before
/// output collection begins; a write failure is not fatal on its own since
/// the child may already have exited and its exit code carries the verdict.
pub async fn run_scenario(
    spawner: &dyn ProcessSpawner,
    invocation: &Invocation,
    scenario: &serde_json::Value,
    timeout: Duration,
) -> crate::Result<ProcessResult> {
    let (streams, handle) = spawner.spawn(invocation)?;
    let launcher::ChildStreams {
        mut stdin,
        stdout,
        stderr,
    } = streams;

    let payload = serde_json::to_vec(scenario)
        .map_err(|e| GatewayError::Launch(format!("failed to encode scenario: {}", e)))?;

    if let Err(e) = stdin.write_all(&payload).await {
        tracing::debug!(error = %e, "stdin write failed — child may have exited early");
    }
    let _ = stdin.shutdown().await;
    drop(stdin);

    collector::collect(stdout, stderr, handle, timeout).await
}
