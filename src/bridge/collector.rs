//! Stream collection — drains both output pipes and waits for exit.
//!
//! Both pipes are read to EOF concurrently while the exit status is awaited,
//! so no bytes emitted before termination can be dropped and neither pipe
//! can back up and stall the child. The whole collection races a wall-clock
//! timeout that kills the process, not just the future.

use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::bridge::ProcessResult;
use crate::bridge::launcher::ProcessHandle;
use crate::error::GatewayError;

/// Collect both output streams and the exit code into one `ProcessResult`.
///
/// Each invocation owns its buffers; nothing is shared across requests.
pub async fn collect(
    mut stdout: Box<dyn AsyncRead + Send + Unpin>,
    mut stderr: Box<dyn AsyncRead + Send + Unpin>,
    mut handle: Box<dyn ProcessHandle>,
    timeout: Duration,
) -> crate::Result<ProcessResult> {
    tokio::select! {
        result = async {
            let mut stdout_bytes = Vec::new();
            let mut stderr_bytes = Vec::new();
            let (stdout_read, stderr_read) = tokio::join!(
                stdout.read_to_end(&mut stdout_bytes),
                stderr.read_to_end(&mut stderr_bytes),
            );
            // A broken pipe leaves whatever arrived before the break in the
            // buffer; proceed with the partial output but record the cut.
            if let Err(e) = stdout_read {
                tracing::warn!(error = %e, "stdout read ended before EOF");
            }
            if let Err(e) = stderr_read {
                tracing::warn!(error = %e, "stderr read ended before EOF");
            }
            let exit_code = handle
                .wait()
                .await
                .map_err(|e| GatewayError::Launch(format!("process wait error: {}", e)))?;
            Ok::<ProcessResult, GatewayError>(ProcessResult {
                exit_code,
                stdout: String::from_utf8_lossy(&stdout_bytes).into_owned(),
                stderr: String::from_utf8_lossy(&stderr_bytes).into_owned(),
            })
        } => result,
        _ = tokio::time::sleep(timeout) => {
            // Kill the child process, not just the collection future
            let _ = handle.kill().await;
            Err(GatewayError::Timeout(timeout.as_secs()))
        }
    }
}
