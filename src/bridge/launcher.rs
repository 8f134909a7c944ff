//! Process launching — resolves the analysis command and starts the child.
//!
//! The spawn primitive is a constructor-injected trait so tests (and
//! alternate environments) can substitute a fake process without touching
//! production code paths. `TokioSpawner` is the production implementation.

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::process::{Child, Command};

use crate::bridge::Invocation;
use crate::error::GatewayError;

/// Piped stdio of a spawned analysis process.
pub struct ChildStreams {
    pub stdin: Box<dyn AsyncWrite + Send + Unpin>,
    pub stdout: Box<dyn AsyncRead + Send + Unpin>,
    pub stderr: Box<dyn AsyncRead + Send + Unpin>,
}

/// Termination control for a spawned process.
#[async_trait]
pub trait ProcessHandle: Send {
    /// Wait for the process to exit and return its exit code (-1 when the
    /// process was terminated by a signal).
    async fn wait(&mut self) -> std::io::Result<i32>;

    /// Forcibly terminate the process.
    async fn kill(&mut self) -> std::io::Result<()>;
}

/// Pluggable process-starting primitive.
pub trait ProcessSpawner: Send + Sync {
    fn spawn(&self, invocation: &Invocation)
    -> crate::Result<(ChildStreams, Box<dyn ProcessHandle>)>;
}

/// Production spawner backed by `tokio::process::Command`.
pub struct TokioSpawner;

impl ProcessSpawner for TokioSpawner {
    fn spawn(
        &self,
        invocation: &Invocation,
    ) -> crate::Result<(ChildStreams, Box<dyn ProcessHandle>)> {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args);
        cmd.stdin(std::process::Stdio::piped());
        cmd.stdout(std::process::Stdio::piped());
        cmd.stderr(std::process::Stdio::piped());
        // If the request handler is dropped mid-flight (client disconnect),
        // the child must not outlive it.
        cmd.kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| {
            GatewayError::Launch(format!("failed to spawn '{}': {}", invocation.program, e))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| GatewayError::Launch("failed to open stdin pipe".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| GatewayError::Launch("failed to open stdout pipe".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| GatewayError::Launch("failed to open stderr pipe".to_string()))?;

        let streams = ChildStreams {
            stdin: Box::new(stdin),
            stdout: Box::new(stdout),
            stderr: Box::new(stderr),
        };
        Ok((streams, Box::new(TokioProcessHandle { child })))
    }
}

struct TokioProcessHandle {
    child: Child,
}

#[async_trait]
impl ProcessHandle for TokioProcessHandle {
    async fn wait(&mut self) -> std::io::Result<i32> {
        let status = self.child.wait().await?;
        Ok(status.code().unwrap_or(-1))
    }

    async fn kill(&mut self) -> std::io::Result<()> {
        self.child.kill().await
    }
}
