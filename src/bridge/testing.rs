//! Test doubles for the process seam.
//!
//! `FakeSpawner` scripts exit code / stdout / stderr per spawn and captures
//! everything written to stdin, so route and bridge tests run without a real
//! subprocess.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::io::Cursor;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tokio::io::AsyncWrite;

use crate::bridge::Invocation;
use crate::bridge::launcher::{ChildStreams, ProcessHandle, ProcessSpawner};
use crate::error::GatewayError;

pub(crate) struct FakeHandle {
    exit_code: i32,
    hang: bool,
    killed: Option<Arc<AtomicBool>>,
}

impl FakeHandle {
    pub(crate) fn exiting(exit_code: i32) -> Self {
        Self {
            exit_code,
            hang: false,
            killed: None,
        }
    }

    /// A handle whose wait never resolves, for timeout tests. Sets `killed`
    /// when the collector kills it.
    pub(crate) fn hanging(killed: Arc<AtomicBool>) -> Self {
        Self {
            exit_code: -1,
            hang: true,
            killed: Some(killed),
        }
    }
}

#[async_trait]
impl ProcessHandle for FakeHandle {
    async fn wait(&mut self) -> std::io::Result<i32> {
        if self.hang {
            std::future::pending::<()>().await;
        }
        Ok(self.exit_code)
    }

    async fn kill(&mut self) -> std::io::Result<()> {
        if let Some(flag) = &self.killed {
            flag.store(true, Ordering::SeqCst);
        }
        Ok(())
    }
}

/// AsyncWrite that appends into a shared buffer — the stdin capture.
struct SharedWriter {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl AsyncWrite for SharedWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        data: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        self.buf.lock().unwrap().extend_from_slice(data);
        Poll::Ready(Ok(data.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

/// Scripted outcome for one spawn.
pub(crate) struct FakeScript {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl FakeScript {
    pub(crate) fn success(stdout: &str) -> Self {
        Self {
            exit_code: 0,
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    pub(crate) fn failure(exit_code: i32, stderr: &str) -> Self {
        Self {
            exit_code,
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }
}

/// Fake spawner: pops one script per spawn, records the invocation, and
/// captures stdin bytes.
pub(crate) struct FakeSpawner {
    scripts: Mutex<VecDeque<FakeScript>>,
    calls: AtomicUsize,
    invocations: Mutex<Vec<Invocation>>,
    stdin_captures: Mutex<Vec<Arc<Mutex<Vec<u8>>>>>,
}

impl FakeSpawner {
    pub(crate) fn new(scripts: Vec<FakeScript>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into()),
            calls: AtomicUsize::new(0),
            invocations: Mutex::new(Vec::new()),
            stdin_captures: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn invocation(&self, idx: usize) -> Invocation {
        self.invocations.lock().unwrap()[idx].clone()
    }

    pub(crate) fn stdin_bytes(&self, idx: usize) -> Vec<u8> {
        self.stdin_captures.lock().unwrap()[idx].lock().unwrap().clone()
    }
}

impl ProcessSpawner for FakeSpawner {
    fn spawn(
        &self,
        invocation: &Invocation,
    ) -> crate::Result<(ChildStreams, Box<dyn ProcessHandle>)> {
        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .expect("FakeSpawner: no script left for spawn");
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.invocations.lock().unwrap().push(invocation.clone());

        let buf = Arc::new(Mutex::new(Vec::new()));
        self.stdin_captures.lock().unwrap().push(buf.clone());

        let streams = ChildStreams {
            stdin: Box::new(SharedWriter { buf }),
            stdout: Box::new(Cursor::new(script.stdout.into_bytes())),
            stderr: Box::new(Cursor::new(script.stderr.into_bytes())),
        };
        Ok((streams, Box::new(FakeHandle::exiting(script.exit_code))))
    }
}

/// Spawner whose every spawn fails, for launch-error tests.
pub(crate) struct FailingSpawner;

impl ProcessSpawner for FailingSpawner {
    fn spawn(
        &self,
        invocation: &Invocation,
    ) -> crate::Result<(ChildStreams, Box<dyn ProcessHandle>)> {
        Err(GatewayError::Launch(format!(
            "failed to spawn '{}': No such file or directory",
            invocation.program
        )))
    }
}
