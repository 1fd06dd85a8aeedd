//! Bounded external process execution
//!
//! Every invocation has a deadline and an optional cancel flag. The child is
//! owned by a guard that kills and reaps it on every early return, and pipes are
//! drained on helper threads so a chatty child cannot block on a full pipe.
//! Output past the capture limit is read and discarded.

use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::core::CancelToken;

const POLL_INTERVAL: Duration = Duration::from_millis(10);
const MAX_OUTPUT_BYTES: u64 = 256 * 1024;
/// How long readers get to finish after a kill. Grandchildren that inherited the
/// pipes can keep them open; such readers are left detached.
const READER_GRACE: Duration = Duration::from_millis(250);

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("program not found")]
    NotFound,
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("cancelled")]
    Cancelled,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

struct ChildGuard {
    child: Child,
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if let Ok(None) = self.child.try_wait() {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.by_ref().take(MAX_OUTPUT_BYTES).read_to_end(&mut buffer);
            let _ = io::copy(&mut pipe, &mut io::sink());
        }
        buffer
    })
}

fn settle_readers(readers: [JoinHandle<Vec<u8>>; 2]) {
    let deadline = Instant::now() + READER_GRACE;
    while readers.iter().any(|r| !r.is_finished()) && Instant::now() < deadline {
        thread::sleep(POLL_INTERVAL);
    }
    for reader in readers {
        if reader.is_finished() {
            let _ = reader.join();
        }
    }
}

/// Runs `command` to completion, or kills it when `timeout` elapses or `cancel` fires.
pub fn run_bounded(
    mut command: Command,
    timeout: Duration,
    cancel: Option<&CancelToken>,
) -> Result<CommandOutput, ProcessError> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command.spawn().map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ProcessError::NotFound,
        _ => ProcessError::Io(e),
    })?;

    let stdout_reader = spawn_reader(child.stdout.take());
    let stderr_reader = spawn_reader(child.stderr.take());
    let mut guard = ChildGuard { child };

    let deadline = Instant::now() + timeout;
    let outcome = loop {
        match guard.child.try_wait() {
            Ok(Some(status)) => break Ok(status),
            Ok(None) => {}
            Err(e) => break Err(ProcessError::Io(e)),
        }
        if cancel.is_some_and(|c| c.is_cancelled()) {
            break Err(ProcessError::Cancelled);
        }
        if Instant::now() >= deadline {
            break Err(ProcessError::Timeout(timeout));
        }
        thread::sleep(POLL_INTERVAL);
    };

    // Kill and reap before touching the readers
    drop(guard);
    let status = match outcome {
        Ok(status) => status,
        Err(err) => {
            settle_readers([stdout_reader, stderr_reader]);
            return Err(err);
        }
    };

    let stdout = stdout_reader.join().unwrap_or_default();
    let stderr = stderr_reader.join().unwrap_or_default();

    Ok(CommandOutput {
        status,
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
    })
}
