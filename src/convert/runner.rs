use std::io::Read;
use std::process::{Child, ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use super::normalize::normalize;
use super::task::ConversionTask;
use crate::error::{Result, ScatterError};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Runs one conversion task to a terminal state: spawn the converter, wait
/// for it (bounded by the timeout and the cancel flag), then normalize the
/// output on success.
#[derive(Debug, Clone)]
pub struct TaskRunner {
    timeout: Option<Duration>,
    cancel: Arc<AtomicBool>,
}

enum Waited {
    Exited(ExitStatus),
    TimedOut,
    Cancelled,
}

impl TaskRunner {
    pub fn new(timeout: Option<Duration>, cancel: Arc<AtomicBool>) -> Self {
        Self { timeout, cancel }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    pub fn run(&self, task: &ConversionTask) -> Result<()> {
        if self.is_cancelled() {
            return Err(ScatterError::Cancelled {
                input: task.input.clone(),
            });
        }

        tracing::info!("Applying {}: {}", task.command.program(), task.label());
        tracing::debug!("{}", task.command);

        let mut child = task
            .command
            .to_command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ScatterError::ConverterLaunchFailed {
                input: task.input.clone(),
                program: task.command.program().to_string(),
                source,
            })?;

        // Drain both pipes while waiting so a chatty converter cannot block.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        // A killed converter may leave descendants holding the pipes open, so
        // the readers are only joined after a normal exit.
        let status = match self.wait(&mut child, task)? {
            Waited::Exited(status) => status,
            Waited::TimedOut => {
                return Err(ScatterError::ConverterTimedOut {
                    input: task.input.clone(),
                    timeout: self.timeout.unwrap_or_default(),
                });
            }
            Waited::Cancelled => {
                return Err(ScatterError::Cancelled {
                    input: task.input.clone(),
                });
            }
        };

        let stdout = collect(stdout);
        let stderr = collect(stderr);
        if !stdout.trim().is_empty() {
            tracing::debug!("{} stdout: {}", task.label(), stdout.trim_end());
        }
        if !status.success() {
            return Err(ScatterError::ConverterInvocationFailed {
                input: task.input.clone(),
                exit_code: status.code(),
                stderr,
            });
        }
        if !stderr.trim().is_empty() {
            tracing::debug!("{} stderr: {}", task.label(), stderr.trim_end());
        }

        normalize(&task.output)?;
        Ok(())
    }

    fn wait(&self, child: &mut Child, task: &ConversionTask) -> Result<Waited> {
        let started = Instant::now();
        loop {
            let polled = child.try_wait().map_err(|e| ScatterError::ConverterInvocationFailed {
                input: task.input.clone(),
                exit_code: None,
                stderr: format!("failed to wait for converter: {e}"),
            })?;
            if let Some(status) = polled {
                return Ok(self.settle(status));
            }

            if self.is_cancelled() {
                terminate(child);
                return Ok(Waited::Cancelled);
            }
            if let Some(timeout) = self.timeout
                && started.elapsed() >= timeout
            {
                terminate(child);
                return Ok(Waited::TimedOut);
            }

            std::thread::sleep(POLL_INTERVAL);
        }
    }

    /// Ctrl+C reaches the converter's process group too, so a converter
    /// killed by the signal can exit before the handler sets the flag.
    fn settle(&self, status: ExitStatus) -> Waited {
        if status.code().is_none() {
            if !self.is_cancelled() {
                std::thread::sleep(POLL_INTERVAL);
            }
            if self.is_cancelled() {
                return Waited::Cancelled;
            }
        }
        Waited::Exited(status)
    }
}

fn terminate(child: &mut Child) {
    if let Err(e) = child.kill() {
        tracing::debug!("Failed to kill converter process {}: {}", child.id(), e);
    }
    let _ = child.wait();
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>> {
    pipe.map(|mut pipe| {
        std::thread::spawn(move || {
            let mut buffer = Vec::new();
            let _ = pipe.read_to_end(&mut buffer);
            buffer
        })
    })
}

fn collect(handle: Option<JoinHandle<Vec<u8>>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}
