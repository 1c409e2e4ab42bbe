//! Worker execution seam
//!
//! The driver only needs one thing from a worker: run an invocation with its
//! standard output going to a given file, and say how it went. The status
//! is whatever the invoked process itself reported.

use std::fmt;
use std::fs::File;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{Result, SweepError};
use crate::invocation::Invocation;

/// How long to sleep between polls while a timeout is armed
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Outcome of one worker run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerStatus {
    Success,
    /// Non-zero exit. `code` is `None` when the process was killed by a signal.
    Failed { code: Option<i32> },
    /// Killed after exceeding the configured timeout
    TimedOut { after: Duration },
}

impl WorkerStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, WorkerStatus::Success)
    }
}

impl From<ExitStatus> for WorkerStatus {
    fn from(status: ExitStatus) -> Self {
        if status.success() {
            WorkerStatus::Success
        } else {
            WorkerStatus::Failed {
                code: status.code(),
            }
        }
    }
}

impl fmt::Display for WorkerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerStatus::Success => write!(f, "succeeded"),
            WorkerStatus::Failed { code: Some(code) } => write!(f, "exited with code {code}"),
            WorkerStatus::Failed { code: None } => write!(f, "was terminated by a signal"),
            WorkerStatus::TimedOut { after } => {
                write!(f, "timed out after {:.1}s", after.as_secs_f64())
            }
        }
    }
}

/// Something that can execute worker invocations.
pub trait Worker {
    /// Run `invocation` to completion with its stdout written to `stdout`.
    ///
    /// `Err` means the invocation could not be carried out at all; a worker
    /// that ran and failed is reported through the returned status.
    fn run(&mut self, invocation: &Invocation, stdout: File) -> Result<WorkerStatus>;
}

/// Runs invocations as child processes, without a shell.
#[derive(Debug, Clone, Default)]
pub struct ProcessWorker {
    timeout: Option<Duration>,
}

impl ProcessWorker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill the worker if it runs longer than `timeout`
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn wait_with_deadline(child: &mut Child, timeout: Duration) -> std::io::Result<WorkerStatus> {
        let started = Instant::now();
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status.into());
            }
            if started.elapsed() >= timeout {
                // The child may exit between try_wait and kill
                let _ = child.kill();
                child.wait()?;
                return Ok(WorkerStatus::TimedOut {
                    after: started.elapsed(),
                });
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl Worker for ProcessWorker {
    fn run(&mut self, invocation: &Invocation, stdout: File) -> Result<WorkerStatus> {
        let spawn_error = |source| SweepError::Spawn {
            command: invocation.to_string(),
            source,
        };

        let mut child = Command::new(invocation.program())
            .args(invocation.args())
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(spawn_error)?;

        let status = match self.timeout {
            Some(timeout) => Self::wait_with_deadline(&mut child, timeout),
            None => child.wait().map(WorkerStatus::from),
        };
        status.map_err(spawn_error)
    }
}
