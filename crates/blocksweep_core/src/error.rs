use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::grid::Combination;
use crate::worker::WorkerStatus;

/// Errors that abort a sweep
#[derive(Debug)]
pub enum SweepError {
    /// Configuration error
    Config(String),
    /// The worker process could not be started
    Spawn { command: String, source: io::Error },
    /// The worker reported a non-success status
    WorkerFailed {
        command: String,
        /// `None` for the header invocation
        combination: Option<Combination>,
        status: WorkerStatus,
    },
    /// The worker exited successfully but wrote nothing to the results file
    EmptyOutput {
        command: String,
        combination: Option<Combination>,
    },
    /// The worker's default artifact could not be moved into the cache
    CacheStore {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
    /// A leftover default artifact could not be removed before a cache miss
    StaleArtifact { path: PathBuf, source: io::Error },
    /// The results file could not be opened or inspected
    Sink { path: PathBuf, source: io::Error },
    /// The sweep was cancelled before the next invocation
    Cancelled { completed: usize },
}

impl fmt::Display for SweepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweepError::Config(msg) => write!(f, "configuration error: {msg}"),
            SweepError::Spawn { command, source } => {
                write!(f, "failed to start worker `{command}`: {source}")
            }
            SweepError::WorkerFailed {
                command,
                combination,
                status,
            } => match combination {
                Some(c) => write!(f, "worker {status} for {c}: `{command}`"),
                None => write!(f, "worker {status} while writing the CSV header: `{command}`"),
            },
            SweepError::EmptyOutput {
                command,
                combination,
            } => match combination {
                Some(c) => write!(f, "worker produced no output for {c}: `{command}`"),
                None => write!(f, "worker produced no CSV header: `{command}`"),
            },
            SweepError::CacheStore { from, to, source } => write!(
                f,
                "failed to move {} to {}: {source}",
                from.display(),
                to.display()
            ),
            SweepError::StaleArtifact { path, source } => write!(
                f,
                "failed to remove leftover question pickle {}: {source}",
                path.display()
            ),
            SweepError::Sink { path, source } => {
                write!(f, "results file {}: {source}", path.display())
            }
            SweepError::Cancelled { completed } => {
                write!(f, "sweep cancelled after {completed} combination(s)")
            }
        }
    }
}

impl std::error::Error for SweepError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SweepError::Spawn { source, .. }
            | SweepError::CacheStore { source, .. }
            | SweepError::StaleArtifact { source, .. }
            | SweepError::Sink { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl SweepError {
    /// The combination being processed when the error occurred, if any
    pub fn combination(&self) -> Option<&Combination> {
        match self {
            SweepError::WorkerFailed { combination, .. }
            | SweepError::EmptyOutput { combination, .. } => combination.as_ref(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SweepError>;
