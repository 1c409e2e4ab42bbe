//! The aggregated results file
//!
//! One header section written first, then one appended section per
//! combination. Workers run one at a time, so no locking is needed.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::error::{Result, SweepError};

#[derive(Debug, Clone)]
pub struct ResultsSink {
    path: PathBuf,
}

impl ResultsSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn error(&self, source: std::io::Error) -> SweepError {
        SweepError::Sink {
            path: self.path.clone(),
            source,
        }
    }

    fn ensure_parent(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.error(e))?;
        }
        Ok(())
    }

    /// Open the file truncated, creating its directory if needed
    pub fn header_writer(&self) -> Result<File> {
        self.ensure_parent()?;
        File::create(&self.path).map_err(|e| self.error(e))
    }

    /// Open the file for appending, creating its directory if needed
    pub fn append_writer(&self) -> Result<File> {
        self.ensure_parent()?;
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.error(e))
    }

    /// Current size in bytes; 0 if the file does not exist yet
    pub fn len(&self) -> Result<u64> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(self.error(e)),
        }
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}
