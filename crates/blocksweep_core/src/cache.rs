//! One-level cache of parsed question pickles, keyed by limit
//!
//! Entries are trusted for as long as they exist. Nothing checks that a
//! cached pickle still matches the question database it was built from;
//! delete the file to force a rebuild.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Result, SweepError};

/// Placeholder substituted with the limit in cache file templates
pub const LIMIT_PLACEHOLDER: &str = "{limit}";

/// Result of checking the cache for one limit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheLookup {
    /// Where the entry for this limit lives (whether or not it exists)
    pub path: PathBuf,
    pub hit: bool,
}

/// Cache directory plus the naming scheme for its entries
#[derive(Debug, Clone)]
pub struct QuestionCache {
    dir: PathBuf,
    template: String,
    default_artifact: PathBuf,
}

impl QuestionCache {
    /// Create a cache rooted at `dir`.
    ///
    /// `template` names entry files and must contain `{limit}`.
    /// `default_artifact` is where the worker writes its pickle when it was
    /// not handed a cached one.
    pub fn new(
        dir: impl Into<PathBuf>,
        template: impl Into<String>,
        default_artifact: impl Into<PathBuf>,
    ) -> Result<Self> {
        let template = template.into();
        if !template.contains(LIMIT_PLACEHOLDER) {
            return Err(SweepError::Config(format!(
                "cache file template {template:?} must contain {LIMIT_PLACEHOLDER}"
            )));
        }
        if template.contains(['/', '\\']) {
            return Err(SweepError::Config(format!(
                "cache file template {template:?} must be a plain file name"
            )));
        }

        Ok(Self {
            dir: dir.into(),
            template,
            default_artifact: default_artifact.into(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn default_artifact(&self) -> &Path {
        &self.default_artifact
    }

    /// Path of the entry for `limit`. Depends on the limit alone.
    pub fn path_for(&self, limit: i64) -> PathBuf {
        self.dir
            .join(self.template.replace(LIMIT_PLACEHOLDER, &limit.to_string()))
    }

    pub fn lookup(&self, limit: i64) -> CacheLookup {
        let path = self.path_for(limit);
        let hit = path.is_file();
        CacheLookup { path, hit }
    }

    /// Remove a default artifact left behind by an earlier run, so that a
    /// following `store` can only pick up what the next worker writes.
    pub fn discard_default_artifact(&self) -> Result<()> {
        match fs::remove_file(&self.default_artifact) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SweepError::StaleArtifact {
                path: self.default_artifact.clone(),
                source,
            }),
        }
    }

    /// Move the worker's default artifact into the entry for `limit`,
    /// replacing whatever is there.
    pub fn store(&self, limit: i64) -> Result<PathBuf> {
        let to = self.path_for(limit);
        let from = self.default_artifact.clone();

        move_file(&from, &to).map_err(|source| SweepError::CacheStore {
            from: from.clone(),
            to: to.clone(),
            source,
        })?;

        Ok(to)
    }
}

/// Rename, falling back to copy + remove across filesystems.
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    if !from.is_file() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            "worker did not leave its default question pickle",
        ));
    }
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }

    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
        Err(e) => Err(e),
    }
}
