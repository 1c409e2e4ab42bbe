//! Sweep configuration
//!
//! Every field has a default, so an empty file (or no file) reproduces the
//! canopies experiment: `python main.py` swept over five question limits and
//! three tight-threshold functions, results in `Results/canopies.csv`.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::QuestionCache;
use crate::error::Result;
use crate::grid::ParameterGrid;
use crate::invocation::InvocationBuilder;
use crate::sink::ResultsSink;

/// How to call the worker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Program followed by leading arguments
    pub command: Vec<String>,
    pub debug_level: i32,
    pub blocking_method: String,
    /// Appended verbatim to every combination's arguments
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_args: Vec<String>,
    /// Kill a worker that runs longer than this. No limit when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            command: vec!["python".to_string(), "main.py".to_string()],
            debug_level: 0,
            blocking_method: "canopies".to_string(),
            extra_args: Vec::new(),
            timeout_secs: None,
        }
    }
}

impl WorkerConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Filesystem layout, relative to the working directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding cached question pickles
    pub data_dir: PathBuf,
    /// Cache file name; `{limit}` is replaced by the limit
    pub cache_file_template: String,
    /// Where the worker writes its pickle when not given a cached one
    pub default_artifact: PathBuf,
    pub results_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("Data"),
            cache_file_template: "q{limit}.pickle".to_string(),
            default_artifact: PathBuf::from("Data").join("questions.pickle"),
            results_file: PathBuf::from("Results").join("canopies.csv"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub worker: WorkerConfig,
    pub paths: PathsConfig,
    pub grid: ParameterGrid,
}

impl SweepConfig {
    pub fn cache(&self) -> Result<QuestionCache> {
        QuestionCache::new(
            &self.paths.data_dir,
            &self.paths.cache_file_template,
            &self.paths.default_artifact,
        )
    }

    pub fn invocation_builder(&self) -> Result<InvocationBuilder> {
        Ok(InvocationBuilder::new(
            &self.worker.command,
            self.worker.debug_level,
            &self.worker.blocking_method,
        )?
        .with_extra_args(&self.worker.extra_args))
    }

    pub fn sink(&self) -> ResultsSink {
        ResultsSink::new(&self.paths.results_file)
    }

    /// Check everything that can be checked without running the worker
    pub fn validate(&self) -> Result<()> {
        self.grid.validate()?;
        self.cache()?;
        self.invocation_builder()?;
        Ok(())
    }
}
