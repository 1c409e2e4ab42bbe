//! Loading the sweep configuration
//!
//! Configuration comes from an optional YAML file, then command-line
//! overrides are applied on top:
//!
//! ```yaml
//! worker:
//!   command: [python, main.py]
//!   debug_level: 0
//!   blocking_method: canopies
//! paths:
//!   data_dir: Data
//!   cache_file_template: "q{limit}.pickle"
//!   default_artifact: Data/questions.pickle
//!   results_file: Results/canopies.csv
//! grid:
//!   limits: [10, 40, 100, 250, 500]
//!   tight_thresholds: [INVERSE, INVERSESQRT, INVERSELOG]
//!   extra_axes:
//!     - flag: algorithm
//!       values: [MEANCLUSTER, MAXCLUSTER]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use blocksweep_core::SweepConfig;
use color_eyre::eyre::WrapErr;

/// Parse a YAML document. An empty document yields the defaults.
pub fn parse_config(yaml: &str) -> Result<SweepConfig, serde_saphyr::Error> {
    if yaml.trim().is_empty() {
        return Ok(SweepConfig::default());
    }
    serde_saphyr::from_str(yaml)
}

pub fn to_yaml(config: &SweepConfig) -> Result<String, serde_saphyr::ser::Error> {
    serde_saphyr::to_string(config)
}

/// Load the configuration file, or the defaults when no path is given
pub fn load_config(path: Option<&Path>) -> color_eyre::Result<SweepConfig> {
    let Some(path) = path else {
        tracing::debug!("No config file given, using defaults");
        return Ok(SweepConfig::default());
    };

    let content = fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read config {}", path.display()))?;
    let config = parse_config(&content)
        .wrap_err_with(|| format!("Failed to parse config {}", path.display()))?;

    tracing::info!(path = %path.display(), "Loaded sweep configuration");
    Ok(config)
}

/// Command-line values that replace their configuration file counterparts
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub limits: Option<Vec<i64>>,
    pub tight_thresholds: Option<Vec<String>>,
    pub results_file: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
}

impl ConfigOverrides {
    pub fn apply(self, config: &mut SweepConfig) {
        if let Some(limits) = self.limits {
            config.grid.limits = limits;
        }
        if let Some(thresholds) = self.tight_thresholds {
            config.grid.tight_thresholds = thresholds;
        }
        if let Some(results_file) = self.results_file {
            config.paths.results_file = results_file;
        }
        if let Some(timeout) = self.timeout_secs {
            config.worker.timeout_secs = Some(timeout);
        }
    }
}
