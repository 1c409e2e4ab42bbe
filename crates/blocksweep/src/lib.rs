//! Command-line front end for the blocksweep driver
//!
//! Configuration loading, logging and progress reporting around
//! [`blocksweep_core::Sweep`].

pub mod config;
pub mod logging;
pub mod progress;

pub use config::{ConfigOverrides, load_config, parse_config, to_yaml};
pub use logging::init_logging;
pub use progress::{log_event, summarize};
