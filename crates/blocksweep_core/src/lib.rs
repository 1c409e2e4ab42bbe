//! Parameter sweep driver for an external blocking/clustering worker
//!
//! This crate runs an external program once per point of a parameter grid
//! and collects its CSV output into a single results file. It supports:
//! - Cartesian parameter grids with a fixed, documented enumeration order
//! - A per-limit cache of the worker's expensive question pickle
//! - Structured (shell-free) worker invocations
//! - Abort on the first worker failure, with the failing command reported
//!
//! # Example
//!
//! ```ignore
//! use blocksweep_core::{ProcessWorker, Sweep, SweepConfig};
//!
//! let config = SweepConfig::default();
//! let mut sweep = Sweep::from_config(&config, ProcessWorker::new())?;
//! let report = sweep.run()?;
//! println!("{} of {} combinations written", report.completed, report.total);
//! ```

#![warn(clippy::all)]

pub mod cache;
pub mod config;
pub mod error;
pub mod grid;
pub mod invocation;
pub mod sink;
pub mod sweep;
pub mod worker;

#[cfg(test)]
mod tests;

pub use cache::{CacheLookup, QuestionCache};
pub use config::{PathsConfig, SweepConfig, WorkerConfig};
pub use error::SweepError;
pub use grid::{Combination, FlagAxis, FlagValue, ParameterGrid, cartesian_product};
pub use invocation::{Invocation, InvocationBuilder};
pub use sink::ResultsSink;
pub use sweep::{CacheUse, CombinationOutcome, Sweep, SweepEvent, SweepReport};
pub use worker::{ProcessWorker, Worker, WorkerStatus};
