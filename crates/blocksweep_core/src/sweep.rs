//! Sequential sweep driver
//!
//! Writes the CSV header, then runs the worker once per combination with its
//! output appended to the results file. The first failure stops the sweep:
//! nothing is appended after the failing worker's own output.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::cache::QuestionCache;
use crate::config::SweepConfig;
use crate::error::{Result, SweepError};
use crate::grid::{Combination, ParameterGrid};
use crate::invocation::{Invocation, InvocationBuilder};
use crate::sink::ResultsSink;
use crate::worker::Worker;

/// Where a combination's question pickle came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheUse {
    /// Loaded from an existing cache entry
    Hit,
    /// Built by the worker and moved into the cache afterwards
    Stored,
}

#[derive(Debug, Clone)]
pub struct CombinationOutcome {
    pub combination: Combination,
    pub cache: CacheUse,
    pub cache_path: PathBuf,
    pub bytes_written: u64,
    pub elapsed: Duration,
}

/// Progress notifications delivered to the observer
#[derive(Debug)]
pub enum SweepEvent<'a> {
    Started {
        total: usize,
    },
    HeaderWritten {
        invocation: &'a Invocation,
    },
    /// Emitted just before the worker is started
    Invoking {
        combination: &'a Combination,
        invocation: &'a Invocation,
    },
    CacheStored {
        limit: i64,
        from: &'a Path,
        to: &'a Path,
    },
    Finished {
        /// Zero-based position in the sweep
        index: usize,
        total: usize,
        outcome: &'a CombinationOutcome,
    },
}

pub type EventCallback = Box<dyn FnMut(&SweepEvent<'_>)>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub total: usize,
    pub completed: usize,
    pub cache_hits: usize,
    pub cache_stores: usize,
    pub bytes_written: u64,
    pub elapsed: Duration,
}

impl SweepReport {
    fn record(&mut self, outcome: &CombinationOutcome) {
        self.completed += 1;
        self.bytes_written += outcome.bytes_written;
        match outcome.cache {
            CacheUse::Hit => self.cache_hits += 1,
            CacheUse::Stored => self.cache_stores += 1,
        }
    }
}

pub struct Sweep<W: Worker> {
    grid: ParameterGrid,
    cache: QuestionCache,
    invocations: InvocationBuilder,
    sink: ResultsSink,
    worker: W,
    cancel_flag: Arc<AtomicBool>,
    on_event: Option<EventCallback>,
}

impl<W: Worker> Sweep<W> {
    pub fn new(
        grid: ParameterGrid,
        cache: QuestionCache,
        invocations: InvocationBuilder,
        sink: ResultsSink,
        worker: W,
    ) -> Result<Self> {
        grid.validate()?;
        Ok(Self {
            grid,
            cache,
            invocations,
            sink,
            worker,
            cancel_flag: Arc::new(AtomicBool::new(false)),
            on_event: None,
        })
    }

    pub fn from_config(config: &SweepConfig, worker: W) -> Result<Self> {
        Self::new(
            config.grid.clone(),
            config.cache()?,
            config.invocation_builder()?,
            config.sink(),
            worker,
        )
    }

    #[must_use]
    pub fn with_observer(mut self, observer: impl FnMut(&SweepEvent<'_>) + 'static) -> Self {
        self.on_event = Some(Box::new(observer));
        self
    }

    /// Setting the returned flag stops the sweep before its next invocation
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancel_flag.clone()
    }

    pub fn worker(&self) -> &W {
        &self.worker
    }

    fn emit(&mut self, event: SweepEvent<'_>) {
        if let Some(callback) = self.on_event.as_mut() {
            callback(&event);
        }
    }

    fn check_cancelled(&self, completed: usize) -> Result<()> {
        if self.cancel_flag.load(Ordering::SeqCst) {
            return Err(SweepError::Cancelled { completed });
        }
        Ok(())
    }

    /// The invocations a sweep would issue, header first, without running
    /// anything.
    ///
    /// Cache state is read once; a limit missing from the cache is assumed
    /// to be stored by its first combination.
    pub fn plan(&self) -> Vec<(Option<Combination>, Invocation)> {
        let combinations = self.grid.combinations();
        let mut plan = Vec::with_capacity(combinations.len() + 1);
        plan.push((None, self.invocations.header()));

        let mut stored_during_sweep = HashSet::new();
        for combination in combinations {
            let lookup = self.cache.lookup(combination.limit);
            let cached = lookup.hit || !stored_during_sweep.insert(combination.limit);
            let invocation = self
                .invocations
                .for_combination(&combination, cached.then_some(lookup.path.as_path()));
            plan.push((Some(combination), invocation));
        }
        plan
    }

    /// Run the worker in header mode, replacing the results file
    pub fn write_header(&mut self) -> Result<()> {
        let invocation = self.invocations.header();
        let stdout = self.sink.header_writer()?;

        let status = self.worker.run(&invocation, stdout)?;
        if !status.is_success() {
            return Err(SweepError::WorkerFailed {
                command: invocation.to_string(),
                combination: None,
                status,
            });
        }
        if self.sink.is_empty()? {
            return Err(SweepError::EmptyOutput {
                command: invocation.to_string(),
                combination: None,
            });
        }

        self.emit(SweepEvent::HeaderWritten {
            invocation: &invocation,
        });
        Ok(())
    }

    /// Run the worker for one combination, appending to the results file and
    /// filling the cache entry for its limit if it was missing.
    pub fn run_combination(&mut self, combination: &Combination) -> Result<CombinationOutcome> {
        let started = Instant::now();
        let lookup = self.cache.lookup(combination.limit);
        let invocation = self
            .invocations
            .for_combination(combination, lookup.hit.then_some(lookup.path.as_path()));

        if !lookup.hit {
            self.cache.discard_default_artifact()?;
        }

        self.emit(SweepEvent::Invoking {
            combination,
            invocation: &invocation,
        });

        let before = self.sink.len()?;
        let stdout = self.sink.append_writer()?;
        let status = self.worker.run(&invocation, stdout)?;
        if !status.is_success() {
            return Err(SweepError::WorkerFailed {
                command: invocation.to_string(),
                combination: Some(combination.clone()),
                status,
            });
        }

        let bytes_written = self.sink.len()?.saturating_sub(before);
        if bytes_written == 0 {
            return Err(SweepError::EmptyOutput {
                command: invocation.to_string(),
                combination: Some(combination.clone()),
            });
        }

        let cache = if lookup.hit {
            CacheUse::Hit
        } else {
            let to = self.cache.store(combination.limit)?;
            let from = self.cache.default_artifact().to_path_buf();
            self.emit(SweepEvent::CacheStored {
                limit: combination.limit,
                from: &from,
                to: &to,
            });
            CacheUse::Stored
        };

        Ok(CombinationOutcome {
            combination: combination.clone(),
            cache,
            cache_path: lookup.path,
            bytes_written,
            elapsed: started.elapsed(),
        })
    }

    /// Header, then every combination in grid order
    pub fn run(&mut self) -> Result<SweepReport> {
        let started = Instant::now();
        let combinations = self.grid.combinations();
        let total = combinations.len();
        let mut report = SweepReport {
            total,
            ..Default::default()
        };

        self.emit(SweepEvent::Started { total });
        self.check_cancelled(0)?;
        self.write_header()?;

        for (index, combination) in combinations.iter().enumerate() {
            self.check_cancelled(report.completed)?;
            let outcome = self.run_combination(combination)?;
            report.record(&outcome);
            self.emit(SweepEvent::Finished {
                index,
                total,
                outcome: &outcome,
            });
        }

        report.elapsed = started.elapsed();
        Ok(report)
    }
}
