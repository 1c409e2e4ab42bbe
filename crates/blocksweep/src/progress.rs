//! Sweep progress reporting through `tracing`

use blocksweep_core::{CacheUse, SweepEvent, SweepReport};

/// Observer passed to [`blocksweep_core::Sweep::with_observer`]
pub fn log_event(event: &SweepEvent<'_>) {
    match event {
        SweepEvent::Started { total } => {
            tracing::info!(total, "Starting sweep");
        }
        SweepEvent::HeaderWritten { invocation } => {
            tracing::debug!(command = %invocation, "CSV header written");
        }
        SweepEvent::Invoking {
            combination,
            invocation,
        } => {
            tracing::info!(%combination, "{invocation}");
        }
        SweepEvent::CacheStored { limit, from, to } => {
            tracing::info!(
                limit,
                "Moving {} to {}",
                from.display(),
                to.display()
            );
        }
        SweepEvent::Finished {
            index,
            total,
            outcome,
        } => {
            let cache = match outcome.cache {
                CacheUse::Hit => "hit",
                CacheUse::Stored => "stored",
            };
            tracing::info!(
                progress = %format!("{}/{}", index + 1, total),
                cache,
                bytes = outcome.bytes_written,
                elapsed_ms = outcome.elapsed.as_millis() as u64,
                "Finished {}",
                outcome.combination
            );
        }
    }
}

/// One-line summary of a completed sweep
pub fn summarize(report: &SweepReport) -> String {
    format!(
        "{}/{} combinations in {:.1}s ({} cached, {} newly cached, {} bytes)",
        report.completed,
        report.total,
        report.elapsed.as_secs_f64(),
        report.cache_hits,
        report.cache_stores,
        report.bytes_written
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_summary() {
        let report = SweepReport {
            total: 15,
            completed: 15,
            cache_hits: 10,
            cache_stores: 5,
            bytes_written: 2048,
            elapsed: Duration::from_millis(12_340),
        };
        assert_eq!(
            summarize(&report),
            "15/15 combinations in 12.3s (10 cached, 5 newly cached, 2048 bytes)"
        );
    }
}
