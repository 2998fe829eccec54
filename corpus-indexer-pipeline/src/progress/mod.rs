//! Progress module for the ingestion pipeline.
//!
//! Tracks run counters and logs throughput at a fixed document interval.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::info;

/// Default number of documents between progress reports.
pub const DEFAULT_REPORT_EVERY: u64 = 1000;

/// Counters for one ingestion run.
#[derive(Debug, Clone)]
pub struct RunStats {
    /// Documents accepted into a batch so far.
    pub total_indexed: u64,
    /// Batches applied to the index so far.
    pub batches_flushed: u64,
    /// Wall-clock start of the run.
    pub started_at: DateTime<Utc>,
    started: Instant,
}

impl RunStats {
    /// Start counting from now.
    pub fn start() -> Self {
        Self {
            total_indexed: 0,
            batches_flushed: 0,
            started_at: Utc::now(),
            started: Instant::now(),
        }
    }

    /// Time since the run started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Throughput snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressReport {
    pub count: u64,
    pub elapsed_seconds: f64,
    pub avg_millis_per_doc: f64,
}

impl ProgressReport {
    /// Compute a report for `count` documents processed in `elapsed`.
    ///
    /// The average is zero when nothing was processed.
    pub fn new(count: u64, elapsed: Duration) -> Self {
        let elapsed_millis = elapsed.as_secs_f64() * 1000.0;
        let avg_millis_per_doc = if count == 0 {
            0.0
        } else {
            elapsed_millis / count as f64
        };

        Self {
            count,
            elapsed_seconds: elapsed.as_secs_f64(),
            avg_millis_per_doc,
        }
    }

    fn log(&self) {
        info!(
            count = self.count,
            elapsed_seconds = self.elapsed_seconds,
            avg_millis_per_doc = self.avg_millis_per_doc,
            "Indexed {} documents, in {:.2}s (average {:.2}ms/doc)",
            self.count,
            self.elapsed_seconds,
            self.avg_millis_per_doc
        );
    }
}

/// Logs a [`ProgressReport`] every `every` documents.
///
/// Reporting only writes to the log; it never changes how the run proceeds.
#[derive(Debug, Clone, Copy)]
pub struct ProgressReporter {
    every: u64,
}

impl ProgressReporter {
    /// Report every `every` documents. Zero disables periodic reports.
    pub fn new(every: u64) -> Self {
        Self { every }
    }

    /// Observe the counters after a document was processed, logging a
    /// report when an interval boundary was reached.
    pub fn observe(&self, stats: &RunStats) -> Option<ProgressReport> {
        if self.every == 0 || stats.total_indexed == 0 || stats.total_indexed % self.every != 0 {
            return None;
        }

        let report = ProgressReport::new(stats.total_indexed, stats.elapsed());
        report.log();
        Some(report)
    }

    /// Log the final report for a finished run.
    pub fn finish(&self, stats: &RunStats) -> ProgressReport {
        let report = ProgressReport::new(stats.total_indexed, stats.elapsed());
        report.log();
        report
    }
}
