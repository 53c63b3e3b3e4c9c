//! Logger metrics for observability
//!
//! Counts records that reached their sink and records lost to a formatter
//! or sink failure. Records below the threshold are not counted.

use std::sync::atomic::{AtomicU64, Ordering};

/// Write counters shared by all threads logging through one logger
///
/// # Example
///
/// ```no_run
/// use tiered_logger::{LogLevel, Logger};
///
/// let logger = Logger::new(LogLevel::Info, "/var/log/app.log").unwrap();
/// logger.info("ready").unwrap();
///
/// let metrics = logger.metrics();
/// println!("Total logged: {}", metrics.total_logged());
/// println!("Drop rate: {:.2}%", metrics.drop_rate());
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Records lost because formatting or writing failed
    pub dropped_count: AtomicU64,
    /// Records written to their tier sink
    pub total_logged: AtomicU64,
}

impl LoggerMetrics {
    pub fn new() -> Self {
        Self {
            dropped_count: AtomicU64::new(0),
            total_logged: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn total_logged(&self) -> u64 {
        self.total_logged.load(Ordering::Relaxed)
    }

    /// Record a dropped log, returning the previous count
    #[inline]
    pub fn record_dropped(&self) -> u64 {
        self.dropped_count.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a successfully logged entry, returning the previous count
    #[inline]
    pub fn record_logged(&self) -> u64 {
        self.total_logged.fetch_add(1, Ordering::Relaxed)
    }

    /// Get drop rate as a percentage (0.0 - 100.0)
    ///
    /// Returns 0.0 if no logs have been processed.
    pub fn drop_rate(&self) -> f64 {
        let dropped = self.dropped_count() as f64;
        let total = self.total_logged() as f64 + dropped;
        if total == 0.0 {
            0.0
        } else {
            (dropped / total) * 100.0
        }
    }

    pub fn reset(&self) {
        self.dropped_count.store(0, Ordering::Relaxed);
        self.total_logged.store(0, Ordering::Relaxed);
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Snapshot of the current values
    fn clone(&self) -> Self {
        Self {
            dropped_count: AtomicU64::new(self.dropped_count()),
            total_logged: AtomicU64::new(self.total_logged()),
        }
    }
}
