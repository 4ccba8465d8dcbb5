//! Site metrics and observability.
//!
//! Process-wide counters for backend traffic, programme exports and admin
//! writes, reported by the `/health` endpoint and the admin dashboard.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

/// Global site metrics singleton.
pub struct SiteMetrics {
    /// Collection fetches issued to the backend
    fetches: AtomicUsize,

    /// Collection fetches that ended in an error state
    fetch_failures: AtomicUsize,

    /// Programme documents produced
    exports: AtomicUsize,

    /// Exports aborted before any document was produced
    export_failures: AtomicUsize,

    /// Days left out of a produced document
    export_days_skipped: AtomicUsize,

    /// Writes accepted by the backend
    writes: AtomicUsize,

    /// Writes rejected by the backend or failed in transport
    write_failures: AtomicUsize,

    /// Form submissions stopped by client-side validation
    forms_rejected: AtomicUsize,
}

/// Global metrics instance (initialized lazily)
static METRICS: OnceLock<SiteMetrics> = OnceLock::new();

impl SiteMetrics {
    /// Get the global metrics instance.
    pub fn global() -> &'static SiteMetrics {
        METRICS.get_or_init(|| SiteMetrics {
            fetches: AtomicUsize::new(0),
            fetch_failures: AtomicUsize::new(0),
            exports: AtomicUsize::new(0),
            export_failures: AtomicUsize::new(0),
            export_days_skipped: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
            write_failures: AtomicUsize::new(0),
            forms_rejected: AtomicUsize::new(0),
        })
    }

    pub fn record_fetch(&self) {
        self.fetches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch_failure(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_export(&self) {
        self.exports.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_export_failure(&self) {
        self.export_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_export_day_skipped(&self) {
        self.export_days_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_write_failure(&self) {
        self.write_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_form_rejected(&self) {
        self.forms_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot of every counter.
    pub fn report(&self) -> MetricsReport {
        let fetches = self.fetches.load(Ordering::Relaxed);
        let fetch_failures = self.fetch_failures.load(Ordering::Relaxed);
        let fetch_success_rate = if fetches > 0 {
            (fetches.saturating_sub(fetch_failures) as f64 / fetches as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            fetches,
            fetch_failures,
            fetch_success_rate,
            exports: self.exports.load(Ordering::Relaxed),
            export_failures: self.export_failures.load(Ordering::Relaxed),
            export_days_skipped: self.export_days_skipped.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
            forms_rejected: self.forms_rejected.load(Ordering::Relaxed),
        }
    }
}

/// Metrics report containing current site statistics.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub fetches: usize,
    pub fetch_failures: usize,

    /// Percentage (0-100) of fetches that reached the ready state
    pub fetch_success_rate: f64,

    pub exports: usize,
    pub export_failures: usize,
    pub export_days_skipped: usize,
    pub writes: usize,
    pub write_failures: usize,
    pub forms_rejected: usize,
}
