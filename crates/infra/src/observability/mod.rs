//! Observability helpers
//!
//! - [`error_label`]: stable, low-cardinality label for an [`ApiError`], used
//!   as a `tracing` field
//! - [`ClientMetrics`]: per-client counters for requests, token refreshes and
//!   forced sign-outs
//!
//! ## Memory Ordering
//! Counters are independent of each other, so `Relaxed` is sufficient.

use std::sync::atomic::{AtomicU64, Ordering};

use nexus_domain::{ApiError, ApiErrorCategory};

/// Label for log fields and caller-side dashboards.
pub fn error_label(error: &ApiError) -> &'static str {
    match error.category() {
        ApiErrorCategory::Transport if error.is_unauthorized() => "unauthorized",
        ApiErrorCategory::Transport => "transport",
        ApiErrorCategory::Decode => "decode",
        ApiErrorCategory::Network => "network",
        ApiErrorCategory::Job => "job",
        ApiErrorCategory::Validation => "validation",
        ApiErrorCategory::Local => "local",
        ApiErrorCategory::Config => "config",
        ApiErrorCategory::Cancelled => "cancelled",
    }
}

/// Counters of one client instance
#[derive(Debug, Default)]
pub struct ClientMetrics {
    requests: AtomicU64,
    failures: AtomicU64,
    refreshes: AtomicU64,
    forced_sign_outs: AtomicU64,
}

/// Point-in-time copy of [`ClientMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Requests put on the wire, resends included
    pub requests: u64,
    /// Calls that ended in a transport error
    pub failures: u64,
    /// Expired-token recoveries whose refresh step succeeded
    pub refreshes: u64,
    /// Sign-outs forced by rejected credentials
    pub forced_sign_outs: u64,
}

impl ClientMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed call and return its label for the log line.
    pub fn record_failure(&self, error: &ApiError) -> &'static str {
        self.failures.fetch_add(1, Ordering::Relaxed);
        error_label(error)
    }

    pub fn record_refresh(&self) {
        self.refreshes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_forced_sign_out(&self) {
        self.forced_sign_outs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            refreshes: self.refreshes.load(Ordering::Relaxed),
            forced_sign_outs: self.forced_sign_outs.load(Ordering::Relaxed),
        }
    }
}
