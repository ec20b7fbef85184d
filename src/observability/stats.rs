//! Process-lifetime request counters.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic counters mutated by every request.
///
/// Each counter is updated atomically on its own; reading several counters is
/// not a consistent cut across concurrent requests.
#[derive(Debug, Default)]
pub struct GatewayStats {
    total: AtomicU64,
    admitted: AtomicU64,
    rejected: AtomicU64,
    failed: AtomicU64,
    unreachable: AtomicU64,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub total_requests: u64,
    pub admitted_requests: u64,
    pub rejected_requests: u64,
    /// Forwarded requests whose downstream answered with a 5xx status.
    pub failed_requests: u64,
    /// Forwarded requests that never got a downstream response.
    pub unreachable_requests: u64,
}

impl GatewayStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_received(&self) {
        self.total.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_admitted(&self) {
        self.admitted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_server_error(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_unreachable(&self) {
        self.unreachable.fetch_add(1, Ordering::Relaxed);
    }

    pub fn rejected_requests(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    pub fn failed_requests(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            total_requests: self.total.load(Ordering::Relaxed),
            admitted_requests: self.admitted.load(Ordering::Relaxed),
            rejected_requests: self.rejected.load(Ordering::Relaxed),
            failed_requests: self.failed.load(Ordering::Relaxed),
            unreachable_requests: self.unreachable.load(Ordering::Relaxed),
        }
    }
}
