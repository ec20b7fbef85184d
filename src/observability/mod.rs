//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every request produces:
//!     → stats.rs (atomic process-lifetime counters)
//!     → access_log.rs (one access line; error line on transport failure)
//!     → metrics.rs (Prometheus counters/histograms, when enabled)
//!     → tracing events (diagnostics, configured in logging.rs)
//!
//! Consumers:
//!     → Access/error log files (line oriented, append only)
//!     → Admin API (stats snapshot)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Sinks are injected into the gateway, no process-wide logger globals
//! - One line = one write, so concurrent requests never interleave partial lines
//! - Counters are diagnostic only, never consulted for admission

pub mod access_log;
pub mod logging;
pub mod metrics;
pub mod stats;

pub use access_log::{AccessLog, ErrorLog, LogSink};
pub use stats::{GatewayStats, StatsSnapshot};
