//! CareGuard Telemetry
//!
//! Aggregate validation metrics for the CareGuard engine:
//! - Per-domain and per-status request counts
//! - Success/failure and emergency counters
//! - Rolling average latency
//!
//! Counters are kept in-process for snapshots and mirrored into the
//! `metrics` facade for exporters.

pub mod metrics;

pub use metrics::{MetricsAggregator, MetricsSnapshot, ValidationRecord};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::metrics::{MetricsAggregator, MetricsSnapshot, ValidationRecord};
}
