//! CareGuard Service
//!
//! Host-agnostic facade over the CareGuard guards: the four per-domain
//! validation operations plus batch validation, metrics, configuration
//! views, a health probe and atomic ruleset reload.

pub mod batch;
pub mod config;
pub mod service;

pub use batch::{parse_batch, BatchEntry, BatchItem, BatchOutcome};
pub use config::{ConfigOverrides, LogFormat, MetricsConfig, ServiceConfig};
pub use service::{GuardService, HealthReport, HealthStatus};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::batch::{BatchItem, BatchOutcome};
    pub use crate::config::ServiceConfig;
    pub use crate::service::GuardService;
}
