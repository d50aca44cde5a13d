//! Validation metrics aggregation
//!
//! All counters live behind one mutex so a snapshot is never torn: a reader
//! sees `total_requests` and the matching `by_type` bucket move together.
//! Every update is mirrored into the `metrics` facade for whatever recorder
//! the host installed.

use careguard_core::{Domain, ValidationStatus};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::BTreeMap;

/// Outcome of one validation, recorded as a single step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationRecord {
    /// `None` for requests with an unknown domain tag
    pub domain: Option<Domain>,
    pub status: ValidationStatus,
    pub latency_ms: f64,
}

/// Thread-safe aggregate counters for the validation engine
pub struct MetricsAggregator {
    inner: Mutex<MetricsInner>,
}

#[derive(Debug, Clone)]
struct MetricsInner {
    total_requests: u64,
    successful_validations: u64,
    failed_validations: u64,
    emergency_requests: u64,
    by_type: BTreeMap<Domain, u64>,
    by_status: BTreeMap<ValidationStatus, u64>,
    average_latency_ms: f64,
    latency_samples: u64,
    started_at: DateTime<Utc>,
}

impl MetricsInner {
    fn new() -> Self {
        Self {
            total_requests: 0,
            successful_validations: 0,
            failed_validations: 0,
            emergency_requests: 0,
            by_type: Domain::ALL.iter().map(|d| (*d, 0)).collect(),
            by_status: BTreeMap::new(),
            average_latency_ms: 0.0,
            latency_samples: 0,
            started_at: Utc::now(),
        }
    }

    fn request(&mut self, domain: Option<Domain>) {
        self.total_requests += 1;
        if let Some(domain) = domain {
            *self.by_type.entry(domain).or_insert(0) += 1;
        }
    }

    fn outcome(&mut self, success: bool) {
        if success {
            self.successful_validations += 1;
        } else {
            self.failed_validations += 1;
        }
    }

    fn latency(&mut self, sample_ms: f64) {
        self.latency_samples += 1;
        self.average_latency_ms +=
            (sample_ms - self.average_latency_ms) / self.latency_samples as f64;
    }
}

impl MetricsAggregator {
    /// Create an aggregator; `started_at` is now
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsInner::new()),
        }
    }

    /// Count a request for `domain`
    pub fn record_request(&self, domain: Domain) {
        self.inner.lock().request(Some(domain));
        metrics::counter!("careguard_requests_total", "domain" => domain.as_str()).increment(1);
    }

    /// Count a success or failure
    pub fn record_outcome(&self, domain: Domain, success: bool) {
        self.inner.lock().outcome(success);
        emit_outcome(domain.as_str(), success);
    }

    /// Count an emergency-relevant request
    ///
    /// Not every emergency request is escalated; escalations are counted
    /// separately from the decision status in [`record`](Self::record).
    pub fn record_emergency(&self) {
        self.inner.lock().emergency_requests += 1;
        metrics::counter!("careguard_emergency_requests_total").increment(1);
    }

    /// Fold a latency sample into the rolling mean
    pub fn record_latency(&self, latency_ms: f64) {
        self.inner.lock().latency(latency_ms);
        metrics::histogram!("careguard_validation_latency_ms").record(latency_ms);
    }

    /// Record a complete validation under a single lock
    pub fn record(&self, record: ValidationRecord) {
        let emergency = record.domain == Some(Domain::Emergency)
            || record.status == ValidationStatus::EmergencyAppointment;
        let success = record.status.is_success();

        {
            let mut inner = self.inner.lock();
            inner.request(record.domain);
            inner.outcome(success);
            *inner.by_status.entry(record.status).or_insert(0) += 1;
            if emergency {
                inner.emergency_requests += 1;
            }
            inner.latency(record.latency_ms);
        }

        let domain = record.domain.map(|d| d.as_str()).unwrap_or("unknown");
        metrics::counter!("careguard_requests_total", "domain" => domain).increment(1);
        metrics::counter!(
            "careguard_decisions_total",
            "domain" => domain,
            "status" => record.status.as_str()
        )
        .increment(1);
        emit_outcome(domain, success);
        if emergency {
            metrics::counter!("careguard_emergency_requests_total").increment(1);
        }
        if record.status.is_escalation() {
            metrics::counter!("careguard_escalations_total").increment(1);
        }
        metrics::histogram!("careguard_validation_latency_ms").record(record.latency_ms);
    }

    /// Consistent copy of every counter
    pub fn snapshot(&self) -> MetricsSnapshot {
        let inner = self.inner.lock().clone();
        MetricsSnapshot {
            total_requests: inner.total_requests,
            successful_validations: inner.successful_validations,
            failed_validations: inner.failed_validations,
            emergency_requests: inner.emergency_requests,
            by_type: inner.by_type,
            by_status: inner.by_status,
            average_latency_ms: inner.average_latency_ms,
            started_at: inner.started_at,
        }
    }

    /// Zero every counter and restart the uptime clock
    pub fn reset(&self) {
        *self.inner.lock() = MetricsInner::new();
    }
}

fn emit_outcome(domain: &'static str, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    metrics::counter!(
        "careguard_outcomes_total",
        "domain" => domain,
        "outcome" => outcome
    )
    .increment(1);
}

impl Default for MetricsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time view of the aggregate counters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub successful_validations: u64,
    pub failed_validations: u64,
    pub emergency_requests: u64,
    pub by_type: BTreeMap<Domain, u64>,
    pub by_status: BTreeMap<ValidationStatus, u64>,
    pub average_latency_ms: f64,
    pub started_at: DateTime<Utc>,
}

impl MetricsSnapshot {
    /// Successful share of all requests, as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.successful_validations as f64 / self.total_requests as f64 * 100.0
        }
    }

    /// Requests counted for `domain`
    pub fn count_for(&self, domain: Domain) -> u64 {
        self.by_type.get(&domain).copied().unwrap_or(0)
    }

    /// Requests that ended with `status`
    pub fn count_with(&self, status: ValidationStatus) -> u64 {
        self.by_status.get(&status).copied().unwrap_or(0)
    }
}
