//! Host-agnostic validation service
//!
//! [`GuardService`] wraps a [`GuardRegistry`] with timing, metrics and
//! logging. The registry is immutable; [`GuardService::reload`] swaps in a
//! new one atomically and requests already running keep the old instance.

use careguard_core::{
    AppointmentRequest, ChatRequest, ClinicalRequest, EmergencyRequest, PatientInfo,
    Result, ValidationRequest, ValidationResult, ValidationStatus,
};
use careguard_policy::{GuardConfigView, GuardDefinition, GuardInfo, GuardRegistry};
use careguard_telemetry::{MetricsAggregator, MetricsSnapshot, ValidationRecord};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::batch::{BatchEntry, BatchItem, BatchOutcome};
use crate::config::ServiceConfig;

const HEALTH_PROBE_MESSAGE: &str = "Olá, como posso ajudar?";

/// Validation service shared by every request of a host
pub struct GuardService {
    registry: RwLock<Arc<GuardRegistry>>,
    metrics: MetricsAggregator,
}

impl GuardService {
    /// Create a service from a ruleset
    pub fn new(definition: GuardDefinition) -> Result<Self> {
        let registry = GuardRegistry::new(definition)?;
        Ok(Self {
            registry: RwLock::new(Arc::new(registry)),
            metrics: MetricsAggregator::new(),
        })
    }

    /// Create a service from its configuration
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let service = Self::new(config.guard_definition()?)?;
        info!(
            profile = %config.profile,
            ruleset = ?config.ruleset,
            "Guard service ready"
        );
        Ok(service)
    }

    /// Validate a chatbot reply
    pub fn validate_chat(
        &self,
        message: impl Into<String>,
        intent: Option<&str>,
        user_id: Option<&str>,
    ) -> ValidationResult {
        let mut request = ChatRequest::new(message);
        if let Some(intent) = intent {
            request.intent = intent.to_string();
        }
        request.user_id = user_id.map(str::to_string);

        self.validate(&ValidationRequest::Chat(request))
    }

    /// Validate an appointment booking
    pub fn validate_appointment(&self, request: AppointmentRequest) -> ValidationResult {
        self.validate(&ValidationRequest::Appointment(request))
    }

    /// Classify emergency symptoms
    pub fn validate_emergency(
        &self,
        symptoms: impl Into<String>,
        patient_info: PatientInfo,
        severity_hint: Option<&str>,
    ) -> ValidationResult {
        let mut request = EmergencyRequest::new(symptoms, patient_info);
        request.severity_hint = severity_hint.map(str::to_string);

        self.validate(&ValidationRequest::Emergency(request))
    }

    /// Validate clinical content
    pub fn validate_clinical(
        &self,
        content: impl Into<String>,
        content_type: Option<&str>,
        target_audience: Option<&str>,
    ) -> ValidationResult {
        let mut request = ClinicalRequest::new(content);
        if let Some(content_type) = content_type {
            request.content_type = content_type.to_string();
        }
        if let Some(target_audience) = target_audience {
            request.target_audience = target_audience.to_string();
        }

        self.validate(&ValidationRequest::Clinical(request))
    }

    /// Validate a typed request
    pub fn validate(&self, request: &ValidationRequest) -> ValidationResult {
        self.observe(|registry| registry.validate(request))
    }

    /// Validate an untyped payload routed by domain tag
    pub fn dispatch(&self, tag: &str, payload: serde_json::Value) -> ValidationResult {
        self.observe(|registry| registry.dispatch(tag, payload))
    }

    /// Validate every item in order; each is recorded on its own
    pub fn validate_batch(&self, items: Vec<BatchItem>) -> BatchOutcome {
        let batch_size = items.len();
        let results: Vec<BatchEntry> = items
            .into_iter()
            .map(|item| BatchEntry {
                result: self.dispatch(&item.domain, item.payload),
                request_id: item.id,
                domain: item.domain,
            })
            .collect();

        let outcome = BatchOutcome {
            batch_size,
            results,
        };
        info!(
            batch_size,
            escalations = outcome.escalations().count(),
            "Batch validated"
        );
        outcome
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn reset_metrics(&self) {
        self.metrics.reset();
        debug!("Metrics reset");
    }

    /// Services, urgency levels and emergency keywords in force
    pub fn guard_config(&self) -> GuardConfigView {
        self.registry().guard_config()
    }

    pub fn describe_guards(&self) -> Vec<GuardInfo> {
        self.registry().describe_guards()
    }

    /// Run a fixed probe through the chat guard
    ///
    /// The probe is not recorded in metrics.
    pub fn health(&self) -> HealthReport {
        let registry = self.registry();
        let probe = registry.chat().validate(&ChatRequest::new(HEALTH_PROBE_MESSAGE));
        let metrics = self.metrics.snapshot();

        let status = if probe.status == ValidationStatus::Error {
            HealthStatus::Unhealthy
        } else {
            HealthStatus::Healthy
        };

        HealthReport {
            status,
            probe_status: probe.status,
            ruleset_version: registry.definition().version.clone(),
            guards: registry.count(),
            total_requests: metrics.total_requests,
            average_latency_ms: metrics.average_latency_ms,
            started_at: metrics.started_at,
        }
    }

    /// Validate a new ruleset and swap it in
    ///
    /// On error the active ruleset is left untouched.
    pub fn reload(&self, definition: GuardDefinition) -> Result<()> {
        let registry = Arc::new(GuardRegistry::new(definition)?);
        let version = registry.definition().version.clone();
        *self.registry.write() = registry;
        info!(version = %version, "Ruleset reloaded");
        Ok(())
    }

    /// Registry currently in force
    pub fn registry(&self) -> Arc<GuardRegistry> {
        self.registry.read().clone()
    }

    fn observe<F>(&self, evaluate: F) -> ValidationResult
    where
        F: FnOnce(&GuardRegistry) -> ValidationResult,
    {
        let registry = self.registry();
        let start = Instant::now();
        let result = evaluate(&registry);
        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

        self.metrics.record(ValidationRecord {
            domain: result.domain,
            status: result.status,
            latency_ms,
        });

        let domain = result.domain.map(|d| d.as_str()).unwrap_or("unknown");
        if result.status.is_escalation() {
            warn!(
                domain,
                status = %result.status,
                latency_ms,
                "Request escalated to human review"
            );
        } else {
            debug!(domain, status = %result.status, latency_ms, "Request validated");
        }

        result
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Health probe outcome
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub probe_status: ValidationStatus,
    pub ruleset_version: String,
    pub guards: usize,
    pub total_requests: u64,
    pub average_latency_ms: f64,
    pub started_at: DateTime<Utc>,
}
