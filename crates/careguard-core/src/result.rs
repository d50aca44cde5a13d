//! Validation result envelope
//!
//! Every path through the engine ends in a [`ValidationResult`]: a status,
//! a domain-specific [`Decision`] payload and a timestamp. The status is
//! derived from the decision, so an escalation status can only be produced
//! together with its escalation flags.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{AppointmentRequest, Domain};

/// Outcome status of a validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    Valid,
    Invalid,
    EmergencyAppointment,
    EmergencyFallback,
    Error,
}

impl ValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Invalid => "invalid",
            Self::EmergencyAppointment => "emergency_appointment",
            Self::EmergencyFallback => "emergency_fallback",
            Self::Error => "error",
        }
    }

    /// Whether the outcome counts as a handled request in metrics.
    ///
    /// Escalations are successful handling: the request reached a decision.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            Self::Valid | Self::EmergencyAppointment | Self::EmergencyFallback
        )
    }

    /// Whether this status is an escalation
    pub fn is_escalation(&self) -> bool {
        matches!(self, Self::EmergencyAppointment | Self::EmergencyFallback)
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Emergency triage severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityLevel {
    Immediate,
    Urgent,
}

impl SeverityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Immediate => "immediate",
            Self::Urgent => "urgent",
        }
    }
}

impl fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Triage assessment, built fresh per request and never mutated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyAssessment {
    pub severity_level: SeverityLevel,

    pub recommendation: String,

    pub requires_immediate_attention: bool,

    /// Present only for `immediate` severity
    pub emergency_contacts: Option<Vec<String>>,

    /// Emergency keyword that forced `immediate`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_keyword: Option<String>,

    /// Caller-supplied severity hint, echoed when recognised
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reported_severity: Option<String>,
}

impl EmergencyAssessment {
    /// Build an assessment; contacts are attached only when immediate
    pub fn new(
        severity_level: SeverityLevel,
        recommendation: impl Into<String>,
        contacts: &[String],
    ) -> Self {
        let immediate = severity_level == SeverityLevel::Immediate;
        Self {
            severity_level,
            recommendation: recommendation.into(),
            requires_immediate_attention: immediate,
            emergency_contacts: immediate.then(|| contacts.to_vec()),
            matched_keyword: None,
            reported_severity: None,
        }
    }

    pub fn with_matched_keyword(mut self, keyword: Option<String>) -> Self {
        self.matched_keyword = keyword;
        self
    }

    pub fn with_reported_severity(mut self, hint: Option<String>) -> Self {
        self.reported_severity = hint;
        self
    }
}

/// Domain-specific decision payload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Decision {
    ChatAccepted {
        validated_response: String,
        intent: String,
        requires_human: bool,
        safety_score: f64,
    },
    ChatRejected {
        error: String,
        original_response: String,
        fallback_response: String,
        requires_human: bool,
    },
    AppointmentAccepted {
        validated_appointment: AppointmentRequest,
        priority_level: u8,
        estimated_duration_minutes: u32,
    },
    AppointmentRejected {
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        field: Option<String>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        allowed_values: Vec<String>,
        requires_review: bool,
    },
    EmergencyAppointment {
        immediate_booking: bool,
        human_confirmation_required: bool,
        emergency_contacts_notified: bool,
        estimated_response_time: String,
        appointment_data: AppointmentRequest,
    },
    Triage {
        triage_result: EmergencyAssessment,
        immediate_action_required: bool,
        human_review_required: bool,
        emergency_protocol_activated: bool,
    },
    EmergencyFallback {
        error: String,
        automatic_escalation: bool,
        immediate_human_required: bool,
        human_review_required: bool,
        emergency_message: String,
        emergency_contacts: Vec<String>,
    },
    ClinicalAccepted {
        validated_content: String,
        content_type: String,
        target_audience: String,
        medical_disclaimer_required: bool,
        accuracy_score: f64,
    },
    ClinicalRejected {
        error: String,
        requires_medical_review: bool,
    },
    UnknownDomain {
        error: String,
        fallback_required: bool,
    },
}

impl Decision {
    /// Appointment escalated on urgency alone
    pub fn emergency_appointment(
        appointment_data: AppointmentRequest,
        estimated_response_time: impl Into<String>,
    ) -> Self {
        Self::EmergencyAppointment {
            immediate_booking: true,
            human_confirmation_required: true,
            emergency_contacts_notified: true,
            estimated_response_time: estimated_response_time.into(),
            appointment_data,
        }
    }

    /// Triage assessment; every triage case requires human sign-off
    pub fn triage(assessment: EmergencyAssessment) -> Self {
        let immediate = assessment.requires_immediate_attention;
        Self::Triage {
            triage_result: assessment,
            immediate_action_required: immediate,
            human_review_required: true,
            emergency_protocol_activated: immediate,
        }
    }

    /// Triage escalation path
    pub fn emergency_fallback(
        reason: impl Into<String>,
        message: impl Into<String>,
        contacts: &[String],
    ) -> Self {
        Self::EmergencyFallback {
            error: reason.into(),
            automatic_escalation: true,
            immediate_human_required: true,
            human_review_required: true,
            emergency_message: message.into(),
            emergency_contacts: contacts.to_vec(),
        }
    }

    /// Status implied by this decision
    pub fn status(&self) -> ValidationStatus {
        match self {
            Self::ChatAccepted { .. }
            | Self::AppointmentAccepted { .. }
            | Self::Triage { .. }
            | Self::ClinicalAccepted { .. } => ValidationStatus::Valid,
            Self::ChatRejected { .. }
            | Self::AppointmentRejected { .. }
            | Self::ClinicalRejected { .. } => ValidationStatus::Invalid,
            Self::EmergencyAppointment { .. } => ValidationStatus::EmergencyAppointment,
            Self::EmergencyFallback { .. } => ValidationStatus::EmergencyFallback,
            Self::UnknownDomain { .. } => ValidationStatus::Error,
        }
    }

    /// Whether a human must look at this item before it reaches the user
    pub fn requires_human_review(&self) -> bool {
        match self {
            Self::ChatAccepted { requires_human, .. }
            | Self::ChatRejected { requires_human, .. } => *requires_human,
            Self::AppointmentAccepted { .. } | Self::ClinicalAccepted { .. } => false,
            Self::AppointmentRejected { requires_review, .. } => *requires_review,
            Self::EmergencyAppointment {
                human_confirmation_required,
                ..
            } => *human_confirmation_required,
            Self::Triage {
                human_review_required,
                ..
            }
            | Self::EmergencyFallback {
                human_review_required,
                ..
            } => *human_review_required,
            Self::ClinicalRejected {
                requires_medical_review,
                ..
            } => *requires_medical_review,
            Self::UnknownDomain {
                fallback_required, ..
            } => *fallback_required,
        }
    }

    /// Emergency contacts carried by this decision, if any
    pub fn emergency_contacts(&self) -> &[String] {
        match self {
            Self::EmergencyFallback {
                emergency_contacts, ..
            } => emergency_contacts,
            Self::Triage { triage_result, .. } => {
                triage_result.emergency_contacts.as_deref().unwrap_or(&[])
            }
            _ => &[],
        }
    }

    /// Rejection or escalation reason, if any
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::ChatRejected { error, .. }
            | Self::AppointmentRejected { error, .. }
            | Self::EmergencyFallback { error, .. }
            | Self::ClinicalRejected { error, .. }
            | Self::UnknownDomain { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Uniform result envelope returned for every request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    /// `None` only for unroutable requests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<Domain>,

    pub status: ValidationStatus,

    #[serde(flatten)]
    pub decision: Decision,

    pub timestamp: DateTime<Utc>,
}

impl ValidationResult {
    /// Wrap a decision for `domain`
    pub fn new(domain: Domain, decision: Decision) -> Self {
        Self {
            domain: Some(domain),
            status: decision.status(),
            decision,
            timestamp: Utc::now(),
        }
    }

    /// The domain-agnostic error for an unrecognised dispatch tag
    pub fn unknown_domain(tag: &str) -> Self {
        let decision = Decision::UnknownDomain {
            error: format!("Unknown response type: {}", tag),
            fallback_required: true,
        };
        Self {
            domain: None,
            status: decision.status(),
            decision,
            timestamp: Utc::now(),
        }
    }

    pub fn requires_human_review(&self) -> bool {
        self.decision.requires_human_review()
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}
