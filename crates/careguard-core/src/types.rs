//! Request types for CareGuard
//!
//! Each content domain has its own request struct carrying only the fields
//! that domain needs; [`ValidationRequest`] is the tagged union a host hands
//! to the engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Free-form patient information attached to a triage request
pub type PatientInfo = serde_json::Map<String, serde_json::Value>;

/// Content domain a request belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Chat,
    Appointment,
    Emergency,
    Clinical,
}

impl Domain {
    /// All domains, in dispatch-table order
    pub const ALL: [Domain; 4] = [
        Domain::Chat,
        Domain::Appointment,
        Domain::Emergency,
        Domain::Clinical,
    ];

    /// Wire tag for this domain
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Appointment => "appointment",
            Self::Emergency => "emergency",
            Self::Clinical => "clinical",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a dispatch tag names no known domain
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown domain: {0}")]
pub struct UnknownDomain(pub String);

impl FromStr for Domain {
    type Err = UnknownDomain;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chat" => Ok(Self::Chat),
            "appointment" => Ok(Self::Appointment),
            "emergency" => Ok(Self::Emergency),
            "clinical" => Ok(Self::Clinical),
            _ => Err(UnknownDomain(s.to_string())),
        }
    }
}

/// A conversational reply awaiting screening
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Message text
    pub message: String,

    /// Conversation intent
    #[serde(default = "default_intent")]
    pub intent: String,

    /// Optional caller identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl ChatRequest {
    /// Create a chat request with the default intent
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            intent: default_intent(),
            user_id: None,
        }
    }

    /// Set the conversation intent
    pub fn with_intent(mut self, intent: impl Into<String>) -> Self {
        self.intent = intent.into();
        self
    }
}

/// An appointment-booking request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentRequest {
    pub patient_name: String,
    pub contact_phone: String,
    /// `YYYY-MM-DD`
    pub preferred_date: String,
    /// `HH:MM`, 24h
    pub preferred_time: String,
    pub service_type: String,
    pub urgency_level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symptoms: Option<String>,
}

/// An emergency-symptom triage request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyRequest {
    /// Patient-reported symptoms
    pub symptoms: String,

    /// Free-form patient information (`id` is used for logging)
    pub patient_info: PatientInfo,

    /// Caller's own severity estimate
    #[serde(default, alias = "severity_assessment", skip_serializing_if = "Option::is_none")]
    pub severity_hint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl EmergencyRequest {
    /// Create a triage request with no hint or location
    pub fn new(symptoms: impl Into<String>, patient_info: PatientInfo) -> Self {
        Self {
            symptoms: symptoms.into(),
            patient_info,
            severity_hint: None,
            location: None,
        }
    }

    /// Patient identifier for logging, `"unknown"` when absent
    pub fn patient_id(&self) -> String {
        match self.patient_info.get("id") {
            Some(serde_json::Value::String(id)) => id.clone(),
            Some(other) if !other.is_null() => other.to_string(),
            _ => "unknown".to_string(),
        }
    }
}

/// Clinical or informational text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicalRequest {
    pub content: String,

    #[serde(default = "default_content_type")]
    pub content_type: String,

    #[serde(default = "default_target_audience")]
    pub target_audience: String,
}

impl ClinicalRequest {
    /// Create a clinical request with default type and audience
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            content_type: default_content_type(),
            target_audience: default_target_audience(),
        }
    }
}

/// Tagged union over all domains
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "domain", rename_all = "lowercase")]
pub enum ValidationRequest {
    Chat(ChatRequest),
    Appointment(AppointmentRequest),
    Emergency(EmergencyRequest),
    Clinical(ClinicalRequest),
}

impl ValidationRequest {
    /// Domain this request belongs to
    pub fn domain(&self) -> Domain {
        match self {
            Self::Chat(_) => Domain::Chat,
            Self::Appointment(_) => Domain::Appointment,
            Self::Emergency(_) => Domain::Emergency,
            Self::Clinical(_) => Domain::Clinical,
        }
    }
}

fn default_intent() -> String {
    "general".to_string()
}

fn default_content_type() -> String {
    "general".to_string()
}

fn default_target_audience() -> String {
    "patients".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_from_str() {
        assert_eq!("chat".parse::<Domain>(), Ok(Domain::Chat));
        assert_eq!(" Emergency ".parse::<Domain>(), Ok(Domain::Emergency));
        assert_eq!(
            "billing".parse::<Domain>(),
            Err(UnknownDomain("billing".to_string()))
        );
    }

    #[test]
    fn test_tagged_request_deserialization() {
        let json = r#"{"domain": "chat", "message": "Olá, tudo bem?"}"#;
        let request: ValidationRequest = serde_json::from_str(json).unwrap();

        match request {
            ValidationRequest::Chat(chat) => {
                assert_eq!(chat.intent, "general");
                assert!(chat.user_id.is_none());
            }
            _ => panic!("Wrong request type"),
        }
    }

    #[test]
    fn test_emergency_accepts_legacy_hint_name() {
        let json = r#"{
            "symptoms": "Dente quebrado",
            "patient_info": {"id": 42},
            "severity_assessment": "urgent"
        }"#;
        let request: EmergencyRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.severity_hint.as_deref(), Some("urgent"));
        assert_eq!(request.patient_id(), "42");
    }

    #[test]
    fn test_clinical_defaults() {
        let request: ClinicalRequest =
            serde_json::from_str(r#"{"content": "Escove os dentes após as refeições."}"#).unwrap();
        assert_eq!(request.content_type, "general");
        assert_eq!(request.target_audience, "patients");
    }
}
