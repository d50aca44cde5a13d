//! Appointment business-rule validator
//!
//! Runs in three phases:
//! 1. Structural checks (presence, phone/date/time syntax, length bounds)
//! 2. Emergency short-circuit on urgency alone
//! 3. Choice validation, then priority and duration derivation
//!
//! The short-circuit deliberately skips choice validation: an appointment
//! tagged emergency is escalated even when its service type is unknown.

use careguard_core::{AppointmentRequest, Decision, Domain, Error, Result, ValidationResult, Violation};
use chrono::NaiveDate;
use regex::Regex;
use tracing::{debug, warn};

use crate::definition::AppointmentRules;
use crate::guard::{Guard, GuardInfo};

const REQUIRED_FIELDS: [&str; 6] = [
    "patient_name",
    "contact_phone",
    "preferred_date",
    "preferred_time",
    "service_type",
    "urgency_level",
];

/// Validates appointment booking requests
pub struct AppointmentPolicyValidator {
    rules: AppointmentRules,
    phone_regex: Regex,
    date_regex: Regex,
    time_regex: Regex,
}

impl AppointmentPolicyValidator {
    /// Build a validator; service and urgency names are matched lower-cased
    pub fn new(rules: &AppointmentRules) -> Result<Self> {
        let mut rules = rules.clone();
        for service in &mut rules.services {
            service.name = service.name.trim().to_lowercase();
        }
        for level in &mut rules.urgency_levels {
            level.name = level.name.trim().to_lowercase();
        }

        Ok(Self {
            phone_regex: Regex::new(&rules.phone_pattern)
                .map_err(|e| Error::config(format!("Failed to compile phone regex: {}", e)))?,
            date_regex: Regex::new(r"^\d{4}-\d{2}-\d{2}$")
                .map_err(|e| Error::config(format!("Failed to compile date regex: {}", e)))?,
            time_regex: Regex::new(r"^([01]?[0-9]|2[0-3]):[0-5][0-9]$")
                .map_err(|e| Error::config(format!("Failed to compile time regex: {}", e)))?,
            rules,
        })
    }

    /// Validate an appointment request
    pub fn validate(&self, request: &AppointmentRequest) -> ValidationResult {
        let decision = match self.evaluate(request) {
            Ok(decision) => decision,
            Err(violation) => Decision::AppointmentRejected {
                error: violation.to_string(),
                field: violation.field().map(str::to_string),
                allowed_values: violation.allowed_values().to_vec(),
                requires_review: true,
            },
        };

        let result = ValidationResult::new(Domain::Appointment, decision);
        if result.status.is_escalation() {
            warn!(
                domain = "appointment",
                service_type = %request.service_type,
                "Emergency appointment escalated for immediate booking"
            );
        } else {
            debug!(domain = "appointment", status = %result.status, "Appointment evaluated");
        }
        result
    }

    fn evaluate(&self, request: &AppointmentRequest) -> std::result::Result<Decision, Violation> {
        self.check_structure(request)?;

        if request
            .urgency_level
            .trim()
            .eq_ignore_ascii_case(&self.rules.emergency_urgency)
        {
            return Ok(Decision::emergency_appointment(
                request.clone(),
                self.rules.emergency_response_time.clone(),
            ));
        }

        let service_type = request.service_type.trim().to_lowercase();
        let allowed_services = self.rules.service_names();
        if !allowed_services.contains(&service_type) {
            return Err(Violation::Choice {
                field: "service_type".to_string(),
                value: request.service_type.clone(),
                allowed: allowed_services,
            });
        }

        let urgency_level = request.urgency_level.trim().to_lowercase();
        let allowed_levels = self.rules.urgency_names();
        if !allowed_levels.contains(&urgency_level) {
            return Err(Violation::Choice {
                field: "urgency_level".to_string(),
                value: request.urgency_level.clone(),
                allowed: allowed_levels,
            });
        }

        let priority_level = self.rules.priority_for(&urgency_level);
        let estimated_duration_minutes = self.rules.duration_for(&service_type);

        Ok(Decision::AppointmentAccepted {
            validated_appointment: AppointmentRequest {
                patient_name: request.patient_name.trim().to_string(),
                service_type,
                urgency_level,
                ..request.clone()
            },
            priority_level,
            estimated_duration_minutes,
        })
    }

    fn check_structure(&self, request: &AppointmentRequest) -> std::result::Result<(), Violation> {
        let name_len = request.patient_name.trim().chars().count();
        if name_len < self.rules.name_min_length || name_len > self.rules.name_max_length {
            return Err(Violation::structural(
                "patient_name",
                format!(
                    "must be between {} and {} characters",
                    self.rules.name_min_length, self.rules.name_max_length
                ),
            ));
        }

        let phone = request.contact_phone.trim();
        if phone.is_empty() {
            return Err(Violation::structural("contact_phone", "field required"));
        }
        if !self.phone_regex.is_match(phone) {
            return Err(Violation::structural("contact_phone", "malformed phone number"));
        }

        let date = request.preferred_date.trim();
        if date.is_empty() {
            return Err(Violation::structural("preferred_date", "field required"));
        }
        if !self.date_regex.is_match(date) || NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
            return Err(Violation::structural(
                "preferred_date",
                "expected a calendar date in YYYY-MM-DD format",
            ));
        }

        let time = request.preferred_time.trim();
        if time.is_empty() {
            return Err(Violation::structural("preferred_time", "field required"));
        }
        if !self.time_regex.is_match(time) {
            return Err(Violation::structural("preferred_time", "expected HH:MM (24h)"));
        }

        if request.service_type.trim().is_empty() {
            return Err(Violation::structural("service_type", "field required"));
        }
        if request.urgency_level.trim().is_empty() {
            return Err(Violation::structural("urgency_level", "field required"));
        }

        if let Some(symptoms) = &request.symptoms {
            if symptoms.chars().count() > self.rules.symptoms_max_length {
                return Err(Violation::structural(
                    "symptoms",
                    format!("must be at most {} characters", self.rules.symptoms_max_length),
                ));
            }
        }

        Ok(())
    }
}

impl Guard for AppointmentPolicyValidator {
    fn name(&self) -> &str {
        "appointment_booking_guard"
    }

    fn domain(&self) -> Domain {
        Domain::Appointment
    }

    fn check(&self, payload: serde_json::Value) -> ValidationResult {
        if let Some(field) = missing_field(&payload) {
            let violation = Violation::structural(field, "field required");
            return ValidationResult::new(
                Domain::Appointment,
                Decision::AppointmentRejected {
                    error: violation.to_string(),
                    field: Some(field.to_string()),
                    allowed_values: Vec::new(),
                    requires_review: true,
                },
            );
        }

        match serde_json::from_value::<AppointmentRequest>(payload) {
            Ok(request) => self.validate(&request),
            Err(e) => ValidationResult::new(
                Domain::Appointment,
                Decision::AppointmentRejected {
                    error: format!("malformed appointment request: {}", e),
                    field: None,
                    allowed_values: Vec::new(),
                    requires_review: true,
                },
            ),
        }
    }

    fn describe(&self) -> GuardInfo {
        GuardInfo::new(
            self.name(),
            Domain::Appointment,
            "Validates appointment requests",
            &["structure", "emergency_short_circuit", "service_choice", "urgency_choice"],
        )
    }
}

/// First required field that is absent or null in an object payload
fn missing_field(payload: &serde_json::Value) -> Option<&'static str> {
    let fields = payload.as_object()?;
    REQUIRED_FIELDS
        .into_iter()
        .find(|field| fields.get(*field).map_or(true, serde_json::Value::is_null))
}
