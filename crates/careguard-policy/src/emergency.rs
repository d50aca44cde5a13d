//! Emergency triage classifier
//!
//! Classification is keyword-based and always fails toward escalation.
//! Assessment is computed as `Result<EmergencyAssessment, Violation>`; every
//! `Err` (unsafe text, crisis language, malformed input) becomes the
//! `emergency_fallback` envelope with contacts and mandatory human
//! intervention. A triage request is never answered with a generic error.

use careguard_core::{
    Decision, Domain, EmergencyAssessment, EmergencyRequest, Result, SeverityLevel,
    ValidationResult, Violation,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::definition::{EmergencyRules, LengthBounds};
use crate::guard::{Guard, GuardInfo};
use crate::scanner::{SafetyScanner, TermMatcher};

/// Keyword-based severity assessment for triage text
pub struct EmergencyClassifier {
    scanner: Arc<SafetyScanner>,
    bounds: LengthBounds,
    keywords: TermMatcher,
    crisis_keywords: TermMatcher,
    rules: EmergencyRules,
    contacts: Vec<String>,
}

impl EmergencyClassifier {
    pub fn new(
        scanner: Arc<SafetyScanner>,
        rules: &EmergencyRules,
        contacts: &[String],
    ) -> Result<Self> {
        Ok(Self {
            scanner,
            bounds: LengthBounds::new(rules.min_length, rules.max_length),
            keywords: TermMatcher::new(&rules.keywords)?,
            crisis_keywords: TermMatcher::new(&rules.crisis_keywords)?,
            rules: rules.clone(),
            contacts: contacts.to_vec(),
        })
    }

    /// Classify a triage request
    pub fn classify(&self, request: &EmergencyRequest) -> ValidationResult {
        let patient_id = request.patient_id();

        let decision = match self.assess(request) {
            Ok(assessment) => {
                info!(
                    domain = "emergency",
                    patient_id = %patient_id,
                    severity = %assessment.severity_level,
                    "Triage assessed, human review required"
                );
                Decision::triage(assessment)
            }
            Err(violation) => {
                warn!(
                    domain = "emergency",
                    patient_id = %patient_id,
                    reason = %violation,
                    "Triage escalated to emergency fallback"
                );
                self.escalate(&violation)
            }
        };

        ValidationResult::new(Domain::Emergency, decision)
    }

    /// Classify an untyped payload; malformed input escalates
    pub fn classify_payload(&self, payload: serde_json::Value) -> ValidationResult {
        match serde_json::from_value::<EmergencyRequest>(payload) {
            Ok(request) => self.classify(&request),
            Err(e) => {
                let violation =
                    Violation::EmergencyProcessing(format!("malformed triage input: {}", e));
                warn!(domain = "emergency", reason = %violation, "Triage escalated to emergency fallback");
                ValidationResult::new(Domain::Emergency, self.escalate(&violation))
            }
        }
    }

    fn assess(&self, request: &EmergencyRequest) -> std::result::Result<EmergencyAssessment, Violation> {
        // Any safety failure counts as maximal risk, whatever its severity.
        if let Some(violation) = self.scanner.scan(&request.symptoms, self.bounds).violation() {
            return Err(violation);
        }

        if let Some(term) = self.crisis_keywords.first_match(&request.symptoms) {
            return Err(Violation::EmergencyProcessing(format!(
                "crisis language requires immediate human intervention: {}",
                term
            )));
        }

        let matched_keyword = self.keywords.first_match(&request.symptoms).map(str::to_string);
        let severity = if matched_keyword.is_some() {
            SeverityLevel::Immediate
        } else {
            SeverityLevel::Urgent
        };

        let recommendation = match severity {
            SeverityLevel::Immediate => &self.rules.immediate_recommendation,
            SeverityLevel::Urgent => &self.rules.urgent_recommendation,
        };

        Ok(EmergencyAssessment::new(severity, recommendation.clone(), &self.contacts)
            .with_matched_keyword(matched_keyword)
            .with_reported_severity(self.recognised_hint(request.severity_hint.as_deref())))
    }

    fn recognised_hint(&self, hint: Option<&str>) -> Option<String> {
        let hint = hint?.trim().to_lowercase();
        self.rules.severity_levels.contains(&hint).then_some(hint)
    }

    fn escalate(&self, violation: &Violation) -> Decision {
        Decision::emergency_fallback(
            violation.to_string(),
            self.rules.fallback_message.clone(),
            &self.contacts,
        )
    }

    /// Configured emergency keywords
    pub fn keywords(&self) -> &[String] {
        self.keywords.terms()
    }
}

impl Guard for EmergencyClassifier {
    fn name(&self) -> &str {
        "emergency_triage_guard"
    }

    fn domain(&self) -> Domain {
        Domain::Emergency
    }

    fn check(&self, payload: serde_json::Value) -> ValidationResult {
        self.classify_payload(payload)
    }

    fn describe(&self) -> GuardInfo {
        GuardInfo::new(
            self.name(),
            Domain::Emergency,
            "High-security emergency triage validation",
            &["safety_scan", "crisis_language", "emergency_keywords", "fallback_escalation"],
        )
    }
}
