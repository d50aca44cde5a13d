//! Clinical and informational content validation
//!
//! The accuracy score is a term-overlap heuristic: the share of the
//! configured vocabulary present in the content, with a capped denominator.
//! It says nothing about medical correctness.

use careguard_core::{ClinicalRequest, Decision, Domain, Result, ValidationResult};
use std::sync::Arc;
use tracing::debug;

use crate::definition::{ClinicalRules, LengthBounds};
use crate::guard::{Guard, GuardInfo};
use crate::scanner::{SafetyScanner, TermMatcher};

/// Validates clinical text shown to patients
pub struct ClinicalContentValidator {
    scanner: Arc<SafetyScanner>,
    bounds: LengthBounds,
    vocabulary: TermMatcher,
    score_denominator: usize,
}

impl ClinicalContentValidator {
    pub fn new(scanner: Arc<SafetyScanner>, rules: &ClinicalRules) -> Result<Self> {
        Ok(Self {
            scanner,
            bounds: LengthBounds::new(rules.min_length, rules.max_length),
            vocabulary: TermMatcher::new(&rules.vocabulary)?,
            score_denominator: rules.score_denominator,
        })
    }

    pub fn validate(&self, request: &ClinicalRequest) -> ValidationResult {
        let verdict = self.scanner.scan(&request.content, self.bounds);

        let decision = if verdict.is_safe {
            Decision::ClinicalAccepted {
                validated_content: request.content.clone(),
                content_type: request.content_type.clone(),
                target_audience: request.target_audience.clone(),
                medical_disclaimer_required: true,
                accuracy_score: self.accuracy_score(&request.content),
            }
        } else {
            Decision::ClinicalRejected {
                error: verdict.reason,
                requires_medical_review: true,
            }
        };

        let result = ValidationResult::new(Domain::Clinical, decision);
        debug!(
            domain = "clinical",
            status = %result.status,
            content_type = %request.content_type,
            "Clinical content evaluated"
        );
        result
    }

    /// Vocabulary overlap in [0, 1]
    pub fn accuracy_score(&self, text: &str) -> f64 {
        let denominator = self.score_denominator.min(self.vocabulary.terms().len());
        if denominator == 0 {
            return 0.0;
        }
        let found = self.vocabulary.count_distinct(text);
        f64::min(1.0, found as f64 / denominator as f64)
    }
}

impl Guard for ClinicalContentValidator {
    fn name(&self) -> &str {
        "clinical_content_guard"
    }

    fn domain(&self) -> Domain {
        Domain::Clinical
    }

    fn check(&self, payload: serde_json::Value) -> ValidationResult {
        match serde_json::from_value::<ClinicalRequest>(payload) {
            Ok(request) => self.validate(&request),
            Err(e) => ValidationResult::new(
                Domain::Clinical,
                Decision::ClinicalRejected {
                    error: format!("malformed clinical request: {}", e),
                    requires_medical_review: true,
                },
            ),
        }
    }

    fn describe(&self) -> GuardInfo {
        GuardInfo::new(
            self.name(),
            Domain::Clinical,
            "Validates clinical and medical information",
            &["safety_scan", "medical_disclaimer", "accuracy_score"],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::GuardDefinition;
    use careguard_core::ValidationStatus;

    fn validator() -> ClinicalContentValidator {
        let definition = GuardDefinition::default();
        let scanner = Arc::new(SafetyScanner::new(&definition.blocked_terms).unwrap());
        ClinicalContentValidator::new(scanner, &definition.clinical).unwrap()
    }

    #[test]
    fn test_four_chars_is_too_short() {
        let result = validator().validate(&ClinicalRequest::new("Test"));
        assert_eq!(result.status, ValidationStatus::Invalid);
        assert!(result.decision.error().unwrap().contains("too short"));
        assert!(result.requires_human_review());
    }

    #[test]
    fn test_safe_content_always_needs_disclaimer() {
        let result = validator().validate(&ClinicalRequest::new(
            "Brushing twice a day keeps teeth healthy and prevents gum disease.",
        ));

        assert_eq!(result.status, ValidationStatus::Valid);
        match result.decision {
            Decision::ClinicalAccepted {
                medical_disclaimer_required,
                accuracy_score,
                target_audience,
                ..
            } => {
                assert!(medical_disclaimer_required);
                assert_eq!(target_audience, "patients");
                // "gum" only
                assert!((accuracy_score - 1.0 / 3.0).abs() < 1e-9);
            }
            other => panic!("Wrong decision: {:?}", other),
        }
    }

    #[test]
    fn test_accuracy_score_is_capped() {
        let score = validator().accuracy_score("Dental treatment: the tooth procedure for oral gum health");
        assert_eq!(score, 1.0);
        assert_eq!(validator().accuracy_score("Hydration matters"), 0.0);
    }

    #[test]
    fn test_small_vocabulary_shrinks_denominator() {
        let rules = ClinicalRules {
            vocabulary: vec!["implant".to_string()],
            ..ClinicalRules::default()
        };
        let scanner = Arc::new(SafetyScanner::new(&[]).unwrap());
        let validator = ClinicalContentValidator::new(scanner, &rules).unwrap();
        assert_eq!(validator.accuracy_score("Implant aftercare instructions"), 1.0);
    }

    #[test]
    fn test_malformed_payload_needs_review() {
        let result = validator().check(serde_json::json!({"content_type": "faq"}));
        assert_eq!(result.status, ValidationStatus::Invalid);
        assert!(result.requires_human_review());
    }
}
