//! Conversational reply guard

use careguard_core::{ChatRequest, Decision, Domain, Result, ValidationResult};
use std::sync::Arc;
use tracing::debug;

use crate::definition::{ChatRules, LengthBounds};
use crate::guard::{Guard, GuardInfo};
use crate::scanner::{SafetyScanner, TermMatcher};

/// Screens chatbot replies before they reach a patient
pub struct ChatGuard {
    scanner: Arc<SafetyScanner>,
    bounds: LengthBounds,
    human_indicators: TermMatcher,
    caution_terms: TermMatcher,
    rules: ChatRules,
}

impl ChatGuard {
    pub fn new(scanner: Arc<SafetyScanner>, rules: &ChatRules) -> Result<Self> {
        Ok(Self {
            scanner,
            bounds: LengthBounds::new(rules.min_length, rules.max_length),
            human_indicators: TermMatcher::new(&rules.human_indicators)?,
            caution_terms: TermMatcher::new(&rules.caution_terms)?,
            rules: rules.clone(),
        })
    }

    /// Validate a chat reply
    pub fn validate(&self, request: &ChatRequest) -> ValidationResult {
        let verdict = self.scanner.scan(&request.message, self.bounds);

        let decision = if verdict.is_safe {
            Decision::ChatAccepted {
                validated_response: request.message.clone(),
                intent: request.intent.clone(),
                requires_human: self.human_indicators.is_match(&request.message),
                safety_score: self.safety_score(&request.message),
            }
        } else {
            self.reject(verdict.reason, request.message.clone())
        };

        let result = ValidationResult::new(Domain::Chat, decision);
        debug!(
            domain = "chat",
            status = %result.status,
            intent = %request.intent,
            "Chat reply evaluated"
        );
        result
    }

    /// Deterministic heuristic in [0, 1]
    pub fn safety_score(&self, text: &str) -> f64 {
        let mut score = 1.0;
        if self.caution_terms.is_match(text) {
            score -= self.rules.caution_penalty;
        }
        if text.chars().count() < self.rules.short_message_chars {
            score -= self.rules.short_message_penalty;
        }
        f64::max(0.0, score)
    }

    fn reject(&self, error: String, original_response: String) -> Decision {
        Decision::ChatRejected {
            error,
            original_response,
            fallback_response: self.rules.fallback_message.clone(),
            requires_human: true,
        }
    }
}

impl Guard for ChatGuard {
    fn name(&self) -> &str {
        "dental_chat_guard"
    }

    fn domain(&self) -> Domain {
        Domain::Chat
    }

    fn check(&self, payload: serde_json::Value) -> ValidationResult {
        match serde_json::from_value::<ChatRequest>(payload) {
            Ok(request) => self.validate(&request),
            Err(e) => ValidationResult::new(
                Domain::Chat,
                self.reject(format!("malformed chat request: {}", e), String::new()),
            ),
        }
    }

    fn describe(&self) -> GuardInfo {
        GuardInfo::new(
            self.name(),
            Domain::Chat,
            "Validates chatbot replies for safety and professionalism",
            &["safety_scan", "human_handoff", "safety_score"],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{GuardDefinition, RulesetProfile};
    use careguard_core::ValidationStatus;

    fn guard() -> ChatGuard {
        guard_for(GuardDefinition::default())
    }

    fn guard_for(definition: GuardDefinition) -> ChatGuard {
        let scanner = Arc::new(SafetyScanner::new(&definition.blocked_terms).unwrap());
        ChatGuard::new(scanner, &definition.chat).unwrap()
    }

    #[test]
    fn test_replies_over_1000_chars_rejected_in_every_profile() {
        for profile in [RulesetProfile::Standard, RulesetProfile::Strict] {
            let guard = guard_for(GuardDefinition::for_profile(profile));

            let at_limit = guard.validate(&ChatRequest::new("a".repeat(1000)));
            assert_eq!(at_limit.status, ValidationStatus::Valid, "{:?}", profile);

            let too_long = guard.validate(&ChatRequest::new("a".repeat(1001)));
            assert_eq!(too_long.status, ValidationStatus::Invalid, "{:?}", profile);
            assert!(too_long.requires_human_review());
        }
    }

    #[test]
    fn test_safe_reply_is_valid() {
        let request = ChatRequest::new("Olá! Posso ajudá-lo a agendar uma consulta. Qual serviço você precisa?")
            .with_intent("greeting");
        let result = guard().validate(&request);

        assert_eq!(result.status, ValidationStatus::Valid);
        match result.decision {
            Decision::ChatAccepted {
                requires_human,
                safety_score,
                intent,
                ..
            } => {
                assert!(!requires_human);
                assert_eq!(safety_score, 1.0);
                assert_eq!(intent, "greeting");
            }
            other => panic!("Wrong decision: {:?}", other),
        }
    }

    #[test]
    fn test_blocked_term_returns_fallback() {
        let result = guard().validate(&ChatRequest::new("Você é um idiota"));

        assert_eq!(result.status, ValidationStatus::Invalid);
        match result.decision {
            Decision::ChatRejected {
                error,
                fallback_response,
                requires_human,
                ..
            } => {
                assert!(error.contains("idiota"));
                assert!(fallback_response.starts_with("Desculpe"));
                assert!(requires_human);
            }
            other => panic!("Wrong decision: {:?}", other),
        }
    }

    #[test]
    fn test_empty_reply_is_invalid() {
        let result = guard().validate(&ChatRequest::new(""));
        assert_eq!(result.status, ValidationStatus::Invalid);
        assert!(result.requires_human_review());
    }

    #[test]
    fn test_urgent_words_need_human_and_lower_score() {
        let result = guard().validate(&ChatRequest::new("This is an emergency, call the clinic"));
        match result.decision {
            Decision::ChatAccepted {
                requires_human,
                safety_score,
                ..
            } => {
                assert!(requires_human);
                assert!((safety_score - 0.8).abs() < 1e-9);
            }
            other => panic!("Wrong decision: {:?}", other),
        }
    }

    #[test]
    fn test_safety_score_floors_at_zero() {
        let mut rules = ChatRules::default();
        rules.caution_penalty = 0.9;
        let scanner = Arc::new(SafetyScanner::new(&[]).unwrap());
        let guard = ChatGuard::new(scanner, &rules).unwrap();

        assert_eq!(guard.safety_score("urgent"), 0.0);
        assert!((guard.safety_score("Hi there!") - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_malformed_payload_is_invalid() {
        let result = guard().check(serde_json::json!({"intent": "greeting"}));
        assert_eq!(result.status, ValidationStatus::Invalid);
        assert!(result.decision.error().unwrap().contains("message"));
    }
}
