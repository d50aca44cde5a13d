//! End-to-end scenarios through the registry, checked on the serialized
//! envelope callers actually receive.

use careguard_core::ValidationStatus;
use careguard_policy::{GuardDefinition, GuardRegistry, RulesetProfile};
use serde_json::{json, Value};
use std::io::Write;
use std::path::PathBuf;

fn registry() -> GuardRegistry {
    GuardRegistry::new(GuardDefinition::default()).unwrap()
}

fn envelope(domain: &str, payload: Value) -> Value {
    serde_json::to_value(registry().dispatch(domain, payload)).unwrap()
}

fn shipped_ruleset() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../rulesets/default.yaml")
}

#[test]
fn routine_cleaning_gets_priority_and_duration() {
    let body = envelope(
        "appointment",
        json!({
            "patient_name": "João Silva",
            "contact_phone": "(35) 99999-9999",
            "preferred_date": "2025-06-15",
            "preferred_time": "14:00",
            "service_type": "limpeza",
            "urgency_level": "routine",
            "symptoms": "Limpeza preventiva"
        }),
    );

    assert_eq!(body["status"], "valid");
    assert_eq!(body["domain"], "appointment");
    assert_eq!(body["priority_level"], 2);
    assert_eq!(body["estimated_duration_minutes"], 60);
    assert_eq!(body["validated_appointment"]["service_type"], "limpeza");
    assert!(body["timestamp"].is_string());
}

#[test]
fn insulting_chat_reply_is_replaced() {
    let body = envelope("chat", json!({"message": "Você é um idiota", "intent": "general"}));

    assert_eq!(body["status"], "invalid");
    assert_eq!(body["requires_human"], true);
    assert_eq!(body["original_response"], "Você é um idiota");
    assert!(body["fallback_response"].as_str().unwrap().contains("atendente humano"));
}

#[test]
fn tiny_clinical_content_is_too_short() {
    let body = envelope("clinical", json!({"content": "Test", "content_type": "general"}));

    assert_eq!(body["status"], "invalid");
    assert_eq!(body["requires_medical_review"], true);
    assert!(body["error"].as_str().unwrap().contains("too short"));
}

#[test]
fn toothache_is_immediate_triage() {
    let body = envelope(
        "emergency",
        json!({
            "symptoms": "Dor de dente muito forte",
            "patient_info": {"id": "test_patient_123", "age": 41},
            "severity_assessment": "urgent"
        }),
    );

    assert_eq!(body["status"], "valid");
    assert_eq!(body["human_review_required"], true);
    assert_eq!(body["immediate_action_required"], true);
    assert_eq!(body["triage_result"]["severity_level"], "immediate");
    assert_eq!(body["triage_result"]["reported_severity"], "urgent");
    assert_eq!(body["triage_result"]["emergency_contacts"].as_array().unwrap().len(), 3);
}

#[test]
fn emergency_appointment_is_escalated() {
    let body = envelope(
        "appointment",
        json!({
            "patient_name": "Ana Lima",
            "contact_phone": "35 99869 5479",
            "preferred_date": "2025-06-16",
            "preferred_time": "08:15",
            "service_type": "tratamento-desconhecido",
            "urgency_level": "Emergency"
        }),
    );

    assert_eq!(body["status"], "emergency_appointment");
    assert_eq!(body["immediate_booking"], true);
    assert_eq!(body["human_confirmation_required"], true);
    assert_eq!(body["emergency_contacts_notified"], true);
    assert_eq!(body["estimated_response_time"], "15 minutes");
}

#[test]
fn unsafe_triage_input_is_never_a_generic_error() {
    for payload in [
        json!({"symptoms": "ai", "patient_info": {}}),
        json!({"symptoms": "PORRA, sangramento", "patient_info": {}}),
        json!({"symptoms": "quero morrer", "patient_info": {}}),
        json!({"patient_info": {}}),
        json!(null),
    ] {
        let body = envelope("emergency", payload);
        assert_eq!(body["status"], "emergency_fallback");
        assert_eq!(body["automatic_escalation"], true);
        assert_eq!(body["immediate_human_required"], true);
        assert_eq!(body["human_review_required"], true);
        assert!(!body["emergency_contacts"].as_array().unwrap().is_empty());
    }
}

#[test]
fn unknown_domain_names_the_tag() {
    let body = envelope("billing", json!({"amount": 10}));
    assert_eq!(body["status"], "error");
    assert_eq!(body["error"], "Unknown response type: billing");
    assert_eq!(body["fallback_required"], true);
    assert!(body.get("domain").is_none());
}

#[test]
fn strict_profile_rejects_short_chat() {
    let strict = GuardRegistry::new(GuardDefinition::for_profile(RulesetProfile::Strict)).unwrap();
    let standard = registry();

    let result = strict.dispatch("chat", json!({"message": "Olá!!"}));
    assert_eq!(result.status, ValidationStatus::Invalid);

    let result = standard.dispatch("chat", json!({"message": "Olá!!"}));
    assert_eq!(result.status, ValidationStatus::Valid);
}

#[test]
fn shipped_ruleset_matches_builtin_defaults() {
    let loaded = GuardDefinition::from_file(shipped_ruleset()).unwrap();
    assert_eq!(loaded, GuardDefinition::default());
}

#[test]
fn ruleset_file_overrides_rules() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
blocked_terms: [grosseria]
appointment:
  services:
    - {{ name: avaliação, duration_minutes: 20 }}
  urgency_levels:
    - {{ name: emergency, priority: 5 }}
    - {{ name: routine, priority: 1 }}
"#
    )
    .unwrap();

    let registry = GuardRegistry::from_file(file.path()).unwrap();
    assert_eq!(registry.guard_config().services, vec!["avaliação"]);

    let result = registry.dispatch("chat", json!({"message": "Que grosseria sem tamanho"}));
    assert_eq!(result.status, ValidationStatus::Invalid);

    let result = registry.dispatch("chat", json!({"message": "Você é um idiota"}));
    assert_eq!(result.status, ValidationStatus::Valid);
}

#[test]
fn invalid_ruleset_file_fails_to_load() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "chat:\n  min_length: 900\n  max_length: 10").unwrap();
    assert!(GuardRegistry::from_file(file.path()).is_err());
}
