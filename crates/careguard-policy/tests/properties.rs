use careguard_core::{
    AppointmentRequest, ChatRequest, Decision, EmergencyRequest, PatientInfo, SeverityLevel,
    ValidationStatus,
};
use careguard_policy::{GuardDefinition, GuardRegistry};
use proptest::prelude::*;
use proptest::sample::select;

fn registry() -> GuardRegistry {
    GuardRegistry::new(GuardDefinition::default()).unwrap()
}

fn appointment(service_type: String, urgency_level: &str) -> AppointmentRequest {
    AppointmentRequest {
        patient_name: "Maria Souza".to_string(),
        contact_phone: "+55 35 99869-5479".to_string(),
        preferred_date: "2025-09-01".to_string(),
        preferred_time: "9:30".to_string(),
        service_type,
        urgency_level: urgency_level.to_string(),
        symptoms: None,
    }
}

proptest! {
    /// Property: Validation is a pure function of input and ruleset
    #[test]
    fn prop_chat_validation_is_idempotent(message in ".{0,120}") {
        let registry = registry();
        let request = ChatRequest::new(message);

        let first = registry.chat().validate(&request);
        let second = registry.chat().validate(&request);
        prop_assert_eq!(first.status, second.status);
        prop_assert_eq!(first.decision, second.decision);
    }

    /// Property: A blocked term anywhere makes content invalid and is named
    #[test]
    fn prop_blocked_term_is_reported(
        term in select(GuardDefinition::default().blocked_terms),
        prefix in "[0-9 ]{0,20}",
        suffix in "[0-9 ]{0,20}",
        shout in any::<bool>(),
    ) {
        let shown = if shout { term.to_uppercase() } else { term.clone() };
        let message = format!("{}{}{}", prefix, shown, suffix);
        let result = registry().chat().validate(&ChatRequest::new(message));

        prop_assert_eq!(result.status, ValidationStatus::Invalid);
        let error = result.decision.error().unwrap_or_default().to_string();
        prop_assert!(error.contains(&term), "error {:?} should name {:?}", error, term);
    }

    /// Property: Safety score stays within [0, 1]
    #[test]
    fn prop_safety_score_is_bounded(message in ".{0,60}") {
        let score = registry().chat().safety_score(&message);
        prop_assert!((0.0..=1.0).contains(&score));
    }

    /// Property: Emergency urgency escalates whatever the service type
    #[test]
    fn prop_emergency_urgency_short_circuits(
        service in "[a-z]{1,12}",
        urgency in select(vec!["emergency", "EMERGENCY", " Emergency "]),
    ) {
        let result = registry().appointment().validate(&appointment(service, urgency));

        prop_assert_eq!(result.status, ValidationStatus::EmergencyAppointment);
        prop_assert!(result.requires_human_review());
    }

    /// Property: Any emergency keyword forces immediate severity
    #[test]
    fn prop_keyword_forces_immediate(
        keyword in select(GuardDefinition::default().emergency.keywords),
        detail in "[0-9 ]{0,30}",
    ) {
        let symptoms = format!("Paciente relata {} {}", keyword, detail);
        let result = registry().emergency().classify(&EmergencyRequest::new(symptoms, PatientInfo::new()));

        prop_assert_eq!(result.status, ValidationStatus::Valid);
        match &result.decision {
            Decision::Triage { triage_result, human_review_required, .. } => {
                prop_assert_eq!(triage_result.severity_level, SeverityLevel::Immediate);
                prop_assert!(*human_review_required);
                prop_assert!(!result.decision.emergency_contacts().is_empty());
            }
            other => prop_assert!(false, "unexpected decision {:?}", other),
        }
    }

    /// Property: Triage never answers without escalation metadata
    #[test]
    fn prop_triage_always_requires_human(symptoms in ".{0,200}") {
        let result = registry().emergency().classify(&EmergencyRequest::new(symptoms, PatientInfo::new()));

        prop_assert!(result.requires_human_review());
        match result.status {
            ValidationStatus::Valid => {}
            ValidationStatus::EmergencyFallback => {
                prop_assert!(!result.decision.emergency_contacts().is_empty());
            }
            other => prop_assert!(false, "unexpected status {:?}", other),
        }
    }
}
