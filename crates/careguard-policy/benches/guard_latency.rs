//! Latency benchmarks for the per-domain guards
//!
//! Every guard is a bounded scan over short text, so a single validation
//! should stay well under a millisecond.
//!
//! Run with: cargo bench -p careguard-policy

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;

use careguard_core::{ChatRequest, EmergencyRequest, PatientInfo};
use careguard_policy::{GuardDefinition, GuardRegistry};

fn registry() -> GuardRegistry {
    GuardRegistry::new(GuardDefinition::default()).expect("Failed to build guard registry")
}

/// Benchmark the chat guard over clean, blocked and long replies
fn benchmark_chat_guard(c: &mut Criterion) {
    let registry = registry();
    let long_reply = "Sua consulta de limpeza está confirmada para amanhã às 14h. ".repeat(15);

    let test_cases = vec![
        ("short_clean", "Olá! Como posso ajudar?".to_string()),
        ("blocked_term", "Você é um idiota".to_string()),
        ("human_handoff", "This sounds urgent, a person will call you".to_string()),
        ("long_clean", long_reply),
    ];

    let mut group = c.benchmark_group("Chat_Guard");
    group.sample_size(100);

    for (name, text) in test_cases {
        let request = ChatRequest::new(text);
        group.bench_with_input(BenchmarkId::new("validate", name), &request, |b, request| {
            b.iter(|| registry.chat().validate(black_box(request)))
        });
    }

    group.finish();
}

/// Benchmark triage classification, including the escalation path
fn benchmark_emergency_classifier(c: &mut Criterion) {
    let registry = registry();

    let test_cases = vec![
        ("keyword_immediate", "Dor de dente muito forte e inchaço no rosto"),
        ("no_keyword_urgent", "Sensibilidade ao frio no molar"),
        ("crisis_fallback", "Não aguento mais, quero morrer"),
    ];

    let mut group = c.benchmark_group("Emergency_Classifier");
    group.sample_size(100);

    for (name, symptoms) in test_cases {
        let request = EmergencyRequest::new(symptoms, PatientInfo::new());
        group.bench_with_input(BenchmarkId::new("classify", name), &request, |b, request| {
            b.iter(|| registry.emergency().classify(black_box(request)))
        });
    }

    group.finish();
}

/// Benchmark untyped dispatch, which includes payload deserialization
fn benchmark_dispatch(c: &mut Criterion) {
    let registry = registry();
    let appointment = json!({
        "patient_name": "João Silva",
        "contact_phone": "(35) 99999-9999",
        "preferred_date": "2025-06-15",
        "preferred_time": "14:00",
        "service_type": "limpeza",
        "urgency_level": "routine"
    });

    c.bench_function("dispatch_appointment", |b| {
        b.iter(|| registry.dispatch(black_box("appointment"), appointment.clone()))
    });
}

criterion_group!(
    benches,
    benchmark_chat_guard,
    benchmark_emergency_classifier,
    benchmark_dispatch
);
criterion_main!(benches);
