//! CareGuard Policy Engine
//!
//! Per-domain guards for healthcare chatbot content:
//! - Chat replies (safety scan, human hand-off, safety score)
//! - Appointment booking (structure, emergency short-circuit, priority/duration)
//! - Emergency triage (keyword severity, fail-safe escalation)
//! - Clinical content (safety scan, disclaimer, vocabulary overlap)
//!
//! Rules are data: a [`GuardDefinition`] loaded from YAML or built from a
//! profile drives every guard, and [`GuardRegistry`] routes requests to them.

pub mod appointment;
pub mod chat;
pub mod clinical;
pub mod definition;
pub mod emergency;
pub mod guard;
pub mod registry;
pub mod scanner;

pub use appointment::AppointmentPolicyValidator;
pub use chat::ChatGuard;
pub use clinical::ClinicalContentValidator;
pub use definition::{
    AppointmentRules, ChatRules, ClinicalRules, EmergencyRules, GuardDefinition, LengthBounds,
    RulesetProfile, ServiceRule, UrgencyRule,
};
pub use emergency::EmergencyClassifier;
pub use guard::{Guard, GuardInfo};
pub use registry::{GuardConfigView, GuardRegistry};
pub use scanner::{SafetyScanner, ScanVerdict, TermMatcher};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::definition::{GuardDefinition, RulesetProfile};
    pub use crate::guard::{Guard, GuardInfo};
    pub use crate::registry::{GuardConfigView, GuardRegistry};
    pub use crate::scanner::{SafetyScanner, ScanVerdict};
}
