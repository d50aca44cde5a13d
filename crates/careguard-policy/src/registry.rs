//! Guard registry: domain routing and composition

use careguard_core::{Domain, Result, ValidationRequest, ValidationResult};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::appointment::AppointmentPolicyValidator;
use crate::chat::ChatGuard;
use crate::clinical::ClinicalContentValidator;
use crate::definition::GuardDefinition;
use crate::emergency::EmergencyClassifier;
use crate::guard::{Guard, GuardInfo};
use crate::scanner::SafetyScanner;

/// Public view of the active appointment and triage configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuardConfigView {
    pub services: Vec<String>,
    pub urgency_levels: Vec<String>,
    pub emergency_keywords: Vec<String>,
}

/// Maps each domain to its guard.
///
/// Built once from a validated [`GuardDefinition`] and immutable afterwards;
/// hosts swap whole registries to reload rules.
pub struct GuardRegistry {
    definition: Arc<GuardDefinition>,
    chat: Arc<ChatGuard>,
    appointment: Arc<AppointmentPolicyValidator>,
    emergency: Arc<EmergencyClassifier>,
    clinical: Arc<ClinicalContentValidator>,
    guards: HashMap<Domain, Arc<dyn Guard>>,
}

impl GuardRegistry {
    /// Build every guard from a ruleset
    pub fn new(definition: GuardDefinition) -> Result<Self> {
        definition.validate()?;

        let scanner = Arc::new(SafetyScanner::new(&definition.blocked_terms)?);
        let chat = Arc::new(ChatGuard::new(scanner.clone(), &definition.chat)?);
        let appointment = Arc::new(AppointmentPolicyValidator::new(&definition.appointment)?);
        let emergency = Arc::new(EmergencyClassifier::new(
            scanner.clone(),
            &definition.emergency,
            &definition.emergency_contacts,
        )?);
        let clinical = Arc::new(ClinicalContentValidator::new(scanner, &definition.clinical)?);

        let mut guards: HashMap<Domain, Arc<dyn Guard>> = HashMap::new();
        guards.insert(Domain::Chat, chat.clone());
        guards.insert(Domain::Appointment, appointment.clone());
        guards.insert(Domain::Emergency, emergency.clone());
        guards.insert(Domain::Clinical, clinical.clone());

        info!(
            version = %definition.version,
            guards = guards.len(),
            blocked_terms = definition.blocked_terms.len(),
            "Guard registry initialized"
        );

        Ok(Self {
            definition: Arc::new(definition),
            chat,
            appointment,
            emergency,
            clinical,
            guards,
        })
    }

    /// Load a ruleset file and build the registry
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(GuardDefinition::from_file(path)?)
    }

    /// Validate a typed request
    pub fn validate(&self, request: &ValidationRequest) -> ValidationResult {
        debug!(domain = request.domain().as_str(), "Routing typed request");
        match request {
            ValidationRequest::Chat(r) => self.chat.validate(r),
            ValidationRequest::Appointment(r) => self.appointment.validate(r),
            ValidationRequest::Emergency(r) => self.emergency.classify(r),
            ValidationRequest::Clinical(r) => self.clinical.validate(r),
        }
    }

    /// Route an untyped payload by domain tag
    pub fn dispatch(&self, tag: &str, payload: serde_json::Value) -> ValidationResult {
        match tag.parse::<Domain>() {
            Ok(domain) => match self.guards.get(&domain) {
                Some(guard) => guard.check(payload),
                None => ValidationResult::unknown_domain(tag),
            },
            Err(_) => {
                warn!(tag = %tag, "Unknown domain tag");
                ValidationResult::unknown_domain(tag)
            }
        }
    }

    /// Guard serving `domain`
    pub fn guard(&self, domain: Domain) -> Option<Arc<dyn Guard>> {
        self.guards.get(&domain).cloned()
    }

    pub fn guard_config(&self) -> GuardConfigView {
        GuardConfigView {
            services: self.definition.appointment.service_names(),
            urgency_levels: self.definition.appointment.urgency_names(),
            emergency_keywords: self.emergency.keywords().to_vec(),
        }
    }

    /// Catalogue of active guards, in domain order
    pub fn describe_guards(&self) -> Vec<GuardInfo> {
        Domain::ALL
            .iter()
            .filter_map(|domain| self.guards.get(domain))
            .map(|guard| guard.describe())
            .collect()
    }

    pub fn definition(&self) -> &GuardDefinition {
        &self.definition
    }

    pub fn chat(&self) -> &ChatGuard {
        &self.chat
    }

    pub fn appointment(&self) -> &AppointmentPolicyValidator {
        &self.appointment
    }

    pub fn emergency(&self) -> &EmergencyClassifier {
        &self.emergency
    }

    pub fn clinical(&self) -> &ClinicalContentValidator {
        &self.clinical
    }

    /// Number of registered guards
    pub fn count(&self) -> usize {
        self.guards.len()
    }
}
