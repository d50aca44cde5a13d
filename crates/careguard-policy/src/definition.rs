//! Guard definitions (the ruleset)
//!
//! A [`GuardDefinition`] holds every threshold, choice set and lookup table
//! the guards use. It is loaded once, validated, and then shared read-only
//! behind an `Arc` by all validators. Rulesets are YAML; every section falls
//! back to the built-in defaults so a file only needs to name what it
//! overrides.

use careguard_core::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Built-in ruleset variants, selected at construction time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RulesetProfile {
    /// Chat replies of 5..=1000 characters
    #[default]
    Standard,
    /// Chat replies of 10..=1000 characters
    Strict,
}

impl FromStr for RulesetProfile {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "strict" => Ok(Self::Strict),
            other => Err(format!(
                "unknown ruleset profile '{}' (expected standard or strict)",
                other
            )),
        }
    }
}

impl fmt::Display for RulesetProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => f.write_str("standard"),
            Self::Strict => f.write_str("strict"),
        }
    }
}

/// Inclusive character-count bounds for a safety scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthBounds {
    /// Minimum trimmed length
    pub min: usize,
    /// Maximum raw length
    pub max: usize,
}

impl LengthBounds {
    pub fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }
}

/// Complete ruleset for all four domains
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardDefinition {
    /// Ruleset version label
    #[serde(default = "default_version")]
    pub version: String,

    /// Terms that make any content unsafe (case-insensitive substring)
    #[serde(default = "default_blocked_terms")]
    pub blocked_terms: Vec<String>,

    /// Contacts attached to immediate triage results and escalations
    #[serde(default = "default_emergency_contacts")]
    pub emergency_contacts: Vec<String>,

    #[serde(default)]
    pub chat: ChatRules,

    #[serde(default)]
    pub appointment: AppointmentRules,

    #[serde(default)]
    pub emergency: EmergencyRules,

    #[serde(default)]
    pub clinical: ClinicalRules,
}

/// Chat guard rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatRules {
    pub min_length: usize,
    pub max_length: usize,

    /// Words that route a safe reply to a human
    pub human_indicators: Vec<String>,

    /// Words that lower the safety score
    pub caution_terms: Vec<String>,
    pub caution_penalty: f64,

    /// Replies shorter than this (in characters) are penalised
    pub short_message_chars: usize,
    pub short_message_penalty: f64,

    /// Pre-approved reply shown instead of rejected content
    pub fallback_message: String,
}

impl Default for ChatRules {
    fn default() -> Self {
        Self {
            min_length: 5,
            max_length: 1000,
            human_indicators: strings(&["emergency", "pain", "blood", "urgent"]),
            caution_terms: strings(&["urgent", "emergency"]),
            caution_penalty: 0.2,
            short_message_chars: 10,
            short_message_penalty: 0.3,
            fallback_message: "Desculpe, não posso processar sua solicitação no momento. \
                               Um atendente humano entrará em contato em breve."
                .to_string(),
        }
    }
}

/// A bookable service and its expected duration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRule {
    pub name: String,
    pub duration_minutes: u32,
}

/// An urgency level and the priority it maps to (1-5)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrgencyRule {
    pub name: String,
    pub priority: u8,
}

/// Appointment policy rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppointmentRules {
    pub services: Vec<ServiceRule>,
    pub urgency_levels: Vec<UrgencyRule>,

    /// Urgency value that short-circuits into an emergency appointment
    pub emergency_urgency: String,
    pub emergency_response_time: String,

    pub default_priority: u8,
    pub default_duration_minutes: u32,

    pub name_min_length: usize,
    pub name_max_length: usize,
    pub symptoms_max_length: usize,
    pub phone_pattern: String,
}

impl Default for AppointmentRules {
    fn default() -> Self {
        let services = [
            ("consulta-rotina", 30),
            ("limpeza", 60),
            ("obturação", 45),
            ("canal", 90),
            ("extração", 30),
            ("ortodontia", 45),
            ("implante", 120),
            ("prótese", 60),
            ("clareamento", 90),
            ("emergência", 30),
        ];
        let urgency_levels = [("emergency", 5), ("urgent", 4), ("routine", 2)];

        Self {
            services: services
                .iter()
                .map(|(name, duration_minutes)| ServiceRule {
                    name: name.to_string(),
                    duration_minutes: *duration_minutes,
                })
                .collect(),
            urgency_levels: urgency_levels
                .iter()
                .map(|(name, priority)| UrgencyRule {
                    name: name.to_string(),
                    priority: *priority,
                })
                .collect(),
            emergency_urgency: "emergency".to_string(),
            emergency_response_time: "15 minutes".to_string(),
            default_priority: 2,
            default_duration_minutes: 45,
            name_min_length: 2,
            name_max_length: 100,
            symptoms_max_length: 500,
            phone_pattern: r"^\+?[\d\s\-\(\)]{10,}$".to_string(),
        }
    }
}

impl AppointmentRules {
    /// Configured service names, in ruleset order
    pub fn service_names(&self) -> Vec<String> {
        self.services.iter().map(|s| s.name.clone()).collect()
    }

    /// Configured urgency names, in ruleset order
    pub fn urgency_names(&self) -> Vec<String> {
        self.urgency_levels.iter().map(|u| u.name.clone()).collect()
    }

    /// Priority for a (lower-cased) urgency level
    pub fn priority_for(&self, urgency: &str) -> u8 {
        self.urgency_levels
            .iter()
            .find(|u| u.name == urgency)
            .map(|u| u.priority)
            .unwrap_or(self.default_priority)
    }

    /// Duration for a (lower-cased) service type
    pub fn duration_for(&self, service: &str) -> u32 {
        self.services
            .iter()
            .find(|s| s.name == service)
            .map(|s| s.duration_minutes)
            .unwrap_or(self.default_duration_minutes)
    }
}

/// Emergency triage rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmergencyRules {
    pub min_length: usize,
    pub max_length: usize,

    /// Any match forces `immediate` severity
    pub keywords: Vec<String>,

    /// Any match forces the escalation path
    pub crisis_keywords: Vec<String>,

    /// Recognised values for a caller's severity hint
    pub severity_levels: Vec<String>,

    pub immediate_recommendation: String,
    pub urgent_recommendation: String,

    /// Fixed caregiver-facing message on the escalation path
    pub fallback_message: String,
}

impl Default for EmergencyRules {
    fn default() -> Self {
        Self {
            min_length: 5,
            max_length: 2000,
            keywords: strings(&[
                "dor",
                "sangramento",
                "trauma",
                "fratura",
                "inchaço",
                "febre",
                "pus",
                "dente quebrado",
                "acidente",
            ]),
            crisis_keywords: strings(&[
                "suicídio",
                "morte",
                "matar",
                "morrer",
                "acabar com tudo",
                "não aguento mais",
                "quero morrer",
            ]),
            severity_levels: strings(&["immediate", "urgent", "non-urgent"]),
            immediate_recommendation: "Procure atendimento médico imediato. Esta situação \
                                       requer avaliação urgente por um profissional."
                .to_string(),
            urgent_recommendation: "Recomendamos agendar uma consulta o mais breve possível \
                                    para avaliação adequada."
                .to_string(),
            fallback_message: "Por favor, procure atendimento médico imediato ou ligue para \
                               o serviço de emergência."
                .to_string(),
        }
    }
}

/// Clinical content rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicalRules {
    pub min_length: usize,
    pub max_length: usize,

    /// Vocabulary for the heuristic accuracy score
    pub vocabulary: Vec<String>,

    /// Matches needed for a full score
    pub score_denominator: usize,
}

impl Default for ClinicalRules {
    fn default() -> Self {
        Self {
            min_length: 10,
            max_length: 2000,
            vocabulary: strings(&["dental", "tooth", "gum", "oral", "treatment", "procedure"]),
            score_denominator: 3,
        }
    }
}

impl Default for GuardDefinition {
    fn default() -> Self {
        Self {
            version: default_version(),
            blocked_terms: default_blocked_terms(),
            emergency_contacts: default_emergency_contacts(),
            chat: ChatRules::default(),
            appointment: AppointmentRules::default(),
            emergency: EmergencyRules::default(),
            clinical: ClinicalRules::default(),
        }
    }
}

impl GuardDefinition {
    /// Built-in ruleset for a profile
    pub fn for_profile(profile: RulesetProfile) -> Self {
        let mut definition = Self::default();
        if profile == RulesetProfile::Strict {
            definition.chat.min_length = 10;
        }
        definition
    }

    /// Load a ruleset from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let definition: Self = serde_yaml::from_str(yaml)?;
        definition.validate()?;
        Ok(definition)
    }

    /// Load a ruleset from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("failed to read ruleset {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }

    /// Render the ruleset as YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn chat_bounds(&self) -> LengthBounds {
        LengthBounds::new(self.chat.min_length, self.chat.max_length)
    }

    pub fn emergency_bounds(&self) -> LengthBounds {
        LengthBounds::new(self.emergency.min_length, self.emergency.max_length)
    }

    pub fn clinical_bounds(&self) -> LengthBounds {
        LengthBounds::new(self.clinical.min_length, self.clinical.max_length)
    }

    /// Reject rulesets the guards cannot run with
    pub fn validate(&self) -> Result<()> {
        for (section, bounds) in [
            ("chat", self.chat_bounds()),
            ("emergency", self.emergency_bounds()),
            ("clinical", self.clinical_bounds()),
        ] {
            if bounds.min > bounds.max {
                return Err(Error::config(format!(
                    "{}: min_length {} exceeds max_length {}",
                    section, bounds.min, bounds.max
                )));
            }
        }

        let appointment = &self.appointment;
        if appointment.services.is_empty() {
            return Err(Error::config("appointment: no services configured"));
        }
        if appointment.urgency_levels.is_empty() {
            return Err(Error::config("appointment: no urgency levels configured"));
        }
        if let Some(level) = appointment
            .urgency_levels
            .iter()
            .find(|u| !(1..=5).contains(&u.priority))
        {
            return Err(Error::config(format!(
                "appointment: priority {} for '{}' is outside 1-5",
                level.priority, level.name
            )));
        }
        if !(1..=5).contains(&appointment.default_priority) {
            return Err(Error::config(format!(
                "appointment: default priority {} is outside 1-5",
                appointment.default_priority
            )));
        }
        if appointment.name_min_length > appointment.name_max_length {
            return Err(Error::config(
                "appointment: name_min_length exceeds name_max_length",
            ));
        }
        Regex::new(&appointment.phone_pattern).map_err(|e| {
            Error::config(format!("appointment: invalid phone pattern: {}", e))
        })?;

        if self.emergency_contacts.is_empty() {
            return Err(Error::config("emergency_contacts must not be empty"));
        }
        if self.clinical.score_denominator == 0 {
            return Err(Error::config("clinical: score_denominator must be positive"));
        }

        Ok(())
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_version() -> String {
    "2.0.0".to_string()
}

fn default_blocked_terms() -> Vec<String> {
    strings(&[
        "merda", "porra", "caralho", "buceta", "puta", "viado", "cu", "fdp", "desgraça",
        "idiota", "burro", "estúpido",
    ])
}

fn default_emergency_contacts() -> Vec<String> {
    strings(&["(35) 99869-5479", "192", "193"])
}
