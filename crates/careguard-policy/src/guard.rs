//! Guard trait and common types

use careguard_core::{Domain, ValidationResult};
use serde::Serialize;

/// Trait for all domain guards.
///
/// Guards are synchronous: every check is a bounded scan over short strings
/// with no I/O, so there is nothing to await.
pub trait Guard: Send + Sync {
    /// Get the guard name
    fn name(&self) -> &str;

    /// Domain this guard serves
    fn domain(&self) -> Domain;

    /// Evaluate an untyped payload.
    ///
    /// Payloads that do not deserialize into the domain's request type are
    /// decided by the guard itself, never returned as errors.
    fn check(&self, payload: serde_json::Value) -> ValidationResult;

    /// Catalogue entry for this guard
    fn describe(&self) -> GuardInfo;
}

/// Catalogue entry describing a guard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuardInfo {
    pub name: String,
    pub domain: Domain,
    pub description: String,
    pub checks: Vec<String>,
}

impl GuardInfo {
    pub fn new(name: &str, domain: Domain, description: &str, checks: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            domain,
            description: description.to_string(),
            checks: checks.iter().map(|c| c.to_string()).collect(),
        }
    }
}
