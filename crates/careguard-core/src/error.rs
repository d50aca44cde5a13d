//! Error types for CareGuard
//!
//! Two families live here. [`Error`] is the operational error returned by
//! configuration loading and host I/O. [`Violation`] is the rule-level
//! taxonomy a guard produces before it is folded into a
//! [`ValidationResult`](crate::ValidationResult); violations never escape a
//! validator as `Err`.

use serde::{Deserialize, Serialize};

/// Result type alias using CareGuard's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for CareGuard operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Ruleset or service configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem errors while loading rulesets
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML errors
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Severity attached to a safety scan verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanSeverity {
    None,
    Medium,
    High,
}

/// Rule violation raised while evaluating a guard
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Violation {
    /// A required field is missing or malformed
    #[error("invalid {field}: {message}")]
    Structural { field: String, message: String },

    /// A value is outside its enumerated choice set
    #[error("invalid {field} '{value}'. Must be one of: {}", allowed.join(", "))]
    Choice {
        field: String,
        value: String,
        allowed: Vec<String>,
    },

    /// Blocked term or length bound breached
    #[error("{reason}")]
    Safety {
        reason: String,
        severity: ScanSeverity,
    },

    /// Any fault while classifying triage input
    #[error("emergency processing failure: {0}")]
    EmergencyProcessing(String),
}

impl Violation {
    /// Create a structural violation for `field`
    pub fn structural(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Structural {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Name of the offending field, when the violation has one
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Structural { field, .. } | Self::Choice { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Allowed values, for choice violations
    pub fn allowed_values(&self) -> &[String] {
        match self {
            Self::Choice { allowed, .. } => allowed,
            _ => &[],
        }
    }
}
