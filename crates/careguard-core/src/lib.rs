//! CareGuard Core
//!
//! Core types and error handling shared across CareGuard components.
//!
//! This crate provides:
//! - The per-domain request types and the tagged [`ValidationRequest`]
//! - The [`ValidationResult`] envelope and its [`Decision`] payloads
//! - The operational [`Error`] and the rule-level [`Violation`] taxonomy

pub mod error;
pub mod result;
pub mod types;

pub use error::{Error, Result, ScanSeverity, Violation};
pub use result::{Decision, EmergencyAssessment, SeverityLevel, ValidationResult, ValidationStatus};
pub use types::{
    AppointmentRequest, ChatRequest, ClinicalRequest, Domain, EmergencyRequest, PatientInfo,
    UnknownDomain, ValidationRequest,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result, Violation};
    pub use crate::result::{Decision, ValidationResult, ValidationStatus};
    pub use crate::types::{Domain, ValidationRequest};
}
