//! Service configuration

use careguard_core::{Error, Result};
use careguard_policy::{GuardDefinition, RulesetProfile};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Ruleset file; the built-in profile is used when absent
    #[serde(default)]
    pub ruleset: Option<PathBuf>,

    /// Built-in ruleset profile
    #[serde(default)]
    pub profile: RulesetProfile,

    /// Metrics export configuration
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Log output format
    #[serde(default)]
    pub log_format: LogFormat,
}

/// Values supplied on the command line, applied over the file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub ruleset: Option<PathBuf>,
    pub profile: Option<RulesetProfile>,
    pub prometheus: bool,
}

impl ServiceConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(config_path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
        // A missing default path is fine; a missing explicit path is not
        let mut config = match config_path {
            Some(path) if path.exists() => Self::from_file(path)?,
            Some(path) => {
                return Err(Error::config(format!(
                    "config file {} does not exist",
                    path.display()
                )))
            }
            None => Self::default(),
        };

        if let Some(ruleset) = &overrides.ruleset {
            config.ruleset = Some(ruleset.clone());
        }

        if let Some(profile) = overrides.profile {
            config.profile = profile;
        }

        if overrides.prometheus {
            config.metrics.prometheus = true;
        }

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        info!(path = %path.display(), "Service configuration loaded");
        Ok(config)
    }

    /// Resolve the ruleset this configuration names
    pub fn guard_definition(&self) -> Result<GuardDefinition> {
        match &self.ruleset {
            Some(path) => {
                if self.profile != RulesetProfile::default() {
                    warn!(
                        profile = %self.profile,
                        "Ruleset file given, built-in profile ignored"
                    );
                }
                GuardDefinition::from_file(path)
            }
            None => Ok(GuardDefinition::for_profile(self.profile)),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            ruleset: None,
            profile: RulesetProfile::Standard,
            metrics: MetricsConfig::default(),
            log_format: LogFormat::default(),
        }
    }
}

/// Metrics export configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Install the Prometheus recorder and render its exposition
    #[serde(default)]
    pub prometheus: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}
