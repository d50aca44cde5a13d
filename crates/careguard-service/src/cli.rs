//! Command-line interface

use anyhow::{Context, Result};
use careguard_core::{AppointmentRequest, PatientInfo};
use careguard_policy::{GuardDefinition, RulesetProfile};
use careguard_service::{parse_batch, ConfigOverrides, GuardService};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "careguard")]
#[command(about = "CareGuard validation engine for healthcare chatbot content", long_about = None)]
pub struct Cli {
    /// Service configuration file
    #[arg(short, long, env = "CAREGUARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Ruleset file (overrides the built-in profile)
    #[arg(short, long, env = "CAREGUARD_RULESET")]
    pub ruleset: Option<PathBuf>,

    /// Built-in ruleset profile: standard or strict
    #[arg(short, long)]
    pub profile: Option<RulesetProfile>,

    /// Install the Prometheus recorder and print its exposition after the command
    #[arg(long)]
    pub prometheus: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            ruleset: self.ruleset.clone(),
            profile: self.profile,
            prometheus: self.prometheus,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a single request
    #[command(subcommand)]
    Validate(ValidateCommand),

    /// Validate a JSON batch file ("-" reads stdin)
    Batch {
        file: PathBuf,
    },

    /// Show the active configuration
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Load and validate a ruleset file without running anything
    CheckRuleset {
        file: PathBuf,
    },

    /// Run the health probe
    Health,
}

#[derive(Subcommand, Debug)]
pub enum ValidateCommand {
    /// Chatbot reply
    Chat {
        #[arg(short, long)]
        message: String,
        #[arg(short, long)]
        intent: Option<String>,
        #[arg(long)]
        user_id: Option<String>,
    },

    /// Appointment booking
    Appointment(AppointmentArgs),

    /// Emergency symptom triage
    Emergency {
        #[arg(short, long)]
        symptoms: String,
        /// Patient information as a JSON object
        #[arg(long)]
        patient_info: Option<String>,
        /// Shorthand for {"id": ...} in the patient information
        #[arg(long)]
        patient_id: Option<String>,
        /// Caller's severity estimate
        #[arg(long)]
        severity: Option<String>,
    },

    /// Clinical content
    Clinical {
        #[arg(short, long)]
        content: String,
        #[arg(long)]
        content_type: Option<String>,
        #[arg(long)]
        audience: Option<String>,
    },

    /// Untyped JSON payload routed by domain tag
    Raw {
        #[arg(short, long)]
        domain: String,
        #[arg(long)]
        payload: String,
    },
}

#[derive(Args, Debug)]
pub struct AppointmentArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub phone: String,
    /// YYYY-MM-DD
    #[arg(long)]
    pub date: String,
    /// HH:MM (24h)
    #[arg(long)]
    pub time: String,
    #[arg(long)]
    pub service: String,
    #[arg(long, default_value = "routine")]
    pub urgency: String,
    #[arg(long)]
    pub symptoms: Option<String>,
}

impl From<AppointmentArgs> for AppointmentRequest {
    fn from(args: AppointmentArgs) -> Self {
        Self {
            patient_name: args.name,
            contact_phone: args.phone,
            preferred_date: args.date,
            preferred_time: args.time,
            service_type: args.service,
            urgency_level: args.urgency,
            symptoms: args.symptoms,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Services, urgency levels and emergency keywords
    Services,
    /// Guard catalogue
    Guards,
    /// Active ruleset as YAML
    Ruleset,
}

/// Run a command against the service
pub fn run(command: Command, service: &GuardService) -> Result<()> {
    match command {
        Command::Validate(validate) => run_validate(validate, service),
        Command::Batch { file } => {
            let content = read_input(&file)?;
            let items = parse_batch(&content)?;
            print_json(&service.validate_batch(items))
        }
        Command::Config(ConfigCommand::Services) => print_json(&service.guard_config()),
        Command::Config(ConfigCommand::Guards) => print_json(&service.describe_guards()),
        Command::Config(ConfigCommand::Ruleset) => {
            print!("{}", service.registry().definition().to_yaml()?);
            Ok(())
        }
        Command::CheckRuleset { file } => {
            let definition = GuardDefinition::from_file(&file)
                .with_context(|| format!("Ruleset {} is invalid", file.display()))?;
            println!(
                "{}: ruleset {} is valid ({} services, {} emergency keywords)",
                file.display(),
                definition.version,
                definition.appointment.services.len(),
                definition.emergency.keywords.len()
            );
            Ok(())
        }
        Command::Health => print_json(&service.health()),
    }
}

fn run_validate(command: ValidateCommand, service: &GuardService) -> Result<()> {
    let result = match command {
        ValidateCommand::Chat {
            message,
            intent,
            user_id,
        } => service.validate_chat(message, intent.as_deref(), user_id.as_deref()),
        ValidateCommand::Appointment(args) => service.validate_appointment(args.into()),
        ValidateCommand::Emergency {
            symptoms,
            patient_info,
            patient_id,
            severity,
        } => {
            let mut info = match patient_info {
                Some(json) => serde_json::from_str::<PatientInfo>(&json)
                    .context("--patient-info must be a JSON object")?,
                None => PatientInfo::new(),
            };
            if let Some(id) = patient_id {
                info.insert("id".to_string(), serde_json::Value::String(id));
            }
            service.validate_emergency(symptoms, info, severity.as_deref())
        }
        ValidateCommand::Clinical {
            content,
            content_type,
            audience,
        } => service.validate_clinical(content, content_type.as_deref(), audience.as_deref()),
        ValidateCommand::Raw { domain, payload } => {
            let payload = serde_json::from_str(&payload).context("--payload must be valid JSON")?;
            service.dispatch(&domain, payload)
        }
    };

    print_json(&result)
}

fn read_input(file: &Path) -> Result<String> {
    if file.as_os_str() == "-" {
        let mut content = String::new();
        std::io::stdin().read_to_string(&mut content)?;
        Ok(content)
    } else {
        std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
