//! CareGuard CLI
//!
//! Reference host for the CareGuard validation engine. Validates single
//! requests or batches, prints the active configuration and checks ruleset
//! files. Results are printed as JSON on stdout; logs go to stderr.

use anyhow::Result;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::info;

use careguard_service::{GuardService, LogFormat, ServiceConfig};

mod cli;

use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = ServiceConfig::load(cli.config.as_deref(), &cli.overrides())?;

    // Initialize tracing
    init_tracing(cli.verbose, config.log_format);
    info!(profile = %config.profile, ruleset = ?config.ruleset, "Configuration loaded");

    // Initialize metrics
    let metrics_handle = if config.metrics.prometheus {
        Some(init_metrics()?)
    } else {
        None
    };

    let service = GuardService::from_config(&config)?;
    cli::run(cli.command, &service)?;

    if let Some(handle) = metrics_handle {
        print!("{}", handle.render());
    }

    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool, format: LogFormat) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("careguard=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("careguard=warn"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

/// Initialize metrics exporter and return handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "careguard_requests_total",
        "Total number of validation requests by domain"
    );
    metrics::describe_counter!(
        "careguard_decisions_total",
        "Total number of validation decisions by domain and status"
    );
    metrics::describe_counter!(
        "careguard_outcomes_total",
        "Validation outcomes (success or failure) by domain"
    );
    metrics::describe_counter!(
        "careguard_emergency_requests_total",
        "Emergency-domain requests and emergency appointments"
    );
    metrics::describe_counter!(
        "careguard_escalations_total",
        "Requests escalated to mandatory human review"
    );
    metrics::describe_histogram!(
        "careguard_validation_latency_ms",
        metrics::Unit::Milliseconds,
        "Validation latency in milliseconds"
    );

    info!("Metrics exporter initialized");
    Ok(handle)
}
