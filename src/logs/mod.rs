use metrics::{counter, gauge};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Environment;

/// Build the default log filter used when RUST_LOG is not set
pub fn default_filter(log_level: &str) -> String {
    format!("pdfplayground={log_level},tower_http=warn")
}

/// Initialize structured logging and metrics collection
pub fn init_logging_and_metrics(env: Environment, log_level: &str) {
    // Set up environment filter for log levels
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(log_level)));
    // Initialize tracing subscriber with stdout output
    match env {
        Environment::Production => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stdout),
            )
            .init(),
        Environment::Development => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stdout),
            )
            .init(),
    }
    // Output debugging information
    info!(environment = ?env, "Logging and tracing initialized");
    // Initialize metrics with default values
    gauge!("pdfplayground.active_extractions").set(0.0);
    counter!("pdfplayground.total_requests").absolute(0);
    counter!("pdfplayground.total_uploads").absolute(0);
    counter!("pdfplayground.total_extractions").absolute(0);
    counter!("pdfplayground.total_fallbacks").absolute(0);
    counter!("pdfplayground.total_errors").absolute(0);
    counter!("pdfplayground.total_rate_limit_errors").absolute(0);
    // Output debugging information
    info!("Metrics collection initialized");
}
