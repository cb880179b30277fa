//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber for binaries
//! - Honor `RUST_LOG` over the configured level
//!
//! JSON lines when `json_logs` is set, human-readable otherwise. Logs go to
//! stderr; stdout is reserved for command output.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Build the filter used by [`init_logging`].
pub fn env_filter(config: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.log_level)))
}

fn default_directives(level: &str) -> String {
    format!("cert_connectors={level},cert_lookup={level}")
}

/// Install the global subscriber.
///
/// Fails if a global subscriber is already set.
pub fn init_logging(
    config: &ObservabilityConfig,
) -> Result<(), tracing_subscriber::util::TryInitError> {
    let registry = tracing_subscriber::registry().with(env_filter(config));

    if config.json_logs {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()
    }
}
