//! Tracing subscriber setup
//!
//! `RUST_LOG` wins when set; otherwise the configured level is used as the
//! filter directive.

use orbu_domain::{GatewayError, LoggingConfig, Result};
use tracing_subscriber::EnvFilter;

/// Install the global `fmt` subscriber.
///
/// # Errors
/// `Config` when the configured level is not a valid filter directive, and
/// `Internal` when a global subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = env_filter(config)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let installed = if config.json {
        builder.json().with_current_span(true).try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|err| GatewayError::Internal(format!("tracing already initialised: {err}")))
}

fn env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.level).map_err(|err| {
            GatewayError::Config(format!("Invalid log level '{}': {err}", config.level))
        }),
    }
}
