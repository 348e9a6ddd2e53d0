//! Tracing subscriber installation

use jobportal_core::ApiError;
use jobportal_domain::{LoggingConfig, PortalError, Result};
use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. Returns
/// `Ok(false)` if a subscriber was already installed.
///
/// # Errors
/// Returns `PortalError::Config` if the configured level is not a valid
/// filter directive.
pub fn init_tracing(config: &LoggingConfig) -> Result<bool> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| {
            PortalError::Config(format!("Invalid log level '{}': {e}", config.level))
        })?,
    };

    let installed = if config.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_current_span(true)
            .with_target(false)
            .try_init()
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).try_init()
    };

    match installed {
        Ok(()) => {
            tracing::debug!(level = %config.level, json = config.json, "tracing initialised");
            Ok(true)
        }
        Err(_) => Ok(false),
    }
}

/// Stable label for a failed call, e.g. `timeout_error` or `auth_expired`
pub fn error_label(err: &ApiError) -> &'static str {
    err.kind.label()
}
