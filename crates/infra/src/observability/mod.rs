//! Tracing setup and log-based progress reporting
//!
//! [`init_tracing`] installs the global `fmt` subscriber. `RUST_LOG`, when
//! set, wins over the configured filter so operators can raise verbosity
//! without touching config files.

pub mod progress;

use edgebulk_domain::{EdgeBulkError, LoggingConfig, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

pub use progress::{log_fan_out_progress, log_progress};

/// Filter from `RUST_LOG`, or from `config.filter` when that is unset or
/// unparsable.
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.filter).map_err(|err| {
        EdgeBulkError::Config(format!("invalid log filter '{}': {err}", config.filter))
    })
}

/// Install the global subscriber.
///
/// # Errors
/// Returns `EdgeBulkError::Config` for an invalid filter, and
/// `EdgeBulkError::Internal` if a global subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = env_filter(config)?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if config.json {
        registry.with(fmt::layer().json().with_target(true).with_current_span(true)).try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };

    installed.map_err(|err| {
        EdgeBulkError::Internal(format!("tracing subscriber already installed: {err}"))
    })?;
    tracing::debug!(filter = %config.filter, json = config.json, "tracing initialised");
    Ok(())
}
