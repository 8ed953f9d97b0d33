//! Structured logging setup
//!
//! The crate itself only emits `tracing` events. Host applications that do
//! not install their own subscriber can call [`init_logging`].

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::{CyberusKeyError, Result};

/// Installs a global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `config.level`. Output is JSON lines when
/// `config.json_format` is set, human-readable otherwise.
///
/// # Errors
///
/// Returns [`CyberusKeyError::Config`] if the level is not a valid filter
/// directive or a global subscriber is already installed.
///
/// # Examples
///
/// ```no_run
/// use cyberuskey::config::LoggingConfig;
/// use cyberuskey::logging::init_logging;
///
/// init_logging(&LoggingConfig::default()).unwrap();
/// ```
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| CyberusKeyError::Config(format!("invalid log level {:?}: {e}", config.level)))?;

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if config.json_format {
        registry
            .with(fmt::layer().json().with_current_span(true))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(true).with_level(true))
            .try_init()
    };

    installed.map_err(|e| CyberusKeyError::Config(format!("failed to install subscriber: {e}")))
}
