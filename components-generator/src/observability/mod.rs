//! Observability (logging)
//!
//! Structured logging via `tracing`. The subscriber is only installed when the
//! `logging` toggle of [`GeneratorConfig`](crate::config::GeneratorConfig) is on;
//! otherwise every event is discarded.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::GeneratorConfig;
use crate::error::{GeneratorError, Result};

/// Initialize the logging stack
///
/// Sets up:
/// - Pretty formatting in debug builds, compact formatting in release builds
/// - Environment-based log level filtering (`RUST_LOG`)
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
///
/// # Example
///
/// ```rust,no_run
/// use components_generator::{config::GeneratorConfig, observability};
///
/// # fn main() -> anyhow::Result<()> {
/// let config = GeneratorConfig::load()?;
/// observability::init(&config)?;
/// tracing::info!("generator started");
/// # Ok(())
/// # }
/// ```
pub fn init(config: &GeneratorConfig) -> Result<()> {
    if !config.logging {
        return Ok(());
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cfg!(debug_assertions) {
            EnvFilter::new("info,components_generator=debug")
        } else {
            EnvFilter::new("info")
        }
    });

    #[cfg(debug_assertions)]
    let result = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .pretty()
                .with_writer(std::io::stderr),
        )
        .try_init();

    #[cfg(not(debug_assertions))]
    let result = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .try_init();

    result.map_err(|e| GeneratorError::Config(format!("failed to install logger: {e}")))
}
