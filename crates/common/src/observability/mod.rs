//! Tracing subscriber setup
//!
//! The library only emits `tracing` events. Binaries and test harnesses
//! call [`init_tracing`] once to install a subscriber configured from
//! [`ObservabilityConfig`].

use crate::config::ObservabilityConfig;
use crate::errors::{AppError, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// Install a global subscriber. `RUST_LOG` takes precedence over the
/// configured level. Fails if a subscriber is already installed.
pub fn init_tracing(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = if config.json_logging {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| AppError::Configuration {
        message: format!("Failed to install tracing subscriber: {}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_rejected() {
        let config = ObservabilityConfig {
            log_level: "warn".to_string(),
            json_logging: false,
            metrics_enabled: false,
        };

        // The first call may race with other tests; the second never succeeds
        let _ = init_tracing(&config);
        assert!(init_tracing(&config).is_err());
    }
}
