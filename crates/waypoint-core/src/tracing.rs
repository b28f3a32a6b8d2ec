// Tracing and observability setup
// Subscriber installation driven by the application config

use anyhow::Result;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

use crate::config::ApplicationConfig;

/// Directive used when neither `RUST_LOG` nor the config names one
pub const DEFAULT_LOG_LEVEL: &str = "info";

//-----------------------------------------------------------------------------
// Filters
//-----------------------------------------------------------------------------

/// Filter built from `log_level`, e.g. "debug" or
/// "waypoint_component=trace,info"
pub fn log_filter(log_level: &str) -> Result<EnvFilter> {
    Ok(EnvFilter::try_new(log_level)?)
}

//-----------------------------------------------------------------------------
// Tracing Initialization
//-----------------------------------------------------------------------------

/// Initializes the global tracing subscriber.
///
/// # Arguments
///
/// * `log_level`: Directive used when `RUST_LOG` is not set. Defaults to
///                "info".
/// * `json_output`: Emit JSON lines instead of the human-readable format.
///                  Defaults to `false`.
pub fn init_tracing(log_level: Option<&str>, json_output: Option<bool>) -> Result<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => log_filter(log_level.unwrap_or(DEFAULT_LOG_LEVEL))?,
    };
    let subscriber = Registry::default().with(env_filter);

    if json_output.unwrap_or(false) {
        let json_layer = fmt::layer().json().with_current_span(true).with_span_list(true);
        tracing::subscriber::set_global_default(subscriber.with(json_layer))?;
    } else {
        let fmt_layer = fmt::layer().with_target(true).with_level(true);
        tracing::subscriber::set_global_default(subscriber.with(fmt_layer))?;
    }

    Ok(())
}

/// Install the subscriber described by the `[application]` section
pub fn init_tracing_from_config(config: &ApplicationConfig) -> Result<()> {
    init_tracing(Some(&config.log_level), Some(config.json_logs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Once;

    static INIT: Once = Once::new();

    #[test]
    fn test_log_filter_directives() {
        assert!(log_filter("debug").is_ok());
        assert!(log_filter("waypoint_component=trace,info").is_ok());
        assert!(log_filter("waypoint=loudest").is_err());
    }

    #[test]
    fn test_tracing_init_once() {
        let config = ApplicationConfig { log_level: "debug".to_string(), ..Default::default() };
        INIT.call_once(|| {
            init_tracing_from_config(&config).expect("first initialization succeeds");
        });
        // a second global subscriber is refused
        assert!(init_tracing(Some("debug"), Some(true)).is_err());
        tracing::debug!("tracing initialized");
    }
}
