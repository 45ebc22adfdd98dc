//! # relay-logging
//!
//! Structured logging with `tracing`.
//!
//! [`init_subscriber`] installs a global `fmt` subscriber, either
//! human-readable or one JSON object per line. `RUST_LOG` takes precedence
//! over the configured level.

#![deny(unsafe_code)]

use relay_settings::{LogFormat, LoggingSettings};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

/// Build the level filter: `RUST_LOG` if set and valid, else `default_level`.
///
/// An unparseable `default_level` falls back to `info`.
pub fn build_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| directive_filter(default_level))
}

fn directive_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. Call once at startup.
///
/// Fails if a global subscriber is already set.
pub fn init_subscriber(settings: &LoggingSettings) -> Result<(), TryInitError> {
    let filter = build_filter(&settings.level);

    let (json_layer, pretty_layer) = match settings.format {
        LogFormat::Json => (
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true)
                    .with_span_list(false),
            ),
            None,
        ),
        LogFormat::Pretty => (
            None,
            Some(tracing_subscriber::fmt::layer().with_target(true)),
        ),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(pretty_layer)
        .try_init()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directive_filter_accepts_module_levels() {
        let filter = directive_filter("info,relay_runtime=debug");
        let rendered = filter.to_string();
        assert!(rendered.contains("relay_runtime=debug"));
    }

    #[test]
    fn invalid_directive_falls_back_to_info() {
        let filter = directive_filter("relay=notalevel");
        assert_eq!(filter.to_string(), "info");
    }

    #[test]
    fn init_twice_fails_second_time() {
        let settings = LoggingSettings::default();
        let _ = init_subscriber(&settings);
        assert!(init_subscriber(&settings).is_err());
    }
}
