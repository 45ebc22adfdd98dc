//! Server, pipeline, and logging settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// HTTP/WebSocket listener settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// Listen port (`PORT`).
    pub port: u16,
    /// Outbound queue depth per display connection.
    pub send_queue_size: usize,
    /// Interval between server pings to display connections.
    pub ping_interval_ms: u64,
    /// How long a new connection may take to send its registration message.
    pub registration_timeout_ms: u64,
    /// Upper bound on graceful shutdown.
    pub shutdown_timeout_ms: u64,
}

impl ServerSettings {
    /// Ping interval as a [`Duration`].
    #[must_use]
    pub fn ping_interval(&self) -> Duration {
        Duration::from_millis(self.ping_interval_ms)
    }

    /// Registration timeout as a [`Duration`].
    #[must_use]
    pub fn registration_timeout(&self) -> Duration {
        Duration::from_millis(self.registration_timeout_ms)
    }

    /// Shutdown timeout as a [`Duration`].
    #[must_use]
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8765,
            send_queue_size: 64,
            ping_interval_ms: 30_000,
            registration_timeout_ms: 30_000,
            shutdown_timeout_ms: 10_000,
        }
    }
}

/// Message pipeline tuning.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineSettings {
    /// Upper bound on one model call. `None` waits indefinitely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_timeout_secs: Option<u64>,
}

impl PipelineSettings {
    /// Model timeout as a [`Duration`], if configured.
    #[must_use]
    pub fn model_timeout(&self) -> Option<Duration> {
        self.model_timeout_secs.map(Duration::from_secs)
    }
}

/// Log line format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Log output settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_durations() {
        let s = ServerSettings::default();
        assert_eq!(s.ping_interval(), Duration::from_secs(30));
        assert_eq!(s.registration_timeout(), Duration::from_secs(30));
        assert_eq!(s.shutdown_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn model_timeout_disabled_by_default() {
        assert!(PipelineSettings::default().model_timeout().is_none());
        let p = PipelineSettings {
            model_timeout_secs: Some(45),
        };
        assert_eq!(p.model_timeout(), Some(Duration::from_secs(45)));
    }

    #[test]
    fn log_format_serde() {
        let f: LogFormat = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(f, LogFormat::Json);
        assert_eq!(serde_json::to_string(&LogFormat::Pretty).unwrap(), "\"pretty\"");
    }
}
