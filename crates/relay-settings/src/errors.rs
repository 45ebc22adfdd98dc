//! Settings error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when loading settings or persisting runtime config.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Failed to read or write a configuration file.
    #[error("failed to access settings file: {0}")]
    Io(#[from] std::io::Error),
    /// Failed to parse JSON in the settings file.
    #[error("failed to parse settings JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// A settings value was invalid (e.g., out of range).
    #[error("invalid settings value: {0}")]
    InvalidValue(String),
    /// A secret required to start was not provided.
    #[error("missing required secret: {0}")]
    MissingSecret(&'static str),
    /// The persona file could not be read.
    #[error("failed to read persona file {}: {source}", path.display())]
    Persona {
        /// Path that was read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Result type for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_display() {
        let err = SettingsError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "not found",
        ));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn json_error_from_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{bad}").unwrap_err();
        let err: SettingsError = json_err.into();
        assert!(matches!(err, SettingsError::Json(_)));
        assert!(err.to_string().contains("parse settings JSON"));
    }

    #[test]
    fn missing_secret_names_the_variable() {
        let err = SettingsError::MissingSecret("GEMINI_API_KEY");
        assert_eq!(err.to_string(), "missing required secret: GEMINI_API_KEY");
    }

    #[test]
    fn persona_error_includes_path() {
        let err = SettingsError::Persona {
            path: PathBuf::from("persona.txt"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        let msg = err.to_string();
        assert!(msg.contains("persona.txt"));
        assert!(msg.contains("gone"));
    }
}
