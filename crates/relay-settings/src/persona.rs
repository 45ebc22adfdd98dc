//! Persona (system instruction) loading.

use std::path::Path;

use tracing::info;

use crate::errors::{Result, SettingsError};

/// Read the persona text sent as the model's system instruction.
///
/// A missing or unreadable file is a startup error.
pub fn load_persona(path: &Path) -> Result<String> {
    let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Persona {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), chars = text.chars().count(), "persona loaded");
    Ok(text)
}
