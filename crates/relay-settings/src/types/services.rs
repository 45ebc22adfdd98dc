//! Chat platform, model, and filesystem settings.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Chat platform credentials.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiscordSettings {
    /// Bot token (`DISCORD_BOT_TOKEN`). Never written back out.
    #[serde(skip_serializing)]
    pub token: String,
}

/// Generative model settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeminiSettings {
    /// API key (`GEMINI_API_KEY`). Never written back out.
    #[serde(skip_serializing)]
    pub api_key: String,
    /// Model id.
    pub model: String,
    /// REST base URL, up to and including the API version.
    pub base_url: String,
    /// Optional cap on generated tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    /// Optional sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gemini-2.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            max_output_tokens: None,
            temperature: None,
        }
    }
}

/// Filesystem locations, relative to the working directory unless absolute.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PathSettings {
    /// Key-value env file holding secrets and `CHANNEL_ID`.
    pub env_file: String,
    /// Directory scanned for knowledge files.
    pub knowledge_dir: String,
    /// Persona / system instruction text file.
    pub persona_file: String,
}

impl PathSettings {
    /// Env file path.
    #[must_use]
    pub fn env_file(&self) -> PathBuf {
        PathBuf::from(&self.env_file)
    }

    /// Knowledge directory path.
    #[must_use]
    pub fn knowledge_dir(&self) -> PathBuf {
        PathBuf::from(&self.knowledge_dir)
    }

    /// Persona file path.
    #[must_use]
    pub fn persona_file(&self) -> PathBuf {
        PathBuf::from(&self.persona_file)
    }
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            env_file: ".env".to_string(),
            knowledge_dir: "knowledge_base".to_string(),
            persona_file: "persona.txt".to_string(),
        }
    }
}
