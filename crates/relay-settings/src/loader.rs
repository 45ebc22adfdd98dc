//! Settings loading with deep merge, env file, and environment overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`RelaySettings::default()`]
//! 2. If a settings file is given and exists, deep-merge its values over defaults
//! 3. Load the env file (`ENV_FILE_PATH`, else `paths.envFile`) into the
//!    process environment
//! 4. Apply environment variable overrides (highest priority)
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::Path;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::types::{LogFormat, RelaySettings};

/// Env var naming the key-value env file.
pub const ENV_FILE_VAR: &str = "ENV_FILE_PATH";

/// Load settings through every layer.
///
/// `settings_file` is optional; when absent only defaults, the env file, and
/// environment variables apply.
pub fn load_settings(settings_file: Option<&Path>) -> Result<RelaySettings> {
    let mut settings = match settings_file {
        Some(path) => merge_settings_file(path)?,
        None => RelaySettings::default(),
    };

    let env_file = read_env_string(ENV_FILE_VAR).unwrap_or_else(|| settings.paths.env_file.clone());
    let _ = load_env_file(Path::new(&env_file));

    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Load settings from a specific file with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON, returns an error. The env file is not read.
pub fn load_settings_from_path(path: &Path) -> Result<RelaySettings> {
    let mut settings = merge_settings_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

fn merge_settings_file(path: &Path) -> Result<RelaySettings> {
    let defaults = serde_json::to_value(RelaySettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    Ok(serde_json::from_value(merged)?)
}

/// Load a `KEY=value` env file into the process environment.
///
/// Variables already present in the environment are left untouched.
/// Returns whether the file was found and loaded.
pub fn load_env_file(path: &Path) -> bool {
    match dotenv::from_path(path) {
        Ok(()) => {
            info!(path = %path.display(), "loaded env file");
            true
        }
        Err(dotenv::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "env file not found, skipping");
            false
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to load env file, skipping");
            false
        }
    }
}

/// Recursive deep merge of two JSON values.
///
/// - Objects are merged recursively (source overrides target per-key)
/// - Arrays and primitives are replaced entirely by source
/// - Null values in source are skipped (preserving target)
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment variable overrides to loaded settings.
///
/// Invalid numeric values are ignored with a warning (falling back to
/// file/default).
pub fn apply_env_overrides(settings: &mut RelaySettings) {
    apply_overrides_with(settings, &|name| std::env::var(name).ok());
}

/// Apply overrides from an arbitrary variable source.
fn apply_overrides_with(settings: &mut RelaySettings, lookup: &dyn Fn(&str) -> Option<String>) {
    let env = EnvReader { lookup };

    // ── Secrets ─────────────────────────────────────────────────────
    if let Some(v) = env.string("DISCORD_BOT_TOKEN") {
        settings.discord.token = v;
    }
    if let Some(v) = env.string("GEMINI_API_KEY") {
        settings.gemini.api_key = v;
    }

    // ── Model ───────────────────────────────────────────────────────
    if let Some(v) = env.string("GEMINI_MODEL") {
        settings.gemini.model = v;
    }
    if let Some(v) = env.string("GEMINI_BASE_URL") {
        settings.gemini.base_url = v;
    }

    // ── Server ──────────────────────────────────────────────────────
    if let Some(v) = env.u16("PORT", 1, 65535) {
        settings.server.port = v;
    }
    if let Some(v) = env.string("RELAY_HOST") {
        settings.server.host = v;
    }

    // ── Paths ───────────────────────────────────────────────────────
    if let Some(v) = env.string(ENV_FILE_VAR) {
        settings.paths.env_file = v;
    }
    if let Some(v) = env.string("KNOWLEDGE_BASE_DIR") {
        settings.paths.knowledge_dir = v;
    }
    if let Some(v) = env.string("PERSONA_FILE") {
        settings.paths.persona_file = v;
    }

    // ── Pipeline ────────────────────────────────────────────────────
    if let Some(v) = env.u64("MODEL_TIMEOUT_SECS", 1, 3600) {
        settings.pipeline.model_timeout_secs = Some(v);
    }

    // ── Logging ─────────────────────────────────────────────────────
    if let Some(v) = env.string("RELAY_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = env.string("RELAY_LOG_FORMAT") {
        match parse_log_format(&v) {
            Some(format) => settings.logging.format = format,
            None => warn!(key = "RELAY_LOG_FORMAT", value = %v, "invalid log format, ignoring"),
        }
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a `u16` within a range.
pub fn parse_u16_range(val: &str, min: u16, max: u16) -> Option<u16> {
    let n: u16 = val.trim().parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.trim().parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a log format name (case-insensitive).
pub fn parse_log_format(val: &str) -> Option<LogFormat> {
    match val.trim().to_lowercase().as_str() {
        "pretty" | "text" => Some(LogFormat::Pretty),
        "json" => Some(LogFormat::Json),
        _ => None,
    }
}

// ── Env var readers (thin wrappers) ─────────────────────────────────────────

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

struct EnvReader<'a> {
    lookup: &'a dyn Fn(&str) -> Option<String>,
}

impl EnvReader<'_> {
    fn string(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|v| !v.is_empty())
    }

    fn u16(&self, name: &str, min: u16, max: u16) -> Option<u16> {
        let val = self.string(name)?;
        let result = parse_u16_range(&val, min, max);
        if result.is_none() {
            warn!(key = name, value = %val, "invalid u16 env var, ignoring");
        }
        result
    }

    fn u64(&self, name: &str, min: u64, max: u64) -> Option<u64> {
        let val = self.string(name)?;
        let result = parse_u64_range(&val, min, max);
        if result.is_none() {
            warn!(key = name, value = %val, "invalid u64 env var, ignoring");
        }
        result
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
