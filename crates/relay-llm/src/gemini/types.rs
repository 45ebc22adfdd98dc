//! Gemini `generateContent` wire types and client configuration.

use serde::{Deserialize, Serialize};

/// Default REST base URL for API key auth.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

// ─────────────────────────────────────────────────────────────────────────────
// Safety settings
// ─────────────────────────────────────────────────────────────────────────────

/// Harm categories for Gemini safety settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HarmCategory {
    /// Harassment content.
    #[serde(rename = "HARM_CATEGORY_HARASSMENT")]
    Harassment,
    /// Hate speech.
    #[serde(rename = "HARM_CATEGORY_HATE_SPEECH")]
    HateSpeech,
    /// Sexually explicit content.
    #[serde(rename = "HARM_CATEGORY_SEXUALLY_EXPLICIT")]
    SexuallyExplicit,
    /// Dangerous content.
    #[serde(rename = "HARM_CATEGORY_DANGEROUS_CONTENT")]
    DangerousContent,
}

/// Threshold for blocking harmful content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HarmBlockThreshold {
    /// Don't block any content.
    #[serde(rename = "BLOCK_NONE")]
    BlockNone,
    /// Only block high-probability harm.
    #[serde(rename = "BLOCK_ONLY_HIGH")]
    BlockOnlyHigh,
    /// Block medium and above probability.
    #[serde(rename = "BLOCK_MEDIUM_AND_ABOVE")]
    BlockMediumAndAbove,
}

/// Safety setting for a specific harm category.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SafetySetting {
    /// The harm category.
    pub category: HarmCategory,
    /// The block threshold.
    pub threshold: HarmBlockThreshold,
}

/// Default safety settings for a character chat: only high-probability harm
/// is blocked.
pub fn default_safety_settings() -> Vec<SafetySetting> {
    [
        HarmCategory::Harassment,
        HarmCategory::HateSpeech,
        HarmCategory::SexuallyExplicit,
        HarmCategory::DangerousContent,
    ]
    .into_iter()
    .map(|category| SafetySetting {
        category,
        threshold: HarmBlockThreshold::BlockOnlyHigh,
    })
    .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration for [`GeminiModel`](super::GeminiModel).
#[derive(Clone, Debug)]
pub struct GeminiConfig {
    /// API key.
    pub api_key: String,
    /// Model id (e.g., `gemini-2.5-flash`).
    pub model: String,
    /// Base URL, up to and including the API version.
    pub base_url: String,
    /// System instruction (persona) sent with every request.
    pub system_instruction: Option<String>,
    /// Max output tokens override.
    pub max_output_tokens: Option<u32>,
    /// Temperature override.
    pub temperature: Option<f64>,
    /// Safety settings. `None` uses [`default_safety_settings`].
    pub safety_settings: Option<Vec<SafetySetting>>,
}

impl GeminiConfig {
    /// Config with defaults for everything but the key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            system_instruction: None,
            max_output_tokens: None,
            temperature: None,
            safety_settings: None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Request types
// ─────────────────────────────────────────────────────────────────────────────

/// Content message in Gemini API format.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeminiContent {
    /// The role (`user` or `model`).
    pub role: String,
    /// Content parts.
    pub parts: Vec<GeminiPart>,
}

/// A content part in a Gemini message.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GeminiPart {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
    /// Inline binary data (images).
    InlineData {
        /// The inline data details.
        #[serde(rename = "inlineData")]
        inline_data: InlineDataContent,
    },
}

/// Inline binary data.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineDataContent {
    /// MIME type (e.g., `image/png`).
    pub mime_type: String,
    /// Base64-encoded data.
    pub data: String,
}

/// System instruction for the Gemini API.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SystemInstruction {
    /// Parts containing the system prompt.
    pub parts: Vec<SystemPart>,
}

/// A part of a system instruction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SystemPart {
    /// Text content.
    pub text: String,
}

/// Generation config for the Gemini API.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Max output tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    /// Temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

/// Request body for `models/{model}:generateContent`.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// Conversation so far, ending with the new user turn.
    pub contents: Vec<GeminiContent>,
    /// Persona.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<SystemInstruction>,
    /// Sampling settings.
    pub generation_config: GenerationConfig,
    /// Safety thresholds.
    pub safety_settings: Vec<SafetySetting>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Response types
// ─────────────────────────────────────────────────────────────────────────────

/// Response body of `generateContent`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// Response candidates.
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
    /// Feedback on the prompt (set when the prompt itself was blocked).
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

/// A response candidate.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiCandidate {
    /// The content of this candidate.
    #[serde(default)]
    pub content: Option<GeminiCandidateContent>,
    /// Finish reason (e.g., `STOP`, `MAX_TOKENS`, `SAFETY`).
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Content inside a candidate.
#[derive(Clone, Debug, Deserialize)]
pub struct GeminiCandidateContent {
    /// Content parts.
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

/// One part of a candidate. Non-text parts deserialize with `text: None`.
#[derive(Clone, Debug, Deserialize)]
pub struct CandidatePart {
    /// Text, if this is a text part.
    #[serde(default)]
    pub text: Option<String>,
    /// Whether this is a thinking part.
    #[serde(default)]
    pub thought: Option<bool>,
}

/// Prompt feedback.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    /// Why the prompt was blocked, if it was.
    #[serde(default)]
    pub block_reason: Option<String>,
}
