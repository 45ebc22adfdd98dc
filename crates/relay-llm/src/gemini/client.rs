//! [`GeminiModel`]: one non-streaming `generateContent` call per user turn.

use async_trait::async_trait;
use relay_core::{ChatSession, ContentPart};
use tracing::{debug, error, instrument, warn};

use super::converter::build_contents;
use super::types::{
    GeminiConfig, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    SystemInstruction, SystemPart, default_safety_settings,
};
use crate::provider::{ChatModel, ProviderError, ProviderResult};

/// Header carrying the API key. Kept out of the URL so transport errors
/// never echo it.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini chat model using API key auth.
pub struct GeminiModel {
    config: GeminiConfig,
    client: reqwest::Client,
}

impl GeminiModel {
    /// Create a model client with a fresh HTTP client.
    pub fn new(config: GeminiConfig) -> Self {
        Self::with_client(config, reqwest::Client::new())
    }

    /// Create a model client with a shared HTTP client.
    pub fn with_client(config: GeminiConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    fn api_url(&self, action: &str) -> String {
        format!(
            "{}/models/{}:{action}",
            self.config.base_url.trim_end_matches('/'),
            self.config.model,
        )
    }

    fn build_request(&self, session: &ChatSession, parts: &[ContentPart]) -> GenerateContentRequest {
        let history = session.history();
        GenerateContentRequest {
            contents: build_contents(&history, parts),
            system_instruction: self
                .config
                .system_instruction
                .as_ref()
                .filter(|s| !s.trim().is_empty())
                .map(|text| SystemInstruction {
                    parts: vec![SystemPart { text: text.clone() }],
                }),
            generation_config: GenerationConfig {
                max_output_tokens: self.config.max_output_tokens,
                temperature: self.config.temperature,
            },
            safety_settings: self
                .config
                .safety_settings
                .clone()
                .unwrap_or_else(default_safety_settings),
        }
    }
}

/// Join the text of the first candidate, skipping thinking parts.
fn extract_text(response: &GenerateContentResponse) -> ProviderResult<String> {
    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.clone())
    {
        return Err(ProviderError::Blocked { reason });
    }

    let Some(candidate) = response.candidates.first() else {
        return Err(ProviderError::EmptyResponse);
    };

    let text: String = candidate
        .content
        .iter()
        .flat_map(|c| c.parts.iter())
        .filter(|p| p.thought != Some(true))
        .filter_map(|p| p.text.as_deref())
        .collect();

    if text.is_empty() {
        return match candidate.finish_reason.as_deref() {
            Some(reason @ ("SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT")) => {
                Err(ProviderError::Blocked {
                    reason: reason.to_string(),
                })
            }
            _ => Err(ProviderError::EmptyResponse),
        };
    }
    Ok(text)
}

/// Parse an API error response body.
fn parse_api_error(body: &str, status: u16) -> (String, Option<String>) {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        let error = &json["error"];
        let message = error["message"]
            .as_str()
            .unwrap_or("Unknown error")
            .to_string();
        let code = error["status"].as_str().map(String::from);
        (message, code)
    } else {
        (format!("HTTP {status}: {body}"), None)
    }
}

#[async_trait]
impl ChatModel for GeminiModel {
    fn model(&self) -> &str {
        &self.config.model
    }

    #[instrument(skip_all, fields(model = %self.config.model, guild_id = %session.guild_id()))]
    async fn send_message(
        &self,
        session: &ChatSession,
        parts: Vec<ContentPart>,
    ) -> ProviderResult<String> {
        let request = self.build_request(session, &parts);
        debug!(
            history_turns = request.contents.len() - 1,
            parts = parts.len(),
            images = parts.iter().filter(|p| p.is_image()).count(),
            "sending generateContent"
        );

        let response = self
            .client
            .post(self.api_url("generateContent"))
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            let (message, code) = parse_api_error(&body_text, status.as_u16());
            error!(
                status = status.as_u16(),
                code = code.as_deref().unwrap_or("unknown"),
                "Gemini API error"
            );
            if status == reqwest::StatusCode::UNAUTHORIZED
                || status == reqwest::StatusCode::FORBIDDEN
            {
                return Err(ProviderError::Auth { message });
            }
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
                code,
            });
        }

        let body: GenerateContentResponse = response.json().await?;
        let text = extract_text(&body).inspect_err(|e| {
            warn!(error = %e, "Gemini returned no usable text");
        })?;

        session.append_exchange(parts, text.clone());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use relay_core::GuildId;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn config(base_url: &str) -> GeminiConfig {
        GeminiConfig {
            base_url: base_url.to_string(),
            system_instruction: Some("You are Yuuka.".into()),
            ..GeminiConfig::new("test-key", "gemini-test")
        }
    }

    fn ok_body(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": text}]},
                "finishReason": "STOP"
            }]
        })
    }

    #[test]
    fn api_url_names_model_without_key() {
        let model = GeminiModel::new(config("https://example.test/v1beta/"));
        let url = model.api_url("generateContent");
        assert_eq!(url, "https://example.test/v1beta/models/gemini-test:generateContent");
        assert!(!url.contains("test-key"));
    }

    #[test]
    fn request_carries_persona_and_history() {
        let model = GeminiModel::new(config("http://unused"));
        let session = ChatSession::new(GuildId::from("g"));
        session.append_exchange(vec![ContentPart::text("earlier")], "reply");

        let req = model.build_request(&session, &[ContentPart::text("now")]);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "You are Yuuka.");
        assert_eq!(json["contents"].as_array().unwrap().len(), 3);
        assert_eq!(json["contents"][2]["parts"][0]["text"], "now");
        assert_eq!(json["safetySettings"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn blank_persona_is_omitted() {
        let mut cfg = config("http://unused");
        cfg.system_instruction = Some("  \n".into());
        let model = GeminiModel::new(cfg);
        let session = ChatSession::new(GuildId::from("g"));
        let req = model.build_request(&session, &[ContentPart::text("x")]);
        assert!(req.system_instruction.is_none());
    }

    #[test]
    fn extract_skips_thoughts_and_joins_text() {
        let resp: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{"content": {"parts": [
                {"text": "hmm", "thought": true},
                {"text": "Hello, "},
                {"text": "Sensei."}
            ]}}]
        }))
        .unwrap();
        assert_eq!(extract_text(&resp).unwrap(), "Hello, Sensei.");
    }

    #[test]
    fn extract_reports_safety_finish() {
        let resp: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{"finishReason": "SAFETY"}]
        }))
        .unwrap();
        assert!(matches!(extract_text(&resp), Err(ProviderError::Blocked { .. })));
    }

    #[test]
    fn extract_empty_candidates() {
        let resp = GenerateContentResponse::default();
        assert!(matches!(extract_text(&resp), Err(ProviderError::EmptyResponse)));
    }

    #[test]
    fn parse_api_error_json() {
        let body = r#"{"error":{"status":"NOT_FOUND","message":"Model not found"}}"#;
        let (message, code) = parse_api_error(body, 404);
        assert_eq!(message, "Model not found");
        assert_eq!(code.as_deref(), Some("NOT_FOUND"));
    }

    #[test]
    fn parse_api_error_non_json() {
        let (message, code) = parse_api_error("bad gateway", 502);
        assert_eq!(message, "HTTP 502: bad gateway");
        assert!(code.is_none());
    }

    #[tokio::test]
    async fn send_message_success_appends_exchange() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-test:generateContent"))
            .and(header(API_KEY_HEADER, "test-key"))
            .and(body_partial_json(serde_json::json!({
                "systemInstruction": {"parts": [{"text": "You are Yuuka."}]}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(
                "```json\n{\"text\":\"hi\",\"emotion\":\"smile\"}\n```",
            )))
            .expect(1)
            .mount(&server)
            .await;

        let model = GeminiModel::new(config(&server.uri()));
        let session = ChatSession::new(GuildId::from("g1"));
        let text = model
            .send_message(&session, vec![ContentPart::text("hello")])
            .await
            .unwrap();

        assert!(text.contains("\"emotion\":\"smile\""));
        assert_eq!(session.len(), 2);
        assert_eq!(session.history()[0].parts[0].as_text(), Some("hello"));
    }

    #[tokio::test]
    async fn send_message_api_error_leaves_history() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "error": {"status": "INTERNAL", "message": "boom"}
            })))
            .mount(&server)
            .await;

        let model = GeminiModel::new(config(&server.uri()));
        let session = ChatSession::new(GuildId::from("g1"));
        let err = model
            .send_message(&session, vec![ContentPart::text("hello")])
            .await
            .unwrap_err();

        match err {
            ProviderError::Api { status, message, code } => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
                assert_eq!(code.as_deref(), Some("INTERNAL"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(session.is_empty());
    }

    #[tokio::test]
    async fn send_message_bad_key_is_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("denied"))
            .mount(&server)
            .await;

        let model = GeminiModel::new(config(&server.uri()));
        let session = ChatSession::new(GuildId::from("g1"));
        let err = model
            .send_message(&session, vec![ContentPart::text("hello")])
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Auth { .. }));
    }

    #[tokio::test]
    async fn send_message_sends_prior_turns() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "contents": [
                    {"role": "user", "parts": [{"text": "first"}]},
                    {"role": "model", "parts": [{"text": "one"}]},
                    {"role": "user", "parts": [{"text": "second"}]}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body("two")))
            .expect(1)
            .mount(&server)
            .await;

        let model = GeminiModel::new(config(&server.uri()));
        let session = ChatSession::new(GuildId::from("g1"));
        session.append_exchange(vec![ContentPart::text("first")], "one");

        let text = model
            .send_message(&session, vec![ContentPart::text("second")])
            .await
            .unwrap();
        assert_eq!(text, "two");
        assert_eq!(session.len(), 4);
    }

    #[tokio::test]
    async fn transport_error_does_not_reveal_key() {
        let mut cfg = config("http://127.0.0.1:1/v1beta");
        cfg.api_key = "AIza-SECRET-KEY".into();
        let model = GeminiModel::new(cfg);
        let session = ChatSession::new(GuildId::from("g1"));

        let err = model
            .send_message(&session, vec![ContentPart::text("hello")])
            .await
            .unwrap_err();

        assert_eq!(err.category(), "network");
        let shown = err.to_string();
        assert!(!shown.contains("AIza-SECRET-KEY"), "{shown}");
        assert!(!shown.contains("127.0.0.1"), "{shown}");
        assert!(session.is_empty());
    }
}
