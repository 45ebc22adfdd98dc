//! Raw model text → [`ReplyPayload`].
//!
//! Decoding is best effort and never fails:
//! 1. pick a JSON candidate with the first [`CandidateStrategy`] that applies;
//! 2. parse it as an object with an optional string `text` and an optional
//!    `emotion` of any type;
//! 3. on success use those fields (`"..."` when `text` is absent, the
//!    `neutral` sprite when `emotion` is absent, not a string, or unknown);
//! 4. otherwise show the raw text with fence markers removed, with the
//!    `neutral` sprite.

use relay_core::{ReplyPayload, SpriteMap};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// Placeholder dialogue when the structured reply has no `text`.
pub const PLACEHOLDER_TEXT: &str = "...";

/// A way of locating the JSON object inside free-form model output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CandidateStrategy {
    /// Text between the first ```` ```json ```` marker and the next fence
    /// (or the end of input), trimmed.
    FencedJson,
    /// From the first `{` through the last `}`.
    BraceSpan,
}

impl CandidateStrategy {
    /// Strategies in the order they are tried.
    pub const ORDER: [Self; 2] = [Self::FencedJson, Self::BraceSpan];

    /// The candidate this strategy selects, or `None` if it does not apply.
    pub fn extract(self, raw: &str) -> Option<&str> {
        match self {
            Self::FencedJson => {
                let start = raw.find(JSON_FENCE)? + JSON_FENCE.len();
                let rest = &raw[start..];
                let end = rest.find(FENCE).unwrap_or(rest.len());
                Some(rest[..end].trim())
            }
            Self::BraceSpan => {
                let start = raw.find('{')?;
                let end = raw.rfind('}')?;
                (start < end).then(|| &raw[start..=end])
            }
        }
    }
}

/// The first applicable strategy's candidate.
///
/// Later strategies are only consulted when earlier ones do not apply, not
/// when their candidate fails to parse.
pub fn find_candidate(raw: &str) -> Option<(CandidateStrategy, &str)> {
    CandidateStrategy::ORDER
        .into_iter()
        .find_map(|s| s.extract(raw).map(|c| (s, c)))
}

#[derive(Debug, Deserialize)]
struct StructuredReply {
    #[serde(default)]
    text: Option<String>,
    /// Any JSON value; only strings can name a sprite.
    #[serde(default)]
    emotion: Option<Value>,
}

fn parse_structured(candidate: &str) -> Option<StructuredReply> {
    let value: Value = serde_json::from_str(candidate).ok()?;
    if !value.is_object() {
        return None;
    }
    serde_json::from_value(value).ok()
}

/// Raw text with fence markers removed, trimmed.
pub fn strip_fences(raw: &str) -> String {
    raw.replace(JSON_FENCE, "").replace(FENCE, "").trim().to_string()
}

/// Decodes model output against a sprite table.
#[derive(Clone, Debug, Default)]
pub struct ResponseDecoder {
    sprites: SpriteMap,
}

impl ResponseDecoder {
    /// Decoder over a custom sprite table.
    pub fn new(sprites: SpriteMap) -> Self {
        Self { sprites }
    }

    /// Sprite table in use.
    pub fn sprites(&self) -> &SpriteMap {
        &self.sprites
    }

    /// Decode raw model output. Never fails.
    pub fn decode(&self, raw: &str) -> ReplyPayload {
        let structured = find_candidate(raw).and_then(|(strategy, candidate)| {
            let parsed = parse_structured(candidate);
            if parsed.is_none() {
                debug!(?strategy, "reply candidate did not parse, using raw text");
            }
            parsed
        });

        match structured {
            Some(reply) => ReplyPayload::new(
                reply.text.unwrap_or_else(|| PLACEHOLDER_TEXT.to_string()),
                self.sprites.resolve(reply.emotion.as_ref().and_then(Value::as_str)),
            ),
            None => ReplyPayload::new(strip_fences(raw), self.sprites.neutral()),
        }
    }
}
