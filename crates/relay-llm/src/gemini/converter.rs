//! Session turns and content parts to Gemini request contents.

use relay_core::{ContentPart, Role, Turn};

use super::types::{GeminiContent, GeminiPart, InlineDataContent};

/// Convert one content part.
pub fn convert_part(part: &ContentPart) -> GeminiPart {
    match part {
        ContentPart::Text { text } => GeminiPart::Text { text: text.clone() },
        ContentPart::Image { image } => GeminiPart::InlineData {
            inline_data: InlineDataContent {
                mime_type: image.mime_type.clone(),
                data: image.data.clone(),
            },
        },
    }
}

fn role_name(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Model => "model",
    }
}

/// Build request contents: the recorded history followed by the new user turn.
pub fn build_contents(history: &[Turn], new_parts: &[ContentPart]) -> Vec<GeminiContent> {
    history
        .iter()
        .map(|turn| GeminiContent {
            role: role_name(turn.role).to_string(),
            parts: turn.parts.iter().map(convert_part).collect(),
        })
        .chain(std::iter::once(GeminiContent {
            role: "user".to_string(),
            parts: new_parts.iter().map(convert_part).collect(),
        }))
        .collect()
}

#[cfg(test)]
mod tests {
    use relay_core::ImageData;

    use super::*;

    #[test]
    fn image_part_becomes_inline_data() {
        let part = ContentPart::image(ImageData::from_bytes("image/png", b"abc"));
        match convert_part(&part) {
            GeminiPart::InlineData { inline_data } => {
                assert_eq!(inline_data.mime_type, "image/png");
                assert_eq!(inline_data.data, "YWJj");
            }
            GeminiPart::Text { .. } => panic!("expected inline data"),
        }
    }

    #[test]
    fn history_precedes_new_turn() {
        let history = vec![
            Turn::user(vec![ContentPart::text("hello")]),
            Turn::model("hi"),
        ];
        let contents = build_contents(&history, &[ContentPart::text("again")]);

        let roles: Vec<&str> = contents.iter().map(|c| c.role.as_str()).collect();
        assert_eq!(roles, vec!["user", "model", "user"]);
        match &contents[2].parts[0] {
            GeminiPart::Text { text } => assert_eq!(text, "again"),
            GeminiPart::InlineData { .. } => panic!("expected text"),
        }
    }

    #[test]
    fn empty_history_yields_single_turn() {
        let contents = build_contents(&[], &[ContentPart::text("first")]);
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0].role, "user");
    }
}
