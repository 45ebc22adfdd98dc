//! Prompt assembly.
//!
//! Part order is fixed: one composite text block (knowledge text, the
//! sender's name, the message body), then every knowledge image, then the
//! message's image attachments (appended by the pipeline).

use std::fmt::Write as _;

use relay_core::ContentPart;

use crate::knowledge::{KnowledgeEntry, KnowledgeSnapshot};

/// Opens the knowledge section.
pub const KNOWLEDGE_HEADER: &str = "--- Reference material ---\n";
/// Closes the knowledge section.
pub const KNOWLEDGE_FOOTER: &str = "--- End ---\n\n";

/// Render the composite text block.
///
/// The knowledge section is present whenever the snapshot has any entry,
/// even if every entry is an image.
pub fn render_text_block(knowledge: &KnowledgeSnapshot, display_name: &str, body: &str) -> String {
    let mut text = String::new();
    if !knowledge.is_empty() {
        text.push_str(KNOWLEDGE_HEADER);
        for (name, entry) in knowledge.iter() {
            if let KnowledgeEntry::Text(content) = entry {
                let _ = write!(text, "\n[File: {name}]\n{content}\n");
            }
        }
        text.push_str(KNOWLEDGE_FOOTER);
    }
    let _ = write!(text, "My name is '{display_name}'.\n\n{body}");
    text
}

/// Build the text block followed by the knowledge images.
pub fn assemble(knowledge: &KnowledgeSnapshot, display_name: &str, body: &str) -> Vec<ContentPart> {
    let mut parts = vec![ContentPart::text(render_text_block(knowledge, display_name, body))];
    parts.extend(knowledge.values().filter_map(|entry| match entry {
        KnowledgeEntry::Image(image) => Some(ContentPart::image(image.clone())),
        KnowledgeEntry::Text(_) => None,
    }));
    parts
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use relay_core::ImageData;

    use super::*;

    fn snapshot(entries: Vec<(&str, KnowledgeEntry)>) -> KnowledgeSnapshot {
        Arc::new(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect::<BTreeMap<_, _>>(),
        )
    }

    #[test]
    fn no_knowledge_means_no_header() {
        let text = render_text_block(&snapshot(vec![]), "Sensei", "hello");
        assert_eq!(text, "My name is 'Sensei'.\n\nhello");
    }

    #[test]
    fn text_entries_are_rendered_with_file_names() {
        let snap = snapshot(vec![
            ("a.txt", KnowledgeEntry::Text("alpha".into())),
            ("b.md", KnowledgeEntry::Text("beta".into())),
        ]);
        let text = render_text_block(&snap, "Noa", "hi");
        assert_eq!(
            text,
            "--- Reference material ---\n\n[File: a.txt]\nalpha\n\n[File: b.md]\nbeta\n--- End ---\n\nMy name is 'Noa'.\n\nhi"
        );
    }

    #[test]
    fn image_only_knowledge_still_has_header() {
        let snap = snapshot(vec![(
            "pic.png",
            KnowledgeEntry::Image(ImageData::from_bytes("image/png", b"x")),
        )]);
        let text = render_text_block(&snap, "Noa", "hi");
        assert!(text.starts_with(KNOWLEDGE_HEADER));
        assert!(!text.contains("[File: pic.png]"));
    }

    #[test]
    fn assemble_puts_text_first_then_images() {
        let snap = snapshot(vec![
            ("a.png", KnowledgeEntry::Image(ImageData::from_bytes("image/png", b"1"))),
            ("b.txt", KnowledgeEntry::Text("text".into())),
            ("c.jpg", KnowledgeEntry::Image(ImageData::from_bytes("image/jpeg", b"2"))),
        ]);
        let parts = assemble(&snap, "Yuzu", "body");
        assert_eq!(parts.len(), 3);
        assert!(parts[0].as_text().unwrap().ends_with("My name is 'Yuzu'.\n\nbody"));
        assert!(parts[1].is_image());
        assert!(parts[2].is_image());
    }
}
