//! Grounded generation prompt.

use shuttlechat_core::knowledge::KnowledgeItem;
use shuttlechat_core::language::Language;

/// The fixed system instruction for a grounded reply.
pub fn system_instruction(language: Language) -> String {
    format!(
        "You are the customer assistant for an airport shuttle service. \
         Answer using only the knowledge supplied in the user message. \
         If the knowledge does not answer the question, say so and suggest contacting support. \
         Keep the answer short and respond in {}.",
        language.display_name()
    )
}

/// User content: the knowledge payload as JSON, then the raw message.
pub fn user_content(knowledge: &[KnowledgeItem], message: &str) -> Result<String, serde_json::Error> {
    let payload = serde_json::to_string_pretty(knowledge)?;
    Ok(format!("Knowledge:\n{payload}\n\nCustomer message:\n{message}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruction_names_language() {
        assert!(system_instruction(Language::En).contains("respond in English"));
        assert!(system_instruction(Language::Is).contains("respond in Icelandic"));
        assert!(system_instruction(Language::En).contains("only the knowledge"));
    }

    #[test]
    fn user_content_embeds_knowledge_and_message() {
        let items = vec![KnowledgeItem::new(
            "luggage",
            serde_json::json!({"allowance": "Two suitcases"}),
        )];
        let content = user_content(&items, "Can I bring skis?").unwrap();

        assert!(content.contains("\"type\": \"luggage\""));
        assert!(content.contains("Two suitcases"));
        assert!(content.ends_with("Can I bring skis?"));
    }
}
