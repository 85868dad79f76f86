use crate::model::Flashcard;
use crate::remote::{MessagesRequest, WireMessage};

/// How the create-screen input is interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceMode {
    /// A short topic description; the model picks the vocabulary.
    Topic,
    /// Pasted text; the model extracts vocabulary from it.
    Paste,
}

impl SourceMode {
    pub fn toggled(self) -> Self {
        match self {
            SourceMode::Topic => SourceMode::Paste,
            SourceMode::Paste => SourceMode::Topic,
        }
    }
}

const CARD_FORMAT: &str = r#"Answer with JSON only, no commentary, in exactly this shape:
{"title": "<short title in Russian>", "cards": [{"front": "...", "back": "..."}]}
Front: the German word or phrase. Nouns carry the article and the plural form,
for example "das Brot, die Brote". Verbs are given in the infinitive.
Back: the Russian translation, then an empty line, then one natural German
example sentence followed by " — " and its Russian translation."#;

pub fn generation_system_prompt() -> String {
    format!(
        "You create German vocabulary flashcards for Russian-speaking learners.\n{CARD_FORMAT}"
    )
}

pub fn topic_prompt(topic: &str, card_count: usize) -> String {
    format!(
        "Create {card_count} flashcards for the topic: {}\nPick the most useful everyday words for this topic.",
        topic.trim()
    )
}

pub fn paste_prompt(text: &str, card_count: usize) -> String {
    format!(
        "Extract up to {card_count} of the most useful German words and phrases from the text below \
         and turn them into flashcards.\n\n---\n{}\n---",
        text.trim()
    )
}

pub fn generation_request(
    mode: SourceMode,
    input: &str,
    card_count: usize,
    model: &str,
    max_tokens: u32,
) -> MessagesRequest {
    let user = match mode {
        SourceMode::Topic => topic_prompt(input, card_count),
        SourceMode::Paste => paste_prompt(input, card_count),
    };
    MessagesRequest {
        model: model.to_string(),
        max_tokens,
        system: generation_system_prompt(),
        messages: vec![WireMessage::user(user)],
    }
}

pub fn chat_system_prompt(current: Option<&Flashcard>) -> String {
    let mut prompt = String::from(
        "You are a friendly German tutor for a Russian-speaking learner. \
         Answer in Russian, keep answers short, and give German examples where useful.",
    );
    if let Some(card) = current {
        prompt.push_str(&format!(
            "\nThe learner is currently looking at the card \"{}\" ({}).",
            card.front,
            card.back.lines().next().unwrap_or_default()
        ));
    }
    prompt
}

pub fn chat_request(
    history: Vec<WireMessage>,
    current: Option<&Flashcard>,
    model: &str,
    max_tokens: u32,
) -> MessagesRequest {
    MessagesRequest {
        model: model.to_string(),
        max_tokens,
        system: chat_system_prompt(current),
        messages: history,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::Role;

    #[test]
    fn topic_and_paste_use_different_templates() {
        let topic = generation_request(SourceMode::Topic, " еда ", 12, "m", 4096);
        let paste = generation_request(SourceMode::Paste, "Ich gehe heute einkaufen.", 12, "m", 4096);
        assert!(topic.messages[0].content.contains("topic: еда"));
        assert!(topic.messages[0].content.contains("12 flashcards"));
        assert!(paste.messages[0].content.contains("Ich gehe heute einkaufen."));
        assert!(paste.messages[0].content.starts_with("Extract"));
        assert_eq!(topic.system, paste.system);
        assert_eq!(topic.messages[0].role, Role::User);
    }

    #[test]
    fn chat_prompt_mentions_current_card() {
        let card = Flashcard::new("das Brot", "хлеб\n\nIch kaufe Brot.");
        let prompt = chat_system_prompt(Some(&card));
        assert!(prompt.contains("\"das Brot\" (хлеб)"));
        assert!(!chat_system_prompt(None).contains("currently"));
    }

    #[test]
    fn source_mode_toggles() {
        assert_eq!(SourceMode::Topic.toggled(), SourceMode::Paste);
        assert_eq!(SourceMode::Paste.toggled(), SourceMode::Topic);
    }
}
