use serde::{Deserialize, Serialize};

/// A single front/back learning unit. Either side may contain embedded
/// newlines, which render as paragraph breaks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub front: String,
    pub back: String,
}

impl Flashcard {
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            front: front.into(),
            back: back.into(),
        }
    }
}

/// A term/translation/example card as shipped in the static category data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabCard {
    /// Stable identifier within its category; progress is keyed by it.
    pub id: String,
    pub de: String,
    pub ru: String,
    #[serde(default)]
    pub example: String,
}

impl VocabCard {
    pub fn to_flashcard(&self) -> Flashcard {
        let back = if self.example.trim().is_empty() {
            self.ru.clone()
        } else {
            format!("{}\n\n{}", self.ru, self.example)
        };
        Flashcard::new(self.de.clone(), back)
    }
}

/// Split card text into display paragraphs. Blank lines are kept so that a
/// translation followed by an empty line and an example keeps its shape.
pub fn paragraphs(text: &str) -> Vec<&str> {
    text.split('\n').map(|line| line.trim_end_matches('\r')).collect()
}
