use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::card::Flashcard;

/// Longest title shown or stored for a set, in characters.
pub const TITLE_MAX_CHARS: usize = 60;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashcardSet {
    pub id: String,
    pub title: String,
    pub cards: Vec<Flashcard>,
    pub created_at: DateTime<Utc>,
    pub card_count: usize,
}

impl FlashcardSet {
    /// Build a set stamped with `created_at`. The id is derived from the
    /// creation time; the store appends a suffix if it collides.
    pub fn new(title: &str, cards: Vec<Flashcard>, created_at: DateTime<Utc>) -> Self {
        let card_count = cards.len();
        Self {
            id: created_at.timestamp_millis().to_string(),
            title: truncate_title(title),
            cards,
            created_at,
            card_count,
        }
    }
}

pub fn truncate_title(title: &str) -> String {
    let trimmed = title.trim();
    if trimmed.chars().count() <= TITLE_MAX_CHARS {
        trimmed.to_string()
    } else {
        trimmed.chars().take(TITLE_MAX_CHARS).collect()
    }
}

/// Pick the title for a set being saved: the model-provided title, then the
/// localized `default_title`, then the user's topic text (first line only).
pub fn resolve_title(generated: Option<&str>, topic: &str, default_title: &str) -> String {
    let topic_line = topic.lines().map(str::trim).find(|l| !l.is_empty());
    [generated, Some(default_title), topic_line]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|t| !t.is_empty())
        .map(truncate_title)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn new_set_counts_cards_and_derives_id_from_time() {
        let cards = vec![Flashcard::new("a", "b"), Flashcard::new("c", "d")];
        let set = FlashcardSet::new("Еда", cards, ts());
        assert_eq!(set.card_count, 2);
        assert_eq!(set.id, ts().timestamp_millis().to_string());
        assert_eq!(set.title, "Еда");
    }

    #[test]
    fn long_titles_are_truncated_by_chars() {
        let long = "ж".repeat(80);
        let set = FlashcardSet::new(&long, Vec::new(), ts());
        assert_eq!(set.title.chars().count(), TITLE_MAX_CHARS);
    }

    #[test]
    fn resolve_title_prefers_generated() {
        assert_eq!(resolve_title(Some("Lebensmittel"), "еда", "Без названия"), "Lebensmittel");
    }

    #[test]
    fn resolve_title_falls_back_to_default_then_topic() {
        assert_eq!(resolve_title(Some("   "), "еда", "Без названия"), "Без названия");
        assert_eq!(resolve_title(None, "еда", "Без названия"), "Без названия");
        assert_eq!(
            resolve_title(None, "\n  das Brot\nder Käse", "  "),
            "das Brot"
        );
        assert_eq!(resolve_title(None, "   ", ""), "");
    }
}
