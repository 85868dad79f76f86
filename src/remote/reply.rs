use icu_normalizer::ComposingNormalizerBorrowed;
use serde::Deserialize;
use thiserror::Error;

use crate::model::Flashcard;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplyError {
    #[error("the reply contained no text")]
    Empty,
    #[error("the reply is not valid card data: {0}")]
    Invalid(String),
    #[error("the reply contained no cards")]
    NoCards,
    #[error("card {index} has an empty {side} side")]
    BlankSide { index: usize, side: &'static str },
}

/// Cards and optional title extracted from a model reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedDeck {
    pub title: Option<String>,
    pub cards: Vec<Flashcard>,
}

#[derive(Deserialize)]
struct RawCard {
    #[serde(alias = "de")]
    front: String,
    #[serde(alias = "ru")]
    back: String,
    #[serde(default)]
    example: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ReplyShape {
    Deck {
        #[serde(default)]
        title: Option<String>,
        cards: Vec<RawCard>,
    },
    Cards(Vec<RawCard>),
}

/// Remove markdown code-fence markers (with or without a language tag) and
/// keep what they enclose. Text without a fence is returned trimmed.
pub fn strip_code_fences(text: &str) -> String {
    const FENCE: &str = "```";
    let Some(open) = text.find(FENCE) else {
        return text.trim().to_string();
    };
    let after = &text[open + FENCE.len()..];
    let tag_len = after
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(after.len());
    let inner = &after[tag_len..];
    let inner = inner.find(FENCE).map_or(inner, |close| &inner[..close]);
    inner.trim().to_string()
}

fn nfc(text: &str) -> String {
    ComposingNormalizerBorrowed::new_nfc()
        .normalize(text.trim())
        .into_owned()
}

pub fn parse_reply(text: &str) -> Result<GeneratedDeck, ReplyError> {
    let body = strip_code_fences(text);
    if body.is_empty() {
        return Err(ReplyError::Empty);
    }

    let shape: ReplyShape =
        serde_json::from_str(&body).map_err(|e| ReplyError::Invalid(e.to_string()))?;
    let (title, raw_cards) = match shape {
        ReplyShape::Deck { title, cards } => (title, cards),
        ReplyShape::Cards(cards) => (None, cards),
    };
    if raw_cards.is_empty() {
        return Err(ReplyError::NoCards);
    }

    let mut cards = Vec::with_capacity(raw_cards.len());
    for (index, raw) in raw_cards.into_iter().enumerate() {
        let front = nfc(&raw.front);
        let mut back = nfc(&raw.back);
        if front.is_empty() {
            return Err(ReplyError::BlankSide { index, side: "front" });
        }
        if back.is_empty() {
            return Err(ReplyError::BlankSide { index, side: "back" });
        }
        if let Some(example) = raw.example.as_deref().map(nfc).filter(|e| !e.is_empty()) {
            back = format!("{back}\n\n{example}");
        }
        cards.push(Flashcard { front, back });
    }

    let title = title.map(|t| nfc(&t)).filter(|t| !t.is_empty());
    Ok(GeneratedDeck { title, cards })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fenced_array() {
        let reply = "```json\n[{\"front\":\"das Brot, die Brote\",\"back\":\"хлеб\\n\\nIch kaufe frisches Brot. — Я покупаю свежий хлеб.\"}]\n```";
        let deck = parse_reply(reply).unwrap();
        assert_eq!(deck.title, None);
        assert_eq!(deck.cards.len(), 1);
        assert_eq!(deck.cards[0].front, "das Brot, die Brote");
        assert_eq!(
            deck.cards[0].back,
            "хлеб\n\nIch kaufe frisches Brot. — Я покупаю свежий хлеб."
        );
    }

    #[test]
    fn parses_single_line_fence() {
        let deck = parse_reply("```json [{\"front\":\"das Brot\",\"back\":\"хлеб\"}] ```").unwrap();
        assert_eq!(deck.cards.len(), 1);
        assert_eq!(deck.cards[0].front, "das Brot");
        assert_eq!(strip_code_fences("```[1]```"), "[1]");
        assert_eq!(strip_code_fences("  [1]\n"), "[1]");
    }

    #[test]
    fn parses_titled_object() {
        let reply = r#"{"title":"Еда","cards":[{"front":"der Käse","back":"сыр"}]}"#;
        let deck = parse_reply(reply).unwrap();
        assert_eq!(deck.title.as_deref(), Some("Еда"));
        assert_eq!(deck.cards[0].back, "сыр");
    }

    #[test]
    fn accepts_vocab_field_names() {
        let reply = r#"[{"de":"die Milch","ru":"молоко","example":"Ich trinke Milch."}]"#;
        let deck = parse_reply(reply).unwrap();
        assert_eq!(deck.cards[0].front, "die Milch");
        assert_eq!(deck.cards[0].back, "молоко\n\nIch trinke Milch.");
    }

    #[test]
    fn normalizes_decomposed_umlauts() {
        let decomposed = "der Ka\u{0308}se";
        let reply = format!(r#"[{{"front":"{decomposed}","back":"сыр"}}]"#);
        let deck = parse_reply(&reply).unwrap();
        assert_eq!(deck.cards[0].front, "der K\u{e4}se");
    }

    #[test]
    fn rejects_prose() {
        assert!(matches!(
            parse_reply("Sure! Here are your cards."),
            Err(ReplyError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_empty_and_missing_fields() {
        assert_eq!(parse_reply("```\n```"), Err(ReplyError::Empty));
        assert_eq!(parse_reply("[]"), Err(ReplyError::NoCards));
        assert!(matches!(
            parse_reply(r#"[{"front":"x"}]"#),
            Err(ReplyError::Invalid(_))
        ));
        assert_eq!(
            parse_reply(r#"[{"front":"x","back":"  "}]"#),
            Err(ReplyError::BlankSide { index: 0, side: "back" })
        );
    }
}
