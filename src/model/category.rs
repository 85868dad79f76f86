use rust_embed::Embed;
use serde::{Deserialize, Serialize};

use crate::model::card::{Flashcard, VocabCard};

#[derive(Embed)]
#[folder = "assets/categories/"]
struct CategoryAssets;

/// A bundled vocabulary category (variant 2 home screen entry).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub order: u32,
    pub cards: Vec<VocabCard>,
}

impl Category {
    pub fn flashcards(&self) -> Vec<Flashcard> {
        self.cards.iter().map(VocabCard::to_flashcard).collect()
    }

    pub fn card_ids(&self) -> Vec<String> {
        self.cards.iter().map(|c| c.id.clone()).collect()
    }

    /// Load every embedded category, ordered for display. Files that fail to
    /// parse are skipped.
    pub fn load_all() -> Vec<Category> {
        let mut categories: Vec<Category> = CategoryAssets::iter()
            .filter(|name| name.ends_with(".json"))
            .filter_map(|name| {
                let file = CategoryAssets::get(&name)?;
                match serde_json::from_slice::<Category>(file.data.as_ref()) {
                    Ok(category) => Some(category),
                    Err(e) => {
                        log::warn!("skipping category asset {name}: {e}");
                        None
                    }
                }
            })
            .filter(|c| !c.cards.is_empty())
            .collect();
        categories.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
        categories
    }
}
