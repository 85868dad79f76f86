use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Composite `category:card_id` key for a card's known flag.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProgressKey {
    pub category: String,
    pub card_id: String,
}

impl ProgressKey {
    pub fn new(category: &str, card_id: &str) -> Self {
        Self {
            category: category.to_string(),
            card_id: card_id.to_string(),
        }
    }
}

impl fmt::Display for ProgressKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.category, self.card_id)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressMap {
    known: BTreeMap<String, bool>,
}

impl ProgressMap {
    pub fn is_known(&self, key: &ProgressKey) -> bool {
        self.known.get(&key.to_string()).copied().unwrap_or(false)
    }

    pub fn set_known(&mut self, key: &ProgressKey, known: bool) {
        self.known.insert(key.to_string(), known);
    }

    pub fn known_in(&self, category: &str, card_ids: &[String]) -> usize {
        card_ids
            .iter()
            .filter(|id| self.is_known(&ProgressKey::new(category, id)))
            .count()
    }

    pub fn clear(&mut self) {
        self.known.clear();
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_formats_as_category_colon_id() {
        assert_eq!(ProgressKey::new("essen", "brot").to_string(), "essen:brot");
    }

    #[test]
    fn unknown_by_default_and_toggles() {
        let mut map = ProgressMap::default();
        let key = ProgressKey::new("essen", "brot");
        assert!(!map.is_known(&key));
        map.set_known(&key, true);
        assert!(map.is_known(&key));
        map.set_known(&key, false);
        assert!(!map.is_known(&key));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn known_in_counts_only_matching_category() {
        let mut map = ProgressMap::default();
        map.set_known(&ProgressKey::new("essen", "brot"), true);
        map.set_known(&ProgressKey::new("reisen", "brot"), true);
        let ids = vec!["brot".to_string(), "kaese".to_string()];
        assert_eq!(map.known_in("essen", &ids), 1);
    }

    #[test]
    fn serializes_as_flat_object() {
        let mut map = ProgressMap::default();
        map.set_known(&ProgressKey::new("essen", "brot"), true);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"essen:brot":true}"#);
    }
}
