use serde::{Deserialize, Serialize};

use crate::model::{FlashcardSet, ProgressMap};

pub const SCHEMA_VERSION: u32 = 1;

/// Canonical key prefix for saved sets: `flashset:<id>`.
pub const SET_PREFIX: &str = "flashset:";
/// Prefix written by older builds. Records under it are not read.
pub const LEGACY_SET_PREFIX: &str = "flashset_";
pub const PROGRESS_KEY: &str = "progress";

pub fn set_key(id: &str) -> String {
    format!("{SET_PREFIX}{id}")
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetRecord {
    pub schema_version: u32,
    #[serde(flatten)]
    pub set: FlashcardSet,
}

impl SetRecord {
    pub fn new(set: FlashcardSet) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            set,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub known: ProgressMap,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Flashcard;
    use chrono::{TimeZone, Utc};

    #[test]
    fn set_record_layout_is_flat() {
        let created = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let set = FlashcardSet::new("Еда", vec![Flashcard::new("das Brot", "хлеб")], created);
        let json = serde_json::to_value(SetRecord::new(set)).unwrap();
        assert_eq!(json["schema_version"], 1);
        assert_eq!(json["title"], "Еда");
        assert_eq!(json["card_count"], 1);
        assert_eq!(json["created_at"], "2026-01-02T03:04:05Z");
        assert_eq!(json["cards"][0]["front"], "das Brot");
    }

    #[test]
    fn progress_record_tolerates_missing_fields() {
        let record: ProgressRecord = serde_json::from_str("{}").unwrap();
        assert_eq!(record.schema_version, SCHEMA_VERSION);
        assert!(record.known.is_empty());
    }

    #[test]
    fn set_key_uses_canonical_prefix() {
        assert_eq!(set_key("42"), "flashset:42");
        assert!(!set_key("42").starts_with(LEGACY_SET_PREFIX));
    }
}
