use crate::model::{FlashcardSet, ProgressMap};
use crate::store::schema::{
    LEGACY_SET_PREFIX, PROGRESS_KEY, ProgressRecord, SET_PREFIX, SCHEMA_VERSION, SetRecord,
    set_key,
};
use crate::store::{Storage, StorageError};

/// Typed access to saved sets and study progress on top of a raw [`Storage`].
pub struct Library<S: Storage> {
    storage: S,
}

impl<S: Storage> Library<S> {
    pub fn new(storage: S) -> Self {
        let library = Self { storage };
        if let Ok(legacy) = library.storage.list_keys_by_prefix(LEGACY_SET_PREFIX) {
            if !legacy.is_empty() {
                log::warn!(
                    "ignoring {} set(s) stored under the legacy '{LEGACY_SET_PREFIX}' prefix",
                    legacy.len()
                );
            }
        }
        library
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Persist `set` under a fresh key. If its time-derived id is already
    /// taken, a `-N` suffix is appended. Returns the set as stored.
    pub fn save_set(&mut self, mut set: FlashcardSet) -> Result<FlashcardSet, StorageError> {
        let base_id = set.id.clone();
        let mut suffix = 0;
        while self.storage.get(&set_key(&set.id))?.is_some() {
            suffix += 1;
            set.id = format!("{base_id}-{suffix}");
        }

        let record = SetRecord::new(set);
        let json = serde_json::to_string(&record).map_err(|e| StorageError::Corrupt {
            key: set_key(&record.set.id),
            message: e.to_string(),
        })?;
        self.storage.put(&set_key(&record.set.id), &json)?;
        log::debug!(
            "saved set {} ({} cards)",
            record.set.id,
            record.set.card_count
        );
        Ok(record.set)
    }

    pub fn load_set(&self, id: &str) -> Result<Option<FlashcardSet>, StorageError> {
        let key = set_key(id);
        match self.storage.get(&key)? {
            Some(json) => parse_set(&key, &json).map(Some),
            None => Ok(None),
        }
    }

    /// All saved sets, newest first. Unreadable records are skipped.
    pub fn list_sets(&self) -> Result<Vec<FlashcardSet>, StorageError> {
        let mut sets = Vec::new();
        for key in self.storage.list_keys_by_prefix(SET_PREFIX)? {
            let Some(json) = self.storage.get(&key)? else {
                continue;
            };
            match parse_set(&key, &json) {
                Ok(set) => sets.push(set),
                Err(e) => log::warn!("{e}"),
            }
        }
        sets.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(sets)
    }

    pub fn set_count(&self) -> Result<usize, StorageError> {
        Ok(self.storage.list_keys_by_prefix(SET_PREFIX)?.len())
    }

    pub fn delete_set(&mut self, id: &str) -> Result<(), StorageError> {
        self.storage.remove(&set_key(id))?;
        log::debug!("deleted set {id}");
        Ok(())
    }

    pub fn load_progress(&self) -> Result<ProgressMap, StorageError> {
        match self.storage.get(PROGRESS_KEY)? {
            Some(json) => {
                let record: ProgressRecord =
                    serde_json::from_str(&json).map_err(|e| StorageError::Corrupt {
                        key: PROGRESS_KEY.to_string(),
                        message: e.to_string(),
                    })?;
                Ok(record.known)
            }
            None => Ok(ProgressMap::default()),
        }
    }

    pub fn save_progress(&mut self, progress: &ProgressMap) -> Result<(), StorageError> {
        let record = ProgressRecord {
            schema_version: SCHEMA_VERSION,
            known: progress.clone(),
        };
        let json = serde_json::to_string(&record).map_err(|e| StorageError::Corrupt {
            key: PROGRESS_KEY.to_string(),
            message: e.to_string(),
        })?;
        self.storage.put(PROGRESS_KEY, &json)
    }
}

fn parse_set(key: &str, json: &str) -> Result<FlashcardSet, StorageError> {
    let record: SetRecord = serde_json::from_str(json).map_err(|e| StorageError::Corrupt {
        key: key.to_string(),
        message: e.to_string(),
    })?;
    if record.schema_version != SCHEMA_VERSION {
        return Err(StorageError::Corrupt {
            key: key.to_string(),
            message: format!("unsupported schema version {}", record.schema_version),
        });
    }
    Ok(record.set)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::model::{Flashcard, ProgressKey};
    use crate::store::MemoryStorage;

    fn sample_set(minute: u32) -> FlashcardSet {
        let created = Utc.with_ymd_and_hms(2026, 5, 1, 10, minute, 0).unwrap();
        FlashcardSet::new(
            &format!("set {minute}"),
            vec![
                Flashcard::new("das Brot, die Brote", "хлеб\n\nIch kaufe frisches Brot."),
                Flashcard::new("der Käse", "сыр"),
            ],
            created,
        )
    }

    #[test]
    fn save_then_list_reconstructs_equal_set() {
        let mut library = Library::new(MemoryStorage::new());
        let set = sample_set(1);
        let stored = library.save_set(set.clone()).unwrap();
        assert_eq!(stored, set);

        let keys = library.storage().list_keys_by_prefix(SET_PREFIX).unwrap();
        assert_eq!(keys, vec![set_key(&set.id)]);
        let listed = library.list_sets().unwrap();
        assert_eq!(listed, vec![set]);
    }

    #[test]
    fn list_is_newest_first() {
        let mut library = Library::new(MemoryStorage::new());
        library.save_set(sample_set(1)).unwrap();
        library.save_set(sample_set(30)).unwrap();
        library.save_set(sample_set(15)).unwrap();
        let titles: Vec<_> = library
            .list_sets()
            .unwrap()
            .into_iter()
            .map(|s| s.title)
            .collect();
        assert_eq!(titles, vec!["set 30", "set 15", "set 1"]);
    }

    #[test]
    fn colliding_ids_get_suffix() {
        let mut library = Library::new(MemoryStorage::new());
        let a = library.save_set(sample_set(5)).unwrap();
        let b = library.save_set(sample_set(5)).unwrap();
        let c = library.save_set(sample_set(5)).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(b.id, format!("{}-1", a.id));
        assert_eq!(c.id, format!("{}-2", a.id));
        assert_eq!(library.set_count().unwrap(), 3);
    }

    #[test]
    fn corrupt_and_legacy_records_are_skipped() {
        let mut storage = MemoryStorage::new();
        storage.put("flashset:bad", "not json").unwrap();
        storage
            .put("flashset_123", r#"{"id":"123","title":"old","cards":[],"createdAt":1}"#)
            .unwrap();
        let mut library = Library::new(storage);
        library.save_set(sample_set(2)).unwrap();
        let sets = library.list_sets().unwrap();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].title, "set 2");
    }

    #[test]
    fn delete_removes_set() {
        let mut library = Library::new(MemoryStorage::new());
        let set = library.save_set(sample_set(3)).unwrap();
        library.delete_set(&set.id).unwrap();
        assert_eq!(library.load_set(&set.id).unwrap(), None);
        assert_eq!(library.set_count().unwrap(), 0);
    }

    #[test]
    fn progress_round_trips() {
        let mut library = Library::new(MemoryStorage::new());
        assert!(library.load_progress().unwrap().is_empty());

        let mut progress = ProgressMap::default();
        progress.set_known(&ProgressKey::new("essen", "brot"), true);
        library.save_progress(&progress).unwrap();
        assert_eq!(library.load_progress().unwrap(), progress);
    }

    #[test]
    fn quota_error_surfaces_from_save() {
        let mut library = Library::new(MemoryStorage::with_quota(16));
        assert_eq!(
            library.save_set(sample_set(4)),
            Err(StorageError::QuotaExceeded)
        );
    }

    #[test]
    fn future_schema_version_is_rejected() {
        let mut library = Library::new(MemoryStorage::new());
        let set = sample_set(6);
        let mut record = serde_json::to_value(SetRecord::new(set.clone())).unwrap();
        record["schema_version"] = serde_json::json!(99);
        library
            .storage_mut()
            .put(&set_key(&set.id), &record.to_string())
            .unwrap();
        assert!(matches!(
            library.load_set(&set.id),
            Err(StorageError::Corrupt { .. })
        ));
    }
}
