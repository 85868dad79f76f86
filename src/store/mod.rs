pub mod file_store;
pub mod library;
pub mod memory;
pub mod schema;

use thiserror::Error;

pub use file_store::FileStorage;
pub use library::Library;
pub use memory::MemoryStorage;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("storage quota exceeded")]
    QuotaExceeded,
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("stored record '{key}' is corrupt: {message}")]
    Corrupt { key: String, message: String },
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::StorageFull => StorageError::QuotaExceeded,
            _ => StorageError::Unavailable(err.to_string()),
        }
    }
}

/// Synchronous string key-value storage. Implementations do not order
/// listings; callers sort what they read back.
pub trait Storage {
    fn put(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
    fn list_keys_by_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError>;
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn put(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).put(key, value)
    }

    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }

    fn list_keys_by_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        (**self).list_keys_by_prefix(prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_full_maps_to_quota() {
        let err = std::io::Error::from(std::io::ErrorKind::StorageFull);
        assert_eq!(StorageError::from(err), StorageError::QuotaExceeded);
    }

    #[test]
    fn other_io_errors_map_to_unavailable() {
        let err = std::io::Error::from(std::io::ErrorKind::PermissionDenied);
        assert!(matches!(StorageError::from(err), StorageError::Unavailable(_)));
    }
}
