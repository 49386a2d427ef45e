//! Local key/value storage port.

use super::error::StorageError;

/// Browser-style local storage: string values under string keys.
pub trait StorageProvider: Send + Sync {
    /// Load a value by key, `None` if nothing is stored.
    fn load(&self, key: &str) -> Option<String>;

    /// Store a value, replacing any previous one.
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a value by key.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
