//! # Storage Provider
//!
//! The capability the engine persists through. Keys are opaque strings and
//! values are serialized JSON; adapters own durability, not interpretation.

use std::sync::Arc;

use crate::error::StorageResult;

/// A string key-value store.
///
/// Methods take `&self` so one adapter can be shared between engines behind
/// an `Arc`. Adapters use interior mutability where they need it.
pub trait StorageProvider: Send + Sync {
    /// Returns the stored value, or `None` when the key is absent.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Deletes `key`. Removing an absent key succeeds.
    fn remove(&self, key: &str) -> StorageResult<()>;
}

impl<T: StorageProvider + ?Sized> StorageProvider for Arc<T> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }
}

impl<T: StorageProvider + ?Sized> StorageProvider for Box<T> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }
}
