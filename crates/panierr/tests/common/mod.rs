//! Test doubles for engine integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use panierr::{
    CartEvent, CartItem, EventKind, MemoryStorage, Money, Panierr, StorageError, StorageProvider,
};
use panierr_storage::StorageResult;

/// Storage that records every `set` call and otherwise behaves like a
/// `MemoryStorage`.
#[derive(Debug, Clone, Default)]
pub struct RecordingStorage {
    inner: MemoryStorage,
    writes: Arc<Mutex<Vec<(String, String)>>>,
}

impl RecordingStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// All `(key, value)` pairs written, oldest first.
    pub fn writes(&self) -> Vec<(String, String)> {
        self.writes.lock().unwrap().clone()
    }

    pub fn last_write(&self) -> Option<String> {
        self.writes.lock().unwrap().last().map(|(_, v)| v.clone())
    }
}

impl StorageProvider for RecordingStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.writes
            .lock()
            .unwrap()
            .push((key.to_string(), value.to_string()));
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.inner.remove(key)
    }
}

/// Storage whose every call fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingStorage;

impl StorageProvider for FailingStorage {
    fn get(&self, _key: &str) -> StorageResult<Option<String>> {
        Err(StorageError::Unavailable("read refused".into()))
    }

    fn set(&self, _key: &str, _value: &str) -> StorageResult<()> {
        Err(StorageError::Unavailable("quota exceeded".into()))
    }

    fn remove(&self, _key: &str) -> StorageResult<()> {
        Err(StorageError::Unavailable("remove refused".into()))
    }
}

/// Subscribes to every event kind and collects what is emitted.
pub fn record_events(cart: &mut Panierr) -> Arc<Mutex<Vec<CartEvent>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    for kind in EventKind::ALL {
        let sink = Arc::clone(&log);
        cart.on(kind, move |event, _| sink.lock().unwrap().push(event.clone()));
    }
    log
}

/// Error messages among recorded events.
pub fn error_messages(log: &Arc<Mutex<Vec<CartEvent>>>) -> Vec<String> {
    log.lock()
        .unwrap()
        .iter()
        .filter_map(|event| match event {
            CartEvent::Error { message, .. } => Some(message.clone()),
            _ => None,
        })
        .collect()
}

pub fn item(id: &str, price: i64, quantity: u32) -> CartItem {
    CartItem::new(id, format!("Product {}", id), Money::from_major(price), quantity)
}
