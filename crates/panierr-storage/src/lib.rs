//! # panierr-storage: Storage Adapters for Panierr
//!
//! The engine persists its `{cartItems, discountsApplied}` blob through a
//! [`StorageProvider`]. The engine is handed one explicitly and never
//! reaches for a global store.
//!
//! ## Modules
//!
//! - [`provider`] - The `StorageProvider` trait
//! - [`memory`] - In-process store, shareable between engines
//! - [`file`] - Device-local store, one file per key
//! - [`error`] - Storage error types
//!
//! ## Example
//! ```rust
//! use panierr_storage::{MemoryStorage, StorageProvider};
//!
//! let storage = MemoryStorage::new();
//! storage.set("panierrCartItems", "{}").unwrap();
//! assert_eq!(storage.get("panierrCartItems").unwrap().as_deref(), Some("{}"));
//! ```

pub mod error;
pub mod file;
pub mod memory;
pub mod provider;

pub use error::{StorageError, StorageResult};
pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use provider::StorageProvider;
