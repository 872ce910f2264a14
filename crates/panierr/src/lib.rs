//! # panierr: Shopping Cart Engine
//!
//! A headless cart engine for storefronts: it keeps the shopper's items and
//! the active discount, computes totals, persists through a pluggable
//! storage adapter, and tells listeners about every change.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         panierr (THIS CRATE)                            │
//! │                                                                         │
//! │  ┌────────────────────┐   ┌────────────────────┐   ┌─────────────────┐ │
//! │  │ PresentationBinder │   │ CartPreview        │   │ CheckoutFlow    │ │
//! │  │ markup → engine    │   │ live badge         │   │ payment intent  │ │
//! │  └─────────┬──────────┘   └─────────┬──────────┘   └────────┬────────┘ │
//! │            │ add/remove/update       │ on/off                │ totals  │
//! │            ▼                         ▼                       ▼         │
//! │  ┌─────────────────────────────────────────────────────────────────┐  │
//! │  │  Panierr (engine)   items • discounts • EventBus • config       │  │
//! │  └──────────────┬───────────────────────────────────┬──────────────┘  │
//! │                 │ CartSnapshot (JSON)                │ totals/format   │
//! │                 ▼                                    ▼                 │
//! │        panierr-storage                        panierr-core             │
//! │        StorageProvider                        Money, CartItem, ...     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`engine`] - The cart engine, its builder and the read-only view
//! - [`events`] - Cart events and listener handles
//! - [`snapshot`] - The persisted blob
//! - [`config`] - `PanierrConfig` loading, validation and saving
//! - [`shared`] - Thread-safe engine handle
//! - [`binder`] - Markup actions and rendering
//! - [`widgets`] - Preview badge and checkout flow
//! - [`error`] - Error types

pub mod binder;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod shared;
pub mod snapshot;
pub mod widgets;

pub use binder::{CartAction, DataAttributes, ElementData, PresentationBinder, RenderedTotals};
pub use config::PanierrConfig;
pub use engine::{CartView, ErrorCallback, Panierr, PanierrBuilder};
pub use error::{BinderError, CartError, CheckoutError, ConfigError, SnapshotError};
pub use events::{CartEvent, EventKind, Listener, ListenerId};
pub use shared::SharedCart;
pub use snapshot::CartSnapshot;

pub use panierr_core::{
    CartItem, CartTotals, CurrencyFormat, CurrencyStyle, Discount, DiscountKind, Money,
    PriceFormatter,
};
pub use panierr_storage::{FileStorage, MemoryStorage, StorageError, StorageProvider};
