//! # panierr-core: Pure Cart Logic for Panierr
//!
//! The data model and arithmetic of the shopping cart, with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Panierr Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │          Host (storefront, CLI, checkout, preview badge)        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │        panierr (engine, events, binder, widgets, config)        │   │
//! │  └──────────────┬──────────────────────────────┬───────────────────┘   │
//! │                 │                              │                        │
//! │  ┌──────────────▼──────────────────┐  ┌────────▼───────────────────┐   │
//! │  │  ★ panierr-core (THIS CRATE) ★  │  │      panierr-storage       │   │
//! │  │  types • money • totals         │  │  StorageProvider, memory,  │   │
//! │  │  format • validation • error    │  │  file                      │   │
//! │  └─────────────────────────────────┘  └────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - CartItem, Discount, CartTotals
//! - [`money`] - Money type with integer arithmetic
//! - [`totals`] - Totals and discount arithmetic
//! - [`format`] - Locale-aware price rendering
//! - [`validation`] - Input and snapshot validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use panierr_core::{totals, CartItem, Discount, Money, PriceFormatter};
//!
//! let items = vec![CartItem::new("tee", "T-Shirt", Money::from_cents(1999), 2)];
//! let totals = totals::calculate(&items, &[Discount::fixed("FIVE", 5.0)]);
//!
//! assert_eq!(totals.final_price.cents(), 3498);
//! assert_eq!(PriceFormatter::default().format(totals.final_price), "$34.98");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod format;
pub mod money;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use format::{CurrencyFormat, CurrencyStyle, PriceFormatter};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Storage key the cart is persisted under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "panierrCartItems";

pub use format::{DEFAULT_CURRENCY, DEFAULT_LOCALE};
