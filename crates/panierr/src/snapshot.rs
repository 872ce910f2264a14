//! # Persisted Snapshot
//!
//! The blob written under the storage key:
//!
//! ```json
//! {
//!   "cartItems": [{"id": "tee-1", "name": "T-Shirt", "price": 19.99, "quantity": 2}],
//!   "discountsApplied": [{"code": "SAVE10", "type": "percentage", "amount": 10}]
//! }
//! ```
//!
//! Missing arrays read as empty. Unknown item/discount attributes are kept.

use panierr_core::{validation, CartItem, CoreError, Discount};
use serde::{Deserialize, Serialize};

use crate::error::SnapshotError;

/// Cart contents as stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    #[serde(default)]
    pub cart_items: Vec<CartItem>,

    #[serde(default)]
    pub discounts_applied: Vec<Discount>,
}

impl CartSnapshot {
    /// Copies the given collections.
    pub fn capture(items: &[CartItem], discounts: &[Discount]) -> Self {
        CartSnapshot {
            cart_items: items.to_vec(),
            discounts_applied: discounts.to_vec(),
        }
    }

    /// Serializes to the stored JSON form.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses and validates a stored blob.
    pub fn from_json(blob: &str) -> Result<Self, SnapshotError> {
        let snapshot: CartSnapshot = serde_json::from_str(blob)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Checks item invariants (non-negative prices, positive quantities,
    /// unique ids) and the applied discount (at most one, non-negative
    /// amount, percentage at most 100).
    pub fn validate(&self) -> Result<(), SnapshotError> {
        validation::validate_items(&self.cart_items)?;

        if self.discounts_applied.len() > 1 {
            return Err(SnapshotError::TooManyDiscounts(self.discounts_applied.len()));
        }
        for discount in &self.discounts_applied {
            validation::validate_discount(discount).map_err(CoreError::from)?;
        }

        Ok(())
    }
}
