//! # Domain Types
//!
//! Core domain types shared by the engine, the binder and the widgets.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    CartItem     │   │    Discount     │   │   CartTotals    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (unique)    │   │  code (unique)  │   │  total_items    │       │
//! │  │  name           │   │  type           │   │  total_price    │       │
//! │  │  price (Money)  │   │  amount         │   │  discount_amount│       │
//! │  │  quantity (≥1)  │   │  extra {..}     │   │  final_price    │       │
//! │  │  image?         │   └─────────────────┘   └─────────────────┘       │
//! │  │  extra {..}     │        catalog entry         derived only          │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Extension Attributes
//! Hosts attach arbitrary attributes (`sku`, `color`, `minSpend`, ...) to
//! items and discounts. They land in the `extra` map, which is flattened into
//! the JSON object so the persisted layout round-trips verbatim.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::money::Money;

/// Unrecognized attributes carried alongside the fixed fields.
pub type Extra = BTreeMap<String, Value>;

fn default_quantity() -> u32 {
    1
}

// =============================================================================
// Cart Item
// =============================================================================

/// A line in the cart.
///
/// ## Invariants (enforced by the engine, not by this type)
/// - at most one item per `id` in a cart
/// - `quantity >= 1`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Identifier, unique within a cart.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Unit price, currency-agnostic.
    pub price: Money,

    /// Number of units (defaults to 1 when absent).
    #[serde(default = "default_quantity")]
    pub quantity: u32,

    /// Optional image URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Any other attributes, preserved through persistence.
    #[serde(flatten)]
    pub extra: Extra,
}

impl CartItem {
    /// Creates an item with no image and no extra attributes.
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Money, quantity: u32) -> Self {
        CartItem {
            id: id.into(),
            name: name.into(),
            price,
            quantity,
            image: None,
            extra: Extra::new(),
        }
    }

    /// Sets the image URI.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Adds an extension attribute.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Line total (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Discount
// =============================================================================

/// How a discount's `amount` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountKind {
    /// `amount` is percentage points of the cart's total price.
    Percentage,
    /// `amount` is an absolute value in major currency units.
    Fixed,
}

impl fmt::Display for DiscountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscountKind::Percentage => write!(f, "percentage"),
            DiscountKind::Fixed => write!(f, "fixed"),
        }
    }
}

/// A discount from the configured catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discount {
    /// Code shoppers type in; matched exactly.
    pub code: String,

    /// Percentage or fixed.
    #[serde(rename = "type")]
    pub kind: DiscountKind,

    /// Percentage points or major currency units, depending on `kind`.
    pub amount: f64,

    /// Any other attributes, preserved through persistence.
    #[serde(flatten)]
    pub extra: Extra,
}

impl Discount {
    /// A percentage discount (`amount` in percentage points).
    pub fn percentage(code: impl Into<String>, amount: f64) -> Self {
        Discount {
            code: code.into(),
            kind: DiscountKind::Percentage,
            amount,
            extra: Extra::new(),
        }
    }

    /// A fixed discount (`amount` in major currency units).
    pub fn fixed(code: impl Into<String>, amount: f64) -> Self {
        Discount {
            code: code.into(),
            kind: DiscountKind::Fixed,
            amount,
            extra: Extra::new(),
        }
    }

    /// Adds an extension attribute.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// The amount this discount takes off a cart whose total price is
    /// `total_price`.
    ///
    /// ```rust
    /// use panierr_core::{Discount, Money};
    ///
    /// let total = Money::from_major(100);
    /// assert_eq!(Discount::percentage("SAVE10", 10.0).amount_off(total), Money::from_major(10));
    /// assert_eq!(Discount::fixed("FIVE", 5.0).amount_off(total), Money::from_major(5));
    /// ```
    pub fn amount_off(&self, total_price: Money) -> Money {
        match self.kind {
            DiscountKind::Percentage => {
                // Percentage points → basis points; negative/NaN amounts count as 0
                let bps = (self.amount * 100.0).round();
                let bps = if bps.is_finite() && bps > 0.0 {
                    bps.min(u32::MAX as f64) as u32
                } else {
                    0
                };
                total_price.percentage_of(bps)
            }
            DiscountKind::Fixed => Money::from_decimal(self.amount).unwrap_or_default(),
        }
    }
}

// =============================================================================
// Cart Totals
// =============================================================================

/// Totals derived from the current items and applied discounts.
///
/// Never stored; recomputed on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    /// Sum of quantities.
    pub total_items: u64,
    /// Sum of price × quantity.
    pub total_price: Money,
    /// Sum of the applied discounts' amounts.
    pub discount_amount: Money,
    /// `total_price - discount_amount`, never below zero.
    pub final_price: Money,
}

// =============================================================================
// Unit Tests
// =============================================================================
