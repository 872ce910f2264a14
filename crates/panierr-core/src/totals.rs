//! # Totals
//!
//! Pure cart arithmetic over a slice of items and a slice of applied
//! discounts.
//!
//! ```text
//! total_items     = Σ quantity
//! total_price     = Σ price × quantity
//! discount_amount = Σ discount.amount_off(total_price)
//! final_price     = max(total_price − discount_amount, 0)
//! ```
//!
//! Every discount is computed against the undiscounted `total_price`;
//! discounts never compound on each other.

use crate::money::Money;
use crate::types::{CartItem, CartTotals, Discount};

/// Sum of quantities.
pub fn total_items(items: &[CartItem]) -> u64 {
    items.iter().map(|i| u64::from(i.quantity)).sum()
}

/// Sum of line totals.
pub fn total_price(items: &[CartItem]) -> Money {
    items.iter().map(CartItem::line_total).sum()
}

/// Sum of what each applied discount takes off the total price.
pub fn discount_amount(items: &[CartItem], discounts: &[Discount]) -> Money {
    let total = total_price(items);
    discounts.iter().map(|d| d.amount_off(total)).sum()
}

/// Computes all totals in one pass over the inputs.
///
/// ## Example
/// ```rust
/// use panierr_core::{totals, CartItem, Discount, Money};
///
/// let items = vec![CartItem::new("a", "Apple", Money::from_major(10), 10)];
/// let discounts = vec![Discount::percentage("SAVE10", 10.0)];
///
/// let totals = totals::calculate(&items, &discounts);
/// assert_eq!(totals.total_price, Money::from_major(100));
/// assert_eq!(totals.discount_amount, Money::from_major(10));
/// assert_eq!(totals.final_price, Money::from_major(90));
/// ```
pub fn calculate(items: &[CartItem], discounts: &[Discount]) -> CartTotals {
    let total_price = total_price(items);
    let discount_amount: Money = discounts.iter().map(|d| d.amount_off(total_price)).sum();

    CartTotals {
        total_items: total_items(items),
        total_price,
        discount_amount,
        final_price: (total_price - discount_amount).clamp_non_negative(),
    }
}
