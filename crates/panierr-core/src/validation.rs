//! # Validation Module
//!
//! Input validation utilities for Panierr.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Presentation binder / checkout form                           │
//! │  ├── Raw strings from markup (ids, names, prices, quantities)           │
//! │  └── parse_* / validate_* from THIS MODULE                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Engine                                                        │
//! │  ├── Trusts typed input from callers                                    │
//! │  └── Checks persisted snapshots with validate_items / validate_catalog  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Configuration                                                 │
//! │  └── Discount catalog and currency code checked at load time            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use panierr_core::validation::{parse_price, validate_item_id};
//!
//! validate_item_id("tee-1").unwrap();
//! assert_eq!(parse_price("19.99").unwrap().cents(), 1999);
//! assert!(parse_price("free").is_err());
//! ```

use std::collections::HashSet;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{CartItem, Discount, DiscountKind};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted item name, customer name or address line.
pub const MAX_TEXT_LENGTH: usize = 200;

/// Longest accepted item id or discount code.
pub const MAX_CODE_LENGTH: usize = 100;

/// Longest accepted email address (RFC 5321 path limit).
pub const MAX_EMAIL_LENGTH: usize = 254;

fn required(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

// =============================================================================
// Item Validators
// =============================================================================

/// Validates an item id.
///
/// ## Rules
/// - Must not be empty or whitespace
/// - At most 100 characters
pub fn validate_item_id(id: &str) -> ValidationResult<()> {
    required("id", id, MAX_CODE_LENGTH)
}

/// Validates an item name.
///
/// ## Example
/// ```rust
/// use panierr_core::validation::validate_item_name;
///
/// assert!(validate_item_name("T-Shirt").is_ok());
/// assert!(validate_item_name("  ").is_err());
/// ```
pub fn validate_item_name(name: &str) -> ValidationResult<()> {
    required("name", name, MAX_TEXT_LENGTH)
}

/// Validates a unit price.
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::Negative {
            field: "price".to_string(),
        });
    }

    Ok(())
}

/// Parses a price written in major units (`"19.99"`, `"5"`).
///
/// ## Rules
/// - Must parse as a finite number
/// - Must not be negative (zero is allowed: free items)
pub fn parse_price(raw: &str) -> ValidationResult<Money> {
    let invalid = || ValidationError::InvalidFormat {
        field: "price".to_string(),
        reason: format!("'{}' is not a number", raw.trim()),
    };

    let value: f64 = raw.trim().parse().map_err(|_| invalid())?;
    let price = Money::from_decimal(value).ok_or_else(invalid)?;
    validate_price(price)?;

    Ok(price)
}

/// Parses a whole-number quantity. Zero and negative values are returned
/// as-is; interpreting them is up to the caller.
pub fn parse_quantity(raw: &str) -> ValidationResult<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidFormat {
            field: "quantity".to_string(),
            reason: format!("'{}' is not a whole number", raw.trim()),
        })
}

/// Validates a stored quantity.
pub fn validate_quantity(quantity: u32) -> ValidationResult<()> {
    if quantity == 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Checks items read back from storage.
///
/// ## Rules
/// - Every price is non-negative
/// - Every quantity is at least 1
/// - Ids are unique
pub fn validate_items(items: &[CartItem]) -> CoreResult<()> {
    let mut seen = HashSet::with_capacity(items.len());

    for item in items {
        validate_price(item.price)
            .and_then(|_| validate_quantity(item.quantity))
            .map_err(|source| CoreError::InvalidItem {
                id: item.id.clone(),
                source,
            })?;

        if !seen.insert(item.id.as_str()) {
            return Err(CoreError::DuplicateItem(item.id.clone()));
        }
    }

    Ok(())
}

/// Validates a discount code typed by a shopper or listed in a catalog.
pub fn validate_discount_code(code: &str) -> ValidationResult<()> {
    required("code", code, MAX_CODE_LENGTH)
}

/// Validates a single discount definition.
///
/// ## Rules
/// - `amount` is finite and non-negative
/// - Percentages are at most 100
pub fn validate_discount(discount: &Discount) -> ValidationResult<()> {
    validate_discount_code(&discount.code)?;

    if !discount.amount.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: "must be a finite number".to_string(),
        });
    }

    if discount.amount < 0.0 {
        return Err(ValidationError::Negative {
            field: "amount".to_string(),
        });
    }

    if discount.kind == DiscountKind::Percentage && discount.amount > 100.0 {
        return Err(ValidationError::OutOfRange {
            field: "amount".to_string(),
            min: 0,
            max: 100,
        });
    }

    Ok(())
}

/// Validates a discount catalog: every entry is valid and codes are unique.
pub fn validate_catalog(discounts: &[Discount]) -> CoreResult<()> {
    let mut seen = HashSet::with_capacity(discounts.len());

    for discount in discounts {
        validate_discount(discount)?;

        if !seen.insert(discount.code.as_str()) {
            return Err(CoreError::DuplicateDiscount(discount.code.clone()));
        }
    }

    Ok(())
}

// =============================================================================
// Configuration Validators
// =============================================================================

/// Validates an ISO 4217 currency code (three ASCII letters).
pub fn validate_currency_code(code: &str) -> ValidationResult<()> {
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::InvalidFormat {
            field: "currency".to_string(),
            reason: "must be a three-letter ISO 4217 code".to_string(),
        });
    }

    Ok(())
}

/// Validates a storage key.
pub fn validate_storage_key(key: &str) -> ValidationResult<()> {
    required("storageKey", key, MAX_TEXT_LENGTH)
}

// =============================================================================
// Checkout Validators
// =============================================================================

/// Validates a customer's full name.
pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    required("name", name, MAX_TEXT_LENGTH)
}

/// Validates an email address.
///
/// ## Rules
/// - Exactly one `@` with a non-empty local part
/// - Domain contains a dot that is neither first nor last
/// - No whitespace
///
/// ## Example
/// ```rust
/// use panierr_core::validation::validate_email;
///
/// assert!(validate_email("ada@example.com").is_ok());
/// assert!(validate_email("ada@localhost").is_err());
/// assert!(validate_email("not an email").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();
    required("email", email, MAX_EMAIL_LENGTH)?;

    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "must look like name@example.com".to_string(),
    };

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    match domain.rfind('.') {
        Some(dot) if dot > 0 && dot < domain.len() - 1 && !domain.starts_with('.') => Ok(()),
        _ => Err(invalid()),
    }
}

/// Validates one line of a postal address (`line1`, `city`, `country`, ...).
pub fn validate_address_field(field: &str, value: &str) -> ValidationResult<()> {
    required(field, value, MAX_TEXT_LENGTH)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_item_id() {
        assert!(validate_item_id("tee-1").is_ok());
        assert!(validate_item_id("").is_err());
        assert!(validate_item_id("   ").is_err());
        assert!(validate_item_id(&"a".repeat(101)).is_err());
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("10").unwrap(), Money::from_major(10));
        assert_eq!(parse_price(" 0.5 ").unwrap().cents(), 50);
        assert_eq!(parse_price("0").unwrap(), Money::zero());

        assert!(matches!(
            parse_price("-1"),
            Err(ValidationError::Negative { .. })
        ));
        assert!(matches!(
            parse_price("abc"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(parse_price("NaN").is_err());
        assert!(parse_price("inf").is_err());
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("3").unwrap(), 3);
        assert_eq!(parse_quantity("-2").unwrap(), -2);
        assert!(parse_quantity("2.5").is_err());
        assert!(parse_quantity("").is_err());
    }

    #[test]
    fn test_validate_items() {
        let ok = vec![
            CartItem::new("a", "A", Money::from_major(1), 1),
            CartItem::new("b", "B", Money::zero(), 4),
        ];
        assert!(validate_items(&ok).is_ok());

        let dup = vec![
            CartItem::new("a", "A", Money::from_major(1), 1),
            CartItem::new("a", "A again", Money::from_major(1), 1),
        ];
        assert!(matches!(validate_items(&dup), Err(CoreError::DuplicateItem(id)) if id == "a"));

        let zero = vec![CartItem::new("a", "A", Money::from_major(1), 0)];
        assert!(matches!(validate_items(&zero), Err(CoreError::InvalidItem { .. })));

        let negative = vec![CartItem::new("a", "A", Money::from_cents(-1), 1)];
        assert!(validate_items(&negative).is_err());
    }

    #[test]
    fn test_validate_discount() {
        assert!(validate_discount(&Discount::percentage("SAVE10", 10.0)).is_ok());
        assert!(validate_discount(&Discount::percentage("ALL", 100.0)).is_ok());
        assert!(validate_discount(&Discount::fixed("FIVE", 5.0)).is_ok());

        assert!(validate_discount(&Discount::percentage("TOO", 101.0)).is_err());
        assert!(validate_discount(&Discount::fixed("NEG", -1.0)).is_err());
        assert!(validate_discount(&Discount::fixed("NAN", f64::NAN)).is_err());
        assert!(validate_discount(&Discount::fixed("", 1.0)).is_err());
    }

    #[test]
    fn test_validate_catalog_rejects_duplicate_codes() {
        let catalog = vec![Discount::fixed("X", 1.0), Discount::percentage("X", 5.0)];
        assert!(matches!(
            validate_catalog(&catalog),
            Err(CoreError::DuplicateDiscount(code)) if code == "X"
        ));
    }

    #[test]
    fn test_validate_currency_code() {
        assert!(validate_currency_code("USD").is_ok());
        assert!(validate_currency_code("eur").is_ok());
        assert!(validate_currency_code("US").is_err());
        assert!(validate_currency_code("U$D").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("ada@example.com").is_ok());
        assert!(validate_email(" ada.lovelace@mail.example.org ").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("ada").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("ada@example.").is_err());
        assert!(validate_email("ada@.com").is_err());
        assert!(validate_email("a@b@example.com").is_err());
        assert!(validate_email("ada @example.com").is_err());
    }

    #[test]
    fn test_validate_address_field_reports_field_name() {
        let err = validate_address_field("city", "").unwrap_err();
        assert_eq!(err.field(), "city");
        assert!(validate_address_field("city", "Paris").is_ok());
    }
}
