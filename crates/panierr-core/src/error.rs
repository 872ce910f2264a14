//! # Error Types
//!
//! Domain-specific error types for panierr-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  panierr-core errors (this file)                                        │
//! │  ├── CoreError        - Cart content rule violations                    │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  panierr-storage errors (separate crate)                                │
//! │  └── StorageError     - Storage adapter failures                        │
//! │                                                                         │
//! │  panierr errors (engine crate)                                          │
//! │  └── CartError        - What listeners see (error event message)        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CartError → error event            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Cart content errors.
///
/// Raised when a collection of items or discounts breaks a cart invariant,
/// typically while checking a persisted snapshot.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Two items share an id.
    ///
    /// ## When This Occurs
    /// - A stored blob was edited by hand or written by another program
    /// - Two engine versions wrote the same key
    #[error("Duplicate item id: {0}")]
    DuplicateItem(String),

    /// Two discounts share a code.
    #[error("Duplicate discount code: {0}")]
    DuplicateDiscount(String),

    /// An item failed validation.
    #[error("Invalid item {id}: {source}")]
    InvalidItem {
        id: String,
        #[source]
        source: ValidationError,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when input doesn't meet requirements. Used for early
/// validation before anything reaches the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (e.g. unparsable number, malformed email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::Negative { field }
            | ValidationError::InvalidFormat { field, .. } => field,
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
