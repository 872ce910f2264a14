//! # Engine Error Types
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Panierr Error Categories                          │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │   CartError     │  │  ConfigError    │  │  BinderError            │ │
//! │  │  (error event)  │  │  (load/save)    │  │  (markup → engine)      │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  ItemNotFound   │  │  Io / Parse     │  │  MissingAttribute       │ │
//! │  │  InvalidCode    │  │  Invalid        │  │  InvalidItem            │ │
//! │  │  SaveFailed     │  │  NoConfigPath   │  │  MissingInput           │ │
//! │  │  LoadFailed     │  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────────────────────────────────┐  │
//! │  │ SnapshotError   │  │  CheckoutError                              │  │
//! │  │ (stored blob)   │  │  Validation • EmptyCart • Gateway • Failed  │  │
//! │  └─────────────────┘  └─────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `CartError` never escapes the engine's public operations. It is turned
//! into an `error` event (its `Display` is the event message) and handed to
//! the host's error callback.

use panierr_core::{CoreError, ValidationError};
use serde_json::{json, Value};
use thiserror::Error;

use crate::events::CartEvent;
use crate::widgets::checkout::PaymentStatus;

// =============================================================================
// Cart Error
// =============================================================================

/// Result type alias for engine internals.
pub type CartResult<T> = Result<T, CartError>;

/// Failures of cart operations, reported as `error` events.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// Remove or update targeted an id that isn't in the cart.
    #[error("Item not found in cart")]
    ItemNotFound { item_id: String },

    /// No catalog discount has this code.
    #[error("Invalid discount code")]
    InvalidDiscountCode { code: String },

    /// Serializing or writing the snapshot failed.
    #[error("Failed to save cart")]
    SaveFailed { cause: String },

    /// Reading or interpreting the stored snapshot failed.
    ///
    /// ## When This Occurs
    /// - Storage adapter read error
    /// - Unparsable JSON
    /// - Negative price, zero quantity or duplicate ids in the blob
    #[error("Failed to load cart")]
    LoadFailed { cause: String },
}

impl CartError {
    pub(crate) fn save_failed(cause: impl std::fmt::Display) -> Self {
        CartError::SaveFailed {
            cause: cause.to_string(),
        }
    }

    pub(crate) fn load_failed(cause: impl std::fmt::Display) -> Self {
        CartError::LoadFailed {
            cause: cause.to_string(),
        }
    }

    /// Structured details carried by the `error` event.
    pub fn details(&self) -> Value {
        match self {
            CartError::ItemNotFound { item_id } => json!({ "itemId": item_id }),
            CartError::InvalidDiscountCode { code } => json!({ "code": code }),
            CartError::SaveFailed { cause } | CartError::LoadFailed { cause } => {
                json!({ "cause": cause })
            }
        }
    }

    /// The `error` event for this failure.
    pub fn to_event(&self) -> CartEvent {
        CartEvent::Error {
            message: self.to_string(),
            details: Some(self.details()),
        }
    }
}

// =============================================================================
// Snapshot Error
// =============================================================================

/// A stored blob that cannot become cart state.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Not JSON, or not the expected shape.
    #[error("malformed cart snapshot: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Well-formed but breaks a cart invariant.
    #[error("invalid cart snapshot: {0}")]
    Invalid(#[from] CoreError),

    /// More than one discount applied.
    #[error("invalid cart snapshot: {0} discounts applied, at most one allowed")]
    TooManyDiscounts(usize),
}

// =============================================================================
// Config Error
// =============================================================================

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration load/save failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading or writing the config file failed.
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The config file isn't valid TOML for `PanierrConfig`.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config couldn't be rendered as TOML.
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// No path given and no platform config directory available.
    #[error("No config path available")]
    NoConfigPath,

    /// A field failed validation.
    #[error("Invalid config: {0}")]
    Invalid(#[from] ValidationError),

    /// The discount catalog is inconsistent.
    #[error("Invalid discount catalog: {0}")]
    Catalog(#[from] CoreError),
}

// =============================================================================
// Binder Error
// =============================================================================

/// Result type alias for presentation binder operations.
pub type BinderResult<T> = Result<T, BinderError>;

/// Markup that couldn't be turned into an engine call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BinderError {
    /// A required data attribute is absent or empty.
    #[error("Missing {attribute} attribute on element")]
    MissingAttribute { attribute: String },

    /// Item data extracted from the element is invalid.
    #[error("Invalid item data: {0}")]
    InvalidItem(#[from] ValidationError),

    /// The action needs an input value and the element has none.
    #[error("Missing input value for {action}")]
    MissingInput { action: String },
}

// =============================================================================
// Checkout Error
// =============================================================================

/// Result type alias for checkout operations.
pub type CheckoutResult<T> = Result<T, CheckoutError>;

/// Checkout failures, passed to the checkout error callback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// A form field failed validation.
    #[error("Invalid checkout form: {0}")]
    Validation(#[from] ValidationError),

    /// There is nothing to pay for.
    #[error("Cart is empty")]
    EmptyCart,

    /// The payment provider call failed.
    #[error("Payment processing error: {0}")]
    Gateway(String),

    /// The provider answered but the payment didn't go through.
    #[error("Payment failed ({status})")]
    PaymentFailed { status: PaymentStatus },
}
