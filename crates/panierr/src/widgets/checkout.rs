//! # Checkout Flow
//!
//! Collects customer details, asks the payment provider for a payment
//! intent covering the cart's final price, and empties the cart once the
//! payment succeeds.
//!
//! ## Payment Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  submit(cart, customer)                                                 │
//! │       │                                                                 │
//! │       ├── customer.validate()         ── fail ──► Validation            │
//! │       ├── cart empty?                 ── yes ───► EmptyCart             │
//! │       ▼                                                                 │
//! │  PaymentIntentRequest { idempotencyKey, amount, currency, customer }    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  gateway.create_payment_intent ──► gateway.confirm_payment              │
//! │       │                                    │                            │
//! │       │ transport error                    ├── succeeded ─► clear cart  │
//! │       ▼                                    │               on_success   │
//! │  Gateway(..)                               └── otherwise ─► PaymentFailed│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every failure is logged and passed to the error callback before being
//! returned.

use std::fmt;

use chrono::{DateTime, Utc};
use panierr_core::validation;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::Panierr;
use crate::error::{CheckoutError, CheckoutResult};

// =============================================================================
// Form Data
// =============================================================================

/// A postal address as entered in the checkout form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub address: String,
    pub city: String,
    pub zip: String,
    pub country: String,
}

impl Address {
    pub fn new(
        address: impl Into<String>,
        city: impl Into<String>,
        zip: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Address {
            address: address.into(),
            city: city.into(),
            zip: zip.into(),
            country: country.into(),
        }
    }

    fn validate(&self, prefix: &str) -> CheckoutResult<()> {
        for (field, value) in [
            ("address", &self.address),
            ("city", &self.city),
            ("zip", &self.zip),
            ("country", &self.country),
        ] {
            validation::validate_address_field(&format!("{} {}", prefix, field), value)?;
        }
        Ok(())
    }
}

/// Customer details collected by the checkout form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    pub name: String,
    pub email: String,
    pub shipping_address: Address,
    pub billing_address: Address,
}

impl CustomerInfo {
    /// Checks required fields, lengths and email shape.
    pub fn validate(&self) -> CheckoutResult<()> {
        validation::validate_customer_name(&self.name)?;
        validation::validate_email(&self.email)?;
        self.shipping_address.validate("shipping")?;
        self.billing_address.validate("billing")?;
        Ok(())
    }
}

// =============================================================================
// Payment Intent
// =============================================================================

/// Body of the create-payment-intent call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentRequest {
    /// Lets the provider deduplicate retried submissions.
    pub idempotency_key: Uuid,
    /// Final price in minor units.
    pub amount: i64,
    /// Lower-case ISO 4217 code.
    pub currency: String,
    pub customer_info: CustomerInfo,
    pub created_at: DateTime<Utc>,
}

impl PaymentIntentRequest {
    /// Request for the cart's current final price.
    pub fn for_cart(cart: &Panierr, customer: CustomerInfo) -> Self {
        PaymentIntentRequest {
            idempotency_key: Uuid::new_v4(),
            amount: cart.calculate_totals().final_price.cents(),
            currency: cart.config().currency_format.currency.to_ascii_lowercase(),
            customer_info: customer,
            created_at: Utc::now(),
        }
    }
}

/// Provider-side state of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Succeeded,
    Processing,
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    Canceled,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentStatus::Succeeded => "succeeded",
            PaymentStatus::Processing => "processing",
            PaymentStatus::RequiresPaymentMethod => "requires_payment_method",
            PaymentStatus::RequiresConfirmation => "requires_confirmation",
            PaymentStatus::RequiresAction => "requires_action",
            PaymentStatus::Canceled => "canceled",
            PaymentStatus::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// A payment intent as returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
}

/// Boundary to the external payment provider.
pub trait PaymentGateway {
    /// Creates an intent for `request`.
    fn create_payment_intent(&self, request: &PaymentIntentRequest)
        -> CheckoutResult<PaymentIntent>;

    /// Confirms a created intent. Providers that confirm on creation keep
    /// this default.
    fn confirm_payment(
        &self,
        intent: &PaymentIntent,
        _customer: &CustomerInfo,
    ) -> CheckoutResult<PaymentIntent> {
        Ok(intent.clone())
    }
}

// =============================================================================
// Flow
// =============================================================================

type SuccessCallback = Box<dyn FnMut(&PaymentIntent) + Send>;
type FailureCallback = Box<dyn FnMut(&CheckoutError) + Send>;

/// Checkout modal state plus the submit sequence.
pub struct CheckoutFlow<G> {
    gateway: G,
    open: bool,
    on_success: Option<SuccessCallback>,
    on_error: Option<FailureCallback>,
}

impl<G: PaymentGateway> CheckoutFlow<G> {
    pub fn new(gateway: G) -> Self {
        CheckoutFlow {
            gateway,
            open: false,
            on_success: None,
            on_error: None,
        }
    }

    pub fn on_success<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&PaymentIntent) + Send + 'static,
    {
        self.on_success = Some(Box::new(callback));
        self
    }

    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&CheckoutError) + Send + 'static,
    {
        self.on_error = Some(Box::new(callback));
        self
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Pays for `cart`. On success the cart is cleared and the flow closed.
    pub fn submit(
        &mut self,
        cart: &mut Panierr,
        customer: &CustomerInfo,
    ) -> CheckoutResult<PaymentIntent> {
        match self.try_submit(cart, customer) {
            Ok(intent) => {
                info!(intent_id = %intent.id, "payment succeeded");
                cart.clear_cart();
                self.close();
                if let Some(callback) = self.on_success.as_mut() {
                    callback(&intent);
                }
                Ok(intent)
            }
            Err(e) => {
                warn!(error = %e, "checkout failed");
                if let Some(callback) = self.on_error.as_mut() {
                    callback(&e);
                }
                Err(e)
            }
        }
    }

    fn try_submit(
        &self,
        cart: &Panierr,
        customer: &CustomerInfo,
    ) -> CheckoutResult<PaymentIntent> {
        customer.validate()?;
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let request = PaymentIntentRequest::for_cart(cart, customer.clone());
        info!(
            key = %request.idempotency_key,
            amount = request.amount,
            currency = %request.currency,
            "creating payment intent"
        );

        let intent = self.gateway.create_payment_intent(&request)?;
        let intent = self.gateway.confirm_payment(&intent, customer)?;

        match intent.status {
            PaymentStatus::Succeeded => Ok(intent),
            status => Err(CheckoutError::PaymentFailed { status }),
        }
    }
}

impl<G> fmt::Debug for CheckoutFlow<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckoutFlow")
            .field("open", &self.open)
            .finish_non_exhaustive()
    }
}
