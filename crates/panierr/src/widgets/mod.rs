//! # Widgets
//!
//! Ready-made components built on the engine's public surface.
//!
//! - [`preview`] - Cart preview badge
//! - [`checkout`] - Checkout form and payment flow

pub mod checkout;
pub mod preview;

pub use checkout::{
    Address, CheckoutFlow, CustomerInfo, PaymentGateway, PaymentIntent, PaymentIntentRequest,
    PaymentStatus,
};
pub use preview::{CartPreview, Position, PreviewOptions, PreviewSummary};
