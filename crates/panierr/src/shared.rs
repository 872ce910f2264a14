//! # Shared Cart Handle
//!
//! Hosts that drive one cart from several threads (a web handler pool, a UI
//! thread plus a background sync) wrap the engine in [`SharedCart`].
//!
//! ## Thread Safety
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SharedCart (Clone) ──► Arc<Mutex<Panierr>>                             │
//! │                                                                         │
//! │  with_cart(|cart| ...)       read access, lock held for the closure     │
//! │  with_cart_mut(|cart| ...)   write access, lock held for the closure    │
//! │                                                                         │
//! │  Listeners run inside the lock; they receive a CartView and cannot      │
//! │  call back into the handle without deadlocking.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::engine::Panierr;

/// Cloneable, thread-safe handle to one engine.
#[derive(Debug, Clone)]
pub struct SharedCart {
    cart: Arc<Mutex<Panierr>>,
}

impl SharedCart {
    pub fn new(cart: Panierr) -> Self {
        SharedCart {
            cart: Arc::new(Mutex::new(cart)),
        }
    }

    /// Executes a function with read access to the cart.
    ///
    /// ## Usage
    /// ```rust
    /// use panierr::{Panierr, PanierrConfig, SharedCart};
    ///
    /// let shared = SharedCart::new(Panierr::builder(PanierrConfig::default()).build());
    /// let totals = shared.with_cart(|cart| cart.calculate_totals());
    /// assert_eq!(totals.total_items, 0);
    /// ```
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Panierr) -> R,
    {
        f(&self.lock())
    }

    /// Executes a function with write access to the cart.
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Panierr) -> R,
    {
        f(&mut self.lock())
    }

    // A listener that panicked mid-dispatch leaves the collections consistent
    fn lock(&self) -> MutexGuard<'_, Panierr> {
        self.cart.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl From<Panierr> for SharedCart {
    fn from(cart: Panierr) -> Self {
        SharedCart::new(cart)
    }
}
