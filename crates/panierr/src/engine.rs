//! # Cart Engine
//!
//! Owns the item and applied-discount collections, enforces their
//! invariants, persists through the injected storage adapter and notifies
//! listeners.
//!
//! ## Operation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Engine Operations                               │
//! │                                                                         │
//! │  Operation                 State Change              Event              │
//! │  ─────────                 ────────────              ─────              │
//! │                                                                         │
//! │  add_item (new id) ──────► items.push(item) ───────► itemAdded          │
//! │  add_item (same id) ─────► qty += incoming ────────► itemUpdated        │
//! │  update_item_quantity ───► qty = n (n ≤ 0: remove) ► itemUpdated        │
//! │  remove_item ────────────► items.remove(i) ────────► itemRemoved        │
//! │  clear_cart ─────────────► items + discounts = [] ─► cartCleared        │
//! │  apply_discount ─────────► discounts = [match] ────► discountApplied    │
//! │  remove_discount ────────► discounts = [] ─────────► discountRemoved    │
//! │                                                                         │
//! │  Misses (unknown id / code) change nothing and emit `error` instead.    │
//! │  Every change is persisted (if autoSave) BEFORE its event is emitted.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Error Reporting
//! Public operations never return errors. A failure becomes an `error`
//! event, is passed to the host's error callback, and is logged at `warn`.
//!
//! ## Listeners Cannot Mutate the Cart
//! A listener receives the event and a read-only [`CartView`]; it has no
//! `&mut Panierr`, so it cannot add, remove or apply anything while an
//! operation is dispatching. To react to an event with a cart change, queue
//! the change from the listener and apply it once the operation returns:
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use panierr::{CartEvent, CartItem, EventKind, MemoryStorage, Money, Panierr, PanierrConfig};
//!
//! let mut cart = Panierr::new(PanierrConfig::default(), MemoryStorage::new());
//! let pending = Arc::new(Mutex::new(Vec::new()));
//!
//! let queue = Arc::clone(&pending);
//! cart.on(EventKind::ItemAdded, move |event, _view| {
//!     if let CartEvent::ItemAdded { item } = event {
//!         if item.id == "console" {
//!             queue.lock().unwrap().push(CartItem::new("cable", "HDMI Cable", Money::zero(), 1));
//!         }
//!     }
//! });
//!
//! cart.add_item(CartItem::new("console", "Console", Money::from_major(300), 1));
//! let queued: Vec<CartItem> = pending.lock().unwrap().drain(..).collect();
//! for item in queued {
//!     cart.add_item(item);
//! }
//! assert_eq!(cart.get_item_quantity("cable"), Some(1));
//! ```
//!
//! ## Example
//! ```rust
//! use panierr::{CartItem, Discount, MemoryStorage, Money, Panierr, PanierrConfig};
//!
//! let config = PanierrConfig::default()
//!     .with_discounts(vec![Discount::percentage("SAVE10", 10.0)]);
//! let mut cart = Panierr::new(config, MemoryStorage::new());
//!
//! cart.add_item(CartItem::new("a", "Apple", Money::from_major(10), 10));
//! cart.apply_discount("SAVE10");
//!
//! let totals = cart.calculate_totals();
//! assert_eq!(totals.final_price, Money::from_major(90));
//! assert_eq!(cart.format_price(totals.final_price), "$90.00");
//! ```

use std::fmt;
use std::sync::Arc;

use panierr_core::{totals, CartItem, CartTotals, Discount, Money, PriceFormatter};
use panierr_storage::{FileStorage, StorageProvider, StorageResult};
use tracing::{debug, info, warn};

use crate::config::PanierrConfig;
use crate::error::{CartError, CartResult};
use crate::events::{CartEvent, EventBus, EventKind, ListenerId};
use crate::snapshot::CartSnapshot;

/// Host callback invoked for every reported failure.
pub type ErrorCallback = Box<dyn FnMut(&CartError) + Send>;

// =============================================================================
// Read-Only View
// =============================================================================

/// Read-only access to cart state.
///
/// Handed to listeners during dispatch, and available from
/// [`Panierr::view`].
#[derive(Clone, Copy)]
pub struct CartView<'a> {
    items: &'a [CartItem],
    discounts: &'a [Discount],
    formatter: &'a PriceFormatter,
}

impl<'a> CartView<'a> {
    /// Items in insertion order.
    pub fn items(&self) -> &'a [CartItem] {
        self.items
    }

    /// Applied discounts (zero or one).
    pub fn applied_discounts(&self) -> &'a [Discount] {
        self.discounts
    }

    pub fn totals(&self) -> CartTotals {
        totals::calculate(self.items, self.discounts)
    }

    pub fn discount_amount(&self) -> Money {
        totals::discount_amount(self.items, self.discounts)
    }

    pub fn item_quantity(&self, item_id: &str) -> Option<u32> {
        self.items
            .iter()
            .find(|item| item.id == item_id)
            .map(|item| item.quantity)
    }

    pub fn format_price(&self, amount: Money) -> String {
        self.formatter.format(amount)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl fmt::Debug for CartView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartView")
            .field("items", &self.items.len())
            .field("discounts", &self.discounts.len())
            .finish()
    }
}

// =============================================================================
// Engine
// =============================================================================

/// The cart engine.
///
/// ## Invariants
/// - Items are unique by `id` (adding the same id increases quantity)
/// - Every quantity is ≥ 1 (updating to ≤ 0 removes the item)
/// - At most one discount is applied, always a catalog entry
pub struct Panierr {
    items: Vec<CartItem>,
    discounts_applied: Vec<Discount>,
    config: PanierrConfig,
    formatter: PriceFormatter,
    storage: Option<Arc<dyn StorageProvider>>,
    events: EventBus,
    on_error: Option<ErrorCallback>,
}

impl Panierr {
    /// Creates an engine persisting through `storage`, running the load
    /// protocol first when `auto_load` is set.
    pub fn new(config: PanierrConfig, storage: impl StorageProvider + 'static) -> Self {
        Self::builder(config).storage(storage).build()
    }

    /// Starts a builder, for registering listeners before autoload runs.
    pub fn builder(config: PanierrConfig) -> PanierrBuilder {
        PanierrBuilder {
            config,
            storage: None,
            events: EventBus::default(),
            on_error: None,
        }
    }

    /// Creates an engine backed by the device-local file store.
    pub fn with_device_storage(config: PanierrConfig) -> StorageResult<Self> {
        let storage = FileStorage::at_default_location()?;
        Ok(Self::new(config, storage))
    }

    // =========================================================================
    // Item Operations
    // =========================================================================

    /// Adds an item, or increases the quantity of the line with the same id.
    ///
    /// A zero quantity counts as one.
    pub fn add_item(&mut self, mut item: CartItem) {
        item.quantity = item.quantity.max(1);
        debug!(item_id = %item.id, quantity = item.quantity, "add_item");

        let event = match self.items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(item.quantity);
                CartEvent::ItemUpdated {
                    item: existing.clone(),
                }
            }
            None => {
                self.items.push(item.clone());
                CartEvent::ItemAdded { item }
            }
        };

        self.persist();
        self.emit(event);
    }

    /// Removes the line with this id.
    pub fn remove_item(&mut self, item_id: &str) {
        debug!(item_id, "remove_item");
        if let Err(e) = self.try_remove_item(item_id) {
            self.report(e);
        }
    }

    fn try_remove_item(&mut self, item_id: &str) -> CartResult<()> {
        let index = self.position(item_id)?;
        self.items.remove(index);

        self.persist();
        self.emit(CartEvent::ItemRemoved {
            item_id: item_id.to_string(),
        });
        Ok(())
    }

    /// Sets a line's quantity. Zero or negative removes the line.
    pub fn update_item_quantity(&mut self, item_id: &str, quantity: i64) {
        debug!(item_id, quantity, "update_item_quantity");
        if let Err(e) = self.try_update_item_quantity(item_id, quantity) {
            self.report(e);
        }
    }

    fn try_update_item_quantity(&mut self, item_id: &str, quantity: i64) -> CartResult<()> {
        let index = self.position(item_id)?;

        if quantity <= 0 {
            return self.try_remove_item(item_id);
        }

        let item = &mut self.items[index];
        item.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        let event = CartEvent::ItemUpdated { item: item.clone() };

        self.persist();
        self.emit(event);
        Ok(())
    }

    /// Empties items and applied discounts.
    pub fn clear_cart(&mut self) {
        debug!(items = self.items.len(), "clear_cart");
        self.items.clear();
        self.discounts_applied.clear();

        self.persist();
        self.emit(CartEvent::CartCleared);
    }

    fn position(&self, item_id: &str) -> CartResult<usize> {
        self.items
            .iter()
            .position(|item| item.id == item_id)
            .ok_or_else(|| CartError::ItemNotFound {
                item_id: item_id.to_string(),
            })
    }

    // =========================================================================
    // Discount Operations
    // =========================================================================

    /// Makes the catalog discount with exactly this code the active one.
    ///
    /// An unknown code leaves any active discount in place.
    pub fn apply_discount(&mut self, code: &str) {
        debug!(code, "apply_discount");
        if let Err(e) = self.try_apply_discount(code) {
            self.report(e);
        }
    }

    fn try_apply_discount(&mut self, code: &str) -> CartResult<()> {
        let discount = self
            .config
            .find_discount(code)
            .cloned()
            .ok_or_else(|| CartError::InvalidDiscountCode {
                code: code.to_string(),
            })?;

        self.discounts_applied = vec![discount.clone()];

        self.persist();
        self.emit(CartEvent::DiscountApplied { discount });
        Ok(())
    }

    /// Clears the active discount.
    pub fn remove_discount(&mut self) {
        debug!("remove_discount");
        self.discounts_applied.clear();

        self.persist();
        self.emit(CartEvent::DiscountRemoved);
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn calculate_totals(&self) -> CartTotals {
        self.view().totals()
    }

    /// What the applied discounts take off the current total price.
    pub fn discount_amount(&self) -> Money {
        self.view().discount_amount()
    }

    pub fn applied_discounts(&self) -> &[Discount] {
        &self.discounts_applied
    }

    /// Quantity of the line with this id, if present.
    pub fn get_item_quantity(&self, item_id: &str) -> Option<u32> {
        self.view().item_quantity(item_id)
    }

    /// A copy of the items; changing it doesn't affect the cart.
    pub fn get_cart_items(&self) -> Vec<CartItem> {
        self.items.clone()
    }

    /// Renders an amount with the configured locale and currency format.
    pub fn format_price(&self, amount: Money) -> String {
        self.formatter.format(amount)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn config(&self) -> &PanierrConfig {
        &self.config
    }

    pub fn view(&self) -> CartView<'_> {
        CartView {
            items: &self.items,
            discounts: &self.discounts_applied,
            formatter: &self.formatter,
        }
    }

    // =========================================================================
    // Listeners
    // =========================================================================

    /// Subscribes to one event kind. Listeners run in registration order.
    ///
    /// Listeners only get a read-only view; queue follow-up changes and
    /// apply them after the operation returns (see the module docs).
    pub fn on<F>(&mut self, kind: EventKind, listener: F) -> ListenerId
    where
        F: FnMut(&CartEvent, &CartView<'_>) + Send + 'static,
    {
        self.events.on(kind, Box::new(listener))
    }

    /// Unsubscribes; unknown handles are ignored.
    pub fn off(&mut self, kind: EventKind, id: ListenerId) {
        if !self.events.off(kind, id) {
            debug!(%kind, ?id, "off: listener not registered");
        }
    }

    /// Number of listeners subscribed to `kind`.
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.events.count(kind)
    }

    /// Replaces the host error callback.
    pub fn set_error_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&CartError) + Send + 'static,
    {
        self.on_error = Some(Box::new(callback));
    }

    /// Drops all listeners and the error callback, and empties in-memory
    /// state without touching storage.
    pub fn destroy(&mut self) {
        debug!("destroy");
        self.events.clear();
        self.on_error = None;
        self.items.clear();
        self.discounts_applied.clear();
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Writes the snapshot now, regardless of `auto_save`.
    pub fn save(&mut self) {
        if let Err(e) = self.write_snapshot() {
            self.report(e);
        }
    }

    /// Replaces in-memory state with the stored snapshot.
    ///
    /// A missing key yields an empty cart. A malformed blob yields an empty
    /// cart and a `Failed to load cart` error.
    pub fn reload(&mut self) {
        match self.read_snapshot() {
            Ok(Some(snapshot)) => {
                info!(
                    key = %self.config.storage_key,
                    items = snapshot.cart_items.len(),
                    discounts = snapshot.discounts_applied.len(),
                    "cart loaded"
                );
                self.items = snapshot.cart_items;
                self.discounts_applied = snapshot.discounts_applied;
            }
            Ok(None) => {
                debug!(key = %self.config.storage_key, "no stored cart");
                self.items.clear();
                self.discounts_applied.clear();
            }
            Err(e) => {
                self.items.clear();
                self.discounts_applied.clear();
                self.report(e);
            }
        }
    }

    fn persist(&mut self) {
        if self.config.auto_save {
            self.save();
        }
    }

    fn write_snapshot(&self) -> CartResult<()> {
        let Some(storage) = &self.storage else {
            return Ok(());
        };

        let blob = CartSnapshot::capture(&self.items, &self.discounts_applied)
            .to_json()
            .map_err(CartError::save_failed)?;
        storage
            .set(&self.config.storage_key, &blob)
            .map_err(CartError::save_failed)?;

        debug!(key = %self.config.storage_key, bytes = blob.len(), "cart saved");
        Ok(())
    }

    fn read_snapshot(&self) -> CartResult<Option<CartSnapshot>> {
        let Some(storage) = &self.storage else {
            return Ok(None);
        };

        let blob = storage
            .get(&self.config.storage_key)
            .map_err(CartError::load_failed)?;

        match blob {
            Some(blob) if !blob.trim().is_empty() => CartSnapshot::from_json(&blob)
                .map(Some)
                .map_err(CartError::load_failed),
            _ => Ok(None),
        }
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    fn emit(&mut self, event: CartEvent) {
        let Panierr {
            ref items,
            ref discounts_applied,
            ref formatter,
            ref mut events,
            ..
        } = *self;
        let view = CartView {
            items,
            discounts: discounts_applied,
            formatter,
        };
        events.emit(&event, &view);
    }

    fn report(&mut self, error: CartError) {
        warn!(error = %error, details = %error.details(), "cart operation failed");
        self.emit(error.to_event());
        if let Some(callback) = self.on_error.as_mut() {
            callback(&error);
        }
    }
}

impl fmt::Debug for Panierr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Panierr")
            .field("items", &self.items)
            .field("discounts_applied", &self.discounts_applied)
            .field("config", &self.config)
            .field("has_storage", &self.storage.is_some())
            .field("events", &self.events)
            .finish()
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Collects storage, listeners and the error callback before the engine
/// runs its load protocol.
///
/// ```rust
/// use std::sync::{Arc, Mutex};
/// use panierr::{MemoryStorage, Panierr, PanierrConfig, StorageProvider};
///
/// let storage = MemoryStorage::new();
/// storage.set("panierrCartItems", "not json").unwrap();
///
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&seen);
/// let cart = Panierr::builder(PanierrConfig::default())
///     .storage(storage)
///     .on_error(move |e| sink.lock().unwrap().push(e.to_string()))
///     .build();
///
/// assert!(cart.is_empty());
/// assert_eq!(*seen.lock().unwrap(), vec!["Failed to load cart".to_string()]);
/// ```
pub struct PanierrBuilder {
    config: PanierrConfig,
    storage: Option<Arc<dyn StorageProvider>>,
    events: EventBus,
    on_error: Option<ErrorCallback>,
}

impl PanierrBuilder {
    /// Persist through this adapter.
    pub fn storage(mut self, storage: impl StorageProvider + 'static) -> Self {
        self.storage = Some(Arc::new(storage));
        self
    }

    /// Persist through an adapter shared with other owners.
    pub fn shared_storage(mut self, storage: Arc<dyn StorageProvider>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Registers a listener. Its handle is not returned; use
    /// [`Panierr::on`] when you need to unsubscribe later.
    pub fn on<F>(mut self, kind: EventKind, listener: F) -> Self
    where
        F: FnMut(&CartEvent, &CartView<'_>) + Send + 'static,
    {
        self.events.on(kind, Box::new(listener));
        self
    }

    /// Sets the host error callback.
    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&CartError) + Send + 'static,
    {
        self.on_error = Some(Box::new(callback));
        self
    }

    /// Builds the engine, loading the stored cart when `auto_load` is set.
    pub fn build(self) -> Panierr {
        if self.storage.is_none() {
            debug!("no storage adapter; cart will not persist");
        }

        let mut cart = Panierr {
            items: Vec::new(),
            discounts_applied: Vec::new(),
            formatter: self.config.price_formatter(),
            config: self.config,
            storage: self.storage,
            events: self.events,
            on_error: self.on_error,
        };

        if cart.config.auto_load {
            cart.reload();
        }

        cart
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panierr_storage::MemoryStorage;
    use std::sync::Mutex;

    fn item(id: &str, price: i64, quantity: u32) -> CartItem {
        CartItem::new(id, format!("Product {}", id), Money::from_major(price), quantity)
    }

    fn recorder(cart: &mut Panierr) -> Arc<Mutex<Vec<CartEvent>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        for kind in EventKind::ALL {
            let sink = Arc::clone(&log);
            cart.on(kind, move |event, _| sink.lock().unwrap().push(event.clone()));
        }
        log
    }

    #[test]
    fn test_add_merges_same_id() {
        let mut cart = Panierr::new(PanierrConfig::default(), MemoryStorage::new());
        let events = recorder(&mut cart);

        cart.add_item(item("a", 10, 1));
        cart.add_item(item("a", 10, 2));

        assert_eq!(cart.get_cart_items().len(), 1);
        assert_eq!(cart.get_item_quantity("a"), Some(3));
        assert_eq!(cart.calculate_totals().total_price, Money::from_major(30));

        let events = events.lock().unwrap();
        assert!(matches!(&events[0], CartEvent::ItemAdded { item } if item.quantity == 1));
        assert!(matches!(&events[1], CartEvent::ItemUpdated { item } if item.quantity == 3));
    }

    #[test]
    fn test_zero_quantity_add_counts_as_one() {
        let mut cart = Panierr::new(PanierrConfig::default(), MemoryStorage::new());
        cart.add_item(item("a", 1, 0));
        assert_eq!(cart.get_item_quantity("a"), Some(1));
    }

    #[test]
    fn test_update_quantity() {
        let mut cart = Panierr::new(PanierrConfig::default(), MemoryStorage::new());
        cart.add_item(item("a", 5, 1));
        cart.update_item_quantity("a", 4);
        assert_eq!(cart.get_item_quantity("a"), Some(4));

        cart.update_item_quantity("a", 0);
        assert_eq!(cart.get_item_quantity("a"), None);
    }

    #[test]
    fn test_listener_sees_state_after_change() {
        let mut cart = Panierr::new(PanierrConfig::default(), MemoryStorage::new());
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        cart.on(EventKind::ItemAdded, move |_, view| {
            *sink.lock().unwrap() = Some(view.totals().total_items);
        });

        cart.add_item(item("a", 1, 2));
        assert_eq!(*seen.lock().unwrap(), Some(2));
    }

    #[test]
    fn test_destroy_drops_listeners_without_persisting() {
        let storage = MemoryStorage::new();
        let mut cart = Panierr::new(PanierrConfig::default(), storage.clone());
        let events = recorder(&mut cart);
        cart.add_item(item("a", 1, 1));
        let stored = storage.get("panierrCartItems").unwrap();

        cart.destroy();
        assert!(cart.is_empty());
        assert_eq!(cart.listener_count(EventKind::ItemAdded), 0);
        assert_eq!(storage.get("panierrCartItems").unwrap(), stored);

        cart.add_item(item("b", 1, 1));
        assert_eq!(events.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_no_storage_still_works() {
        let mut cart = Panierr::builder(PanierrConfig::default()).build();
        cart.add_item(item("a", 2, 2));
        cart.save();
        assert_eq!(cart.calculate_totals().total_price, Money::from_major(4));
    }
}
