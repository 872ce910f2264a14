//! # Cart Events
//!
//! Change notifications and the listener registry.
//!
//! ## Dispatch
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  operation ──► mutate ──► persist ──► emit(event)                       │
//! │                                          │                              │
//! │                          listeners[event.kind()] in registration order  │
//! │                          ├── listener #1 (event, view)                  │
//! │                          ├── listener #2 (event, view)                  │
//! │                          └── ...                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Dispatch is synchronous: every listener has run by the time the
//! triggering operation returns. Listeners get a read-only [`CartView`] of
//! the state after the change.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use panierr_core::{CartItem, Discount};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::engine::CartView;

// =============================================================================
// Events
// =============================================================================

/// Something that happened to the cart.
///
/// Serializes with a `type` tag, e.g.
/// `{"type":"itemRemoved","itemId":"tee-1"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CartEvent {
    /// A new line was appended.
    ItemAdded { item: CartItem },

    /// A line was removed.
    ItemRemoved {
        #[serde(rename = "itemId")]
        item_id: String,
    },

    /// An existing line's quantity changed.
    ItemUpdated { item: CartItem },

    /// Items and discounts were emptied.
    CartCleared,

    /// A catalog discount became the active discount.
    DiscountApplied { discount: Discount },

    /// The active discount was cleared.
    DiscountRemoved,

    /// An operation failed.
    Error {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<Value>,
    },
}

impl CartEvent {
    /// The kind listeners subscribe to.
    pub fn kind(&self) -> EventKind {
        match self {
            CartEvent::ItemAdded { .. } => EventKind::ItemAdded,
            CartEvent::ItemRemoved { .. } => EventKind::ItemRemoved,
            CartEvent::ItemUpdated { .. } => EventKind::ItemUpdated,
            CartEvent::CartCleared => EventKind::CartCleared,
            CartEvent::DiscountApplied { .. } => EventKind::DiscountApplied,
            CartEvent::DiscountRemoved => EventKind::DiscountRemoved,
            CartEvent::Error { .. } => EventKind::Error,
        }
    }
}

/// Event discriminant used as the subscription key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    ItemAdded,
    ItemRemoved,
    ItemUpdated,
    CartCleared,
    DiscountApplied,
    DiscountRemoved,
    Error,
}

impl EventKind {
    /// Every kind, in declaration order.
    pub const ALL: [EventKind; 7] = [
        EventKind::ItemAdded,
        EventKind::ItemRemoved,
        EventKind::ItemUpdated,
        EventKind::CartCleared,
        EventKind::DiscountApplied,
        EventKind::DiscountRemoved,
        EventKind::Error,
    ];

    /// Kinds that change the item collection.
    pub const ITEM_CHANGES: [EventKind; 4] = [
        EventKind::ItemAdded,
        EventKind::ItemRemoved,
        EventKind::ItemUpdated,
        EventKind::CartCleared,
    ];

    /// The wire name (`itemAdded`, `cartCleared`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::ItemAdded => "itemAdded",
            EventKind::ItemRemoved => "itemRemoved",
            EventKind::ItemUpdated => "itemUpdated",
            EventKind::CartCleared => "cartCleared",
            EventKind::DiscountApplied => "discountApplied",
            EventKind::DiscountRemoved => "discountRemoved",
            EventKind::Error => "error",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("Unknown event kind: {}", s))
    }
}

// =============================================================================
// Listener Registry
// =============================================================================

/// Handle returned by `on`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// A subscribed callback. It sees the cart through a read-only
/// [`CartView`] and cannot call back into the engine.
pub type Listener = Box<dyn FnMut(&CartEvent, &CartView<'_>) + Send>;

/// Ordered listeners per event kind.
#[derive(Default)]
pub(crate) struct EventBus {
    next_id: u64,
    listeners: HashMap<EventKind, Vec<(ListenerId, Listener)>>,
}

impl EventBus {
    pub(crate) fn on(&mut self, kind: EventKind, listener: Listener) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.entry(kind).or_default().push((id, listener));
        id
    }

    /// Removes one listener; returns whether it was registered.
    pub(crate) fn off(&mut self, kind: EventKind, id: ListenerId) -> bool {
        let Some(list) = self.listeners.get_mut(&kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|(existing, _)| *existing != id);
        before != list.len()
    }

    pub(crate) fn clear(&mut self) {
        self.listeners.clear();
    }

    pub(crate) fn count(&self, kind: EventKind) -> usize {
        self.listeners.get(&kind).map_or(0, Vec::len)
    }

    pub(crate) fn emit(&mut self, event: &CartEvent, view: &CartView<'_>) {
        if let Some(list) = self.listeners.get_mut(&event.kind()) {
            for (_, listener) in list.iter_mut() {
                listener(event, view);
            }
        }
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<EventKind, usize> = self
            .listeners
            .iter()
            .map(|(kind, list)| (*kind, list.len()))
            .collect();
        f.debug_struct("EventBus").field("listeners", &counts).finish()
    }
}
