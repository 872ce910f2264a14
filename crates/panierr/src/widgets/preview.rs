//! # Cart Preview Widget
//!
//! A small badge that follows the cart: item count, total and a checkout
//! button, pinned to one corner of the page.
//!
//! ```text
//!                                    ┌──────────────────────┐
//!                                    │ Cart Preview         │
//!                                    │ 3 items              │
//!                                    │ Total: $42.00        │
//!                                    │ [     Checkout     ] │
//!                                    └──────────────────────┘
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::binder::escape;
use crate::engine::{CartView, Panierr};
use crate::events::{EventKind, ListenerId};

/// Corner the badge is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    TopLeft,
    #[default]
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Position {
    pub fn as_str(&self) -> &'static str {
        match self {
            Position::TopLeft => "top-left",
            Position::TopRight => "top-right",
            Position::BottomLeft => "bottom-left",
            Position::BottomRight => "bottom-right",
        }
    }

    fn css(&self) -> &'static str {
        match self {
            Position::TopLeft => "top: 1rem; left: 1rem;",
            Position::TopRight => "top: 1rem; right: 1rem;",
            Position::BottomLeft => "bottom: 1rem; left: 1rem;",
            Position::BottomRight => "bottom: 1rem; right: 1rem;",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "top-left" => Ok(Position::TopLeft),
            "top-right" => Ok(Position::TopRight),
            "bottom-left" => Ok(Position::BottomLeft),
            "bottom-right" => Ok(Position::BottomRight),
            other => Err(format!("Unknown position: {}", other)),
        }
    }
}

/// Display options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewOptions {
    pub heading_text: String,
    pub checkout_text: String,
    pub position: Position,
    /// Show only a cart icon.
    pub as_icon: bool,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        PreviewOptions {
            heading_text: "Cart Preview".to_string(),
            checkout_text: "Checkout".to_string(),
            position: Position::default(),
            as_icon: false,
        }
    }
}

/// The two live lines of the badge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewSummary {
    pub items: String,
    pub total: String,
}

impl PreviewSummary {
    fn from_view(view: &CartView<'_>) -> Self {
        let totals = view.totals();
        PreviewSummary {
            items: format!("{} items", totals.total_items),
            total: format!("Total: {}", view.format_price(totals.total_price)),
        }
    }
}

/// Cart preview badge, kept current by item-change listeners.
#[derive(Debug)]
pub struct CartPreview {
    options: PreviewOptions,
    summary: Arc<Mutex<PreviewSummary>>,
    handles: Vec<(EventKind, ListenerId)>,
}

impl CartPreview {
    /// Subscribes to item changes on `cart`.
    pub fn attach(cart: &mut Panierr, options: PreviewOptions) -> Self {
        let summary = Arc::new(Mutex::new(PreviewSummary::from_view(&cart.view())));

        let handles = EventKind::ITEM_CHANGES
            .into_iter()
            .map(|kind| {
                let summary = Arc::clone(&summary);
                let id = cart.on(kind, move |_, view| {
                    *summary.lock().unwrap_or_else(PoisonError::into_inner) =
                        PreviewSummary::from_view(view);
                });
                (kind, id)
            })
            .collect();

        debug!(position = %options.position, "cart preview attached");
        CartPreview {
            options,
            summary,
            handles,
        }
    }

    /// Removes the widget's listeners from `cart`.
    pub fn detach(&mut self, cart: &mut Panierr) {
        for (kind, id) in self.handles.drain(..) {
            cart.off(kind, id);
        }
        debug!("cart preview detached");
    }

    pub fn is_attached(&self) -> bool {
        !self.handles.is_empty()
    }

    pub fn options(&self) -> &PreviewOptions {
        &self.options
    }

    pub fn summary(&self) -> PreviewSummary {
        self.lock().clone()
    }

    /// The checkout button: empties the cart.
    pub fn checkout(&self, cart: &mut Panierr) {
        debug!("checkout from cart preview");
        cart.clear_cart();
    }

    /// Badge markup.
    pub fn render(&self) -> String {
        let summary = self.summary();
        let options = &self.options;
        let (padding, width) = if options.as_icon {
            ("0.5rem", "50px")
        } else {
            ("1rem", "220px")
        };
        let hidden = if options.as_icon { " hidden" } else { "" };
        let icon = if options.as_icon {
            "<i class=\"panierr-cart-icon\"></i>"
        } else {
            ""
        };

        format!(
            concat!(
                "<div class=\"cart-preview\" data-position=\"{position}\" ",
                "style=\"position: fixed; z-index: 1000; padding: {padding}; width: {width}; {css}\">",
                "{icon}",
                "<h3{hidden}>{heading}</h3>",
                "<div class=\"cart-preview-items\"{hidden}>{items}</div>",
                "<div class=\"cart-preview-total\"{hidden}>{total}</div>",
                "<button class=\"cart-preview-checkout\"{hidden}>{checkout}</button>",
                "</div>"
            ),
            position = options.position,
            padding = padding,
            width = width,
            css = options.position.css(),
            icon = icon,
            hidden = hidden,
            heading = escape(&options.heading_text),
            items = escape(&summary.items),
            total = escape(&summary.total),
            checkout = escape(&options.checkout_text),
        )
    }

    fn lock(&self) -> MutexGuard<'_, PreviewSummary> {
        self.summary.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
