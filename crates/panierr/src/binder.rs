//! # Presentation Binder
//!
//! Turns markup interactions into engine calls and renders cart state back
//! into markup, without depending on any particular UI toolkit.
//!
//! ## Interaction Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Element clicked                                                        │
//! │  data-action="add-to-cart" data-item-id="tee" data-item-price="19.99"  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ElementData { attributes, value, image }                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PresentationBinder::dispatch ──► CartAction::AddToCart                 │
//! │       │                              │                                  │
//! │       │ invalid markup               ▼                                  │
//! │       ▼                         extract + validate item                 │
//! │  Err(BinderError)                    │                                  │
//! │  (engine untouched)                  ▼                                  │
//! │                                 cart.add_item(item)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Input validation lives here. The engine only ever sees well-formed items.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use panierr_core::{validation, CartItem};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::engine::{CartView, Panierr};
use crate::error::{BinderError, BinderResult};

// =============================================================================
// Actions
// =============================================================================

/// Interactions the binder understands, keyed by the action attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CartAction {
    AddToCart,
    RemoveFromCart,
    IncreaseQuantity,
    DecreaseQuantity,
    ClearCart,
    ToggleCart,
    ApplyDiscount,
}

impl CartAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            CartAction::AddToCart => "add-to-cart",
            CartAction::RemoveFromCart => "remove-from-cart",
            CartAction::IncreaseQuantity => "increase-quantity",
            CartAction::DecreaseQuantity => "decrease-quantity",
            CartAction::ClearCart => "clear-cart",
            CartAction::ToggleCart => "toggle-cart",
            CartAction::ApplyDiscount => "apply-discount",
        }
    }
}

impl fmt::Display for CartAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CartAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "add-to-cart" => Ok(CartAction::AddToCart),
            "remove-from-cart" => Ok(CartAction::RemoveFromCart),
            "increase-quantity" => Ok(CartAction::IncreaseQuantity),
            "decrease-quantity" => Ok(CartAction::DecreaseQuantity),
            "clear-cart" => Ok(CartAction::ClearCart),
            "toggle-cart" => Ok(CartAction::ToggleCart),
            "apply-discount" => Ok(CartAction::ApplyDiscount),
            other => Err(format!("Unknown cart action: {}", other)),
        }
    }
}

// =============================================================================
// Markup Model
// =============================================================================

/// Names of the data attributes the binder reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DataAttributes {
    pub action: String,
    pub item_id: String,
    pub item_name: String,
    pub item_price: String,
    pub item_quantity: String,
}

impl Default for DataAttributes {
    fn default() -> Self {
        DataAttributes {
            action: "data-action".to_string(),
            item_id: "data-item-id".to_string(),
            item_name: "data-item-name".to_string(),
            item_price: "data-item-price".to_string(),
            item_quantity: "data-item-quantity".to_string(),
        }
    }
}

/// What the binder needs to know about the element that was interacted
/// with: its attributes, its input value (for inputs) and the image of the
/// enclosing product card, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementData {
    pub attributes: BTreeMap<String, String>,
    pub value: Option<String>,
    pub image: Option<String>,
}

impl ElementData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn image(mut self, src: impl Into<String>) -> Self {
        self.image = Some(src.into());
        self
    }

    /// Attribute value, treating empty as absent.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

/// Rendered totals for count, total and discount placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTotals {
    pub count: String,
    pub total: String,
    pub discount: String,
}

type ItemTemplate = Box<dyn Fn(&CartItem, &CartView<'_>) -> String + Send + Sync>;

// =============================================================================
// Binder
// =============================================================================

/// Headless presentation binder.
pub struct PresentationBinder {
    attributes: DataAttributes,
    item_template: Option<ItemTemplate>,
    open: bool,
}

impl Default for PresentationBinder {
    fn default() -> Self {
        PresentationBinder::new(DataAttributes::default())
    }
}

impl fmt::Debug for PresentationBinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PresentationBinder")
            .field("attributes", &self.attributes)
            .field("custom_template", &self.item_template.is_some())
            .field("open", &self.open)
            .finish()
    }
}

impl PresentationBinder {
    pub fn new(attributes: DataAttributes) -> Self {
        PresentationBinder {
            attributes,
            item_template: None,
            open: false,
        }
    }

    /// Replaces the built-in cart line markup.
    pub fn with_item_template<F>(mut self, template: F) -> Self
    where
        F: Fn(&CartItem, &CartView<'_>) -> String + Send + Sync + 'static,
    {
        self.item_template = Some(Box::new(template));
        self
    }

    pub fn attributes(&self) -> &DataAttributes {
        &self.attributes
    }

    /// Whether the cart panel is shown (flipped by `toggle-cart`).
    pub fn is_open(&self) -> bool {
        self.open
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Handles a click on `element`.
    ///
    /// Returns the action performed, or `None` when the element carries no
    /// action or an unknown one.
    pub fn dispatch(
        &mut self,
        cart: &mut Panierr,
        element: &ElementData,
    ) -> BinderResult<Option<CartAction>> {
        let Some(raw) = element.get(&self.attributes.action) else {
            return Ok(None);
        };
        let action = match raw.parse::<CartAction>() {
            Ok(action) => action,
            Err(reason) => {
                debug!(%reason, "ignoring element");
                return Ok(None);
            }
        };

        let result = self.perform(cart, action, element);
        if let Err(e) = &result {
            warn!(%action, error = %e, "binder could not handle element");
        }
        result.map(|()| Some(action))
    }

    fn perform(
        &mut self,
        cart: &mut Panierr,
        action: CartAction,
        element: &ElementData,
    ) -> BinderResult<()> {
        match action {
            CartAction::AddToCart => {
                let item = self.extract_item(element)?;
                cart.add_item(item);
            }
            CartAction::RemoveFromCart => {
                let id = self.item_id(element)?;
                cart.remove_item(id);
            }
            CartAction::IncreaseQuantity => {
                let id = self.item_id(element)?;
                let current = cart.get_item_quantity(id).unwrap_or(0);
                cart.update_item_quantity(id, i64::from(current) + 1);
            }
            CartAction::DecreaseQuantity => {
                let id = self.item_id(element)?;
                match cart.get_item_quantity(id) {
                    Some(current) if current > 1 => {
                        cart.update_item_quantity(id, i64::from(current) - 1)
                    }
                    _ => cart.remove_item(id),
                }
            }
            CartAction::ClearCart => cart.clear_cart(),
            CartAction::ToggleCart => {
                self.open = !self.open;
            }
            CartAction::ApplyDiscount => {
                let code = element
                    .value
                    .as_deref()
                    .ok_or_else(|| BinderError::MissingInput {
                        action: action.to_string(),
                    })?;
                cart.apply_discount(code.trim());
            }
        }
        Ok(())
    }

    /// Handles a change of a quantity input.
    ///
    /// Returns `false` when the element isn't a quantity input.
    pub fn quantity_changed(
        &mut self,
        cart: &mut Panierr,
        element: &ElementData,
    ) -> BinderResult<bool> {
        if !element.attributes.contains_key(&self.attributes.item_quantity) {
            return Ok(false);
        }

        let id = self.item_id(element)?;
        let raw = element
            .value
            .as_deref()
            .ok_or_else(|| BinderError::MissingInput {
                action: "quantity change".to_string(),
            })?;
        let quantity = validation::parse_quantity(raw)?;

        cart.update_item_quantity(id, quantity);
        Ok(true)
    }

    fn item_id<'e>(&self, element: &'e ElementData) -> BinderResult<&'e str> {
        element
            .get(&self.attributes.item_id)
            .ok_or_else(|| BinderError::MissingAttribute {
                attribute: self.attributes.item_id.clone(),
            })
    }

    /// Builds a cart item from an element's data attributes.
    ///
    /// ## Rules
    /// - id and name are required
    /// - price must parse and be non-negative (absent means 0)
    /// - quantity defaults to 1; non-positive or unparsable becomes 1
    pub fn extract_item(&self, element: &ElementData) -> BinderResult<CartItem> {
        let attrs = &self.attributes;

        let id = self.item_id(element)?;
        validation::validate_item_id(id)?;

        let name = element
            .get(&attrs.item_name)
            .ok_or_else(|| BinderError::MissingAttribute {
                attribute: attrs.item_name.clone(),
            })?;
        validation::validate_item_name(name)?;

        let price = validation::parse_price(element.get(&attrs.item_price).unwrap_or("0"))?;

        let quantity = element
            .get(&attrs.item_quantity)
            .and_then(|raw| validation::parse_quantity(raw).ok())
            .filter(|q| *q > 0)
            .map_or(1, |q| u32::try_from(q).unwrap_or(u32::MAX));

        let mut item = CartItem::new(id, name, price, quantity);
        item.image = element.image.clone();
        Ok(item)
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Markup for one cart line.
    pub fn render_item(&self, item: &CartItem, view: &CartView<'_>) -> String {
        if let Some(template) = &self.item_template {
            return template(item, view);
        }

        let attrs = &self.attributes;
        let id = escape(&item.id);
        let name = escape(&item.name);
        let image = item.image.as_deref().map(escape).unwrap_or_default();
        let price = escape(&view.format_price(item.price));

        format!(
            concat!(
                "<div class=\"panierr-cart-item\" {id_attr}=\"{id}\">",
                "<img src=\"{image}\" alt=\"{name}\">",
                "<span class=\"panierr-item-name\">{name}</span>",
                "<span class=\"panierr-item-price\">{price}</span>",
                "<div class=\"panierr-quantity-controls\">",
                "<button class=\"panierr-decrease-quantity\" {action}=\"decrease-quantity\" {id_attr}=\"{id}\">-</button>",
                "<input type=\"number\" class=\"panierr-item-quantity\" {qty_attr}=\"{qty}\" {id_attr}=\"{id}\" value=\"{qty}\" min=\"1\">",
                "<button class=\"panierr-increase-quantity\" {action}=\"increase-quantity\" {id_attr}=\"{id}\">+</button>",
                "</div>",
                "<button class=\"panierr-remove-item\" {action}=\"remove-from-cart\" {id_attr}=\"{id}\">&times;</button>",
                "</div>"
            ),
            id_attr = escape(&attrs.item_id),
            qty_attr = escape(&attrs.item_quantity),
            action = escape(&attrs.action),
            id = id,
            name = name,
            image = image,
            price = price,
            qty = item.quantity,
        )
    }

    /// Markup for every cart line, in cart order.
    pub fn render_items(&self, view: &CartView<'_>) -> String {
        view.items()
            .iter()
            .map(|item| self.render_item(item, view))
            .collect()
    }

    /// Text for the item count, final price and discount placeholders.
    pub fn render_totals(&self, view: &CartView<'_>) -> RenderedTotals {
        let totals = view.totals();
        RenderedTotals {
            count: totals.total_items.to_string(),
            total: view.format_price(totals.final_price),
            discount: view.format_price(totals.discount_amount),
        }
    }
}

/// Escapes text for use in element content and quoted attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PanierrConfig;
    use panierr_core::{Discount, Money};

    fn cart() -> Panierr {
        let config = PanierrConfig::default()
            .with_discounts(vec![Discount::percentage("SAVE10", 10.0)]);
        Panierr::builder(config).build()
    }

    fn add_button(id: &str, price: &str) -> ElementData {
        ElementData::new()
            .attr("data-action", "add-to-cart")
            .attr("data-item-id", id)
            .attr("data-item-name", format!("Product {}", id))
            .attr("data-item-price", price)
    }

    #[test]
    fn test_action_parsing() {
        assert_eq!("add-to-cart".parse::<CartAction>().unwrap(), CartAction::AddToCart);
        assert_eq!("toggle-cart".parse::<CartAction>().unwrap(), CartAction::ToggleCart);
        assert!("buy-now".parse::<CartAction>().is_err());
    }

    #[test]
    fn test_add_to_cart() {
        let mut binder = PresentationBinder::default();
        let mut cart = cart();

        let element = add_button("tee", "19.99").image("/img/tee.png");
        assert_eq!(
            binder.dispatch(&mut cart, &element).unwrap(),
            Some(CartAction::AddToCart)
        );

        let items = cart.get_cart_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].price, Money::from_cents(1999));
        assert_eq!(items[0].quantity, 1);
        assert_eq!(items[0].image.as_deref(), Some("/img/tee.png"));
    }

    #[test]
    fn test_add_normalizes_quantity() {
        let mut binder = PresentationBinder::default();
        let mut cart = cart();

        binder
            .dispatch(&mut cart, &add_button("a", "1").attr("data-item-quantity", "-3"))
            .unwrap();
        assert_eq!(cart.get_item_quantity("a"), Some(1));

        binder
            .dispatch(&mut cart, &add_button("b", "1").attr("data-item-quantity", "4"))
            .unwrap();
        assert_eq!(cart.get_item_quantity("b"), Some(4));
    }

    #[test]
    fn test_invalid_markup_never_reaches_engine() {
        let mut binder = PresentationBinder::default();
        let mut cart = cart();

        let bad_price = add_button("a", "abc");
        assert!(matches!(
            binder.dispatch(&mut cart, &bad_price),
            Err(BinderError::InvalidItem(_))
        ));

        let negative = add_button("a", "-5");
        assert!(binder.dispatch(&mut cart, &negative).is_err());

        let no_name = ElementData::new()
            .attr("data-action", "add-to-cart")
            .attr("data-item-id", "a");
        assert!(matches!(
            binder.dispatch(&mut cart, &no_name),
            Err(BinderError::MissingAttribute { .. })
        ));

        assert!(cart.is_empty());
    }

    #[test]
    fn test_unknown_or_missing_action_ignored() {
        let mut binder = PresentationBinder::default();
        let mut cart = cart();
        let unknown = ElementData::new().attr("data-action", "buy-now");
        assert_eq!(binder.dispatch(&mut cart, &unknown).unwrap(), None);
        assert_eq!(binder.dispatch(&mut cart, &ElementData::new()).unwrap(), None);
    }

    #[test]
    fn test_increase_and_decrease() {
        let mut binder = PresentationBinder::default();
        let mut cart = cart();
        binder.dispatch(&mut cart, &add_button("a", "2")).unwrap();

        let increase = ElementData::new()
            .attr("data-action", "increase-quantity")
            .attr("data-item-id", "a");
        let decrease = ElementData::new()
            .attr("data-action", "decrease-quantity")
            .attr("data-item-id", "a");

        binder.dispatch(&mut cart, &increase).unwrap();
        assert_eq!(cart.get_item_quantity("a"), Some(2));

        binder.dispatch(&mut cart, &decrease).unwrap();
        assert_eq!(cart.get_item_quantity("a"), Some(1));

        binder.dispatch(&mut cart, &decrease).unwrap();
        assert_eq!(cart.get_item_quantity("a"), None);
    }

    #[test]
    fn test_quantity_input_change() {
        let mut binder = PresentationBinder::default();
        let mut cart = cart();
        binder.dispatch(&mut cart, &add_button("a", "2")).unwrap();

        let input = ElementData::new()
            .attr("data-item-quantity", "1")
            .attr("data-item-id", "a")
            .value("7");
        assert!(binder.quantity_changed(&mut cart, &input).unwrap());
        assert_eq!(cart.get_item_quantity("a"), Some(7));

        let garbage = input.clone().value("seven");
        assert!(binder.quantity_changed(&mut cart, &garbage).is_err());
        assert_eq!(cart.get_item_quantity("a"), Some(7));

        let not_quantity = ElementData::new().attr("data-item-id", "a").value("3");
        assert!(!binder.quantity_changed(&mut cart, &not_quantity).unwrap());
    }

    #[test]
    fn test_apply_discount_trims_input() {
        let mut binder = PresentationBinder::default();
        let mut cart = cart();
        binder.dispatch(&mut cart, &add_button("a", "100")).unwrap();

        let apply = ElementData::new()
            .attr("data-action", "apply-discount")
            .value("  SAVE10 ");
        binder.dispatch(&mut cart, &apply).unwrap();
        assert_eq!(cart.calculate_totals().final_price, Money::from_major(90));

        let no_input = ElementData::new().attr("data-action", "apply-discount");
        assert!(matches!(
            binder.dispatch(&mut cart, &no_input),
            Err(BinderError::MissingInput { .. })
        ));
    }

    #[test]
    fn test_toggle_and_clear() {
        let mut binder = PresentationBinder::default();
        let mut cart = cart();
        binder.dispatch(&mut cart, &add_button("a", "1")).unwrap();

        let toggle = ElementData::new().attr("data-action", "toggle-cart");
        binder.dispatch(&mut cart, &toggle).unwrap();
        assert!(binder.is_open());
        binder.dispatch(&mut cart, &toggle).unwrap();
        assert!(!binder.is_open());

        let clear = ElementData::new().attr("data-action", "clear-cart");
        binder.dispatch(&mut cart, &clear).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_custom_attribute_names() {
        let attributes = DataAttributes {
            action: "data-cart-action".into(),
            item_id: "data-sku".into(),
            ..DataAttributes::default()
        };
        let mut binder = PresentationBinder::new(attributes);
        let mut cart = cart();

        let element = ElementData::new()
            .attr("data-cart-action", "add-to-cart")
            .attr("data-sku", "x")
            .attr("data-item-name", "X")
            .attr("data-item-price", "3");
        binder.dispatch(&mut cart, &element).unwrap();
        assert_eq!(cart.get_item_quantity("x"), Some(1));
    }

    #[test]
    fn test_render_item_escapes_markup() {
        let binder = PresentationBinder::default();
        let mut cart = cart();
        cart.add_item(CartItem::new("a\"1", "<b>Bold</b> & Co", Money::from_cents(1050), 2));

        let view = cart.view();
        let html = binder.render_items(&view);
        assert!(html.contains("&lt;b&gt;Bold&lt;/b&gt; &amp; Co"));
        assert!(html.contains("data-item-id=\"a&quot;1\""));
        assert!(html.contains("$10.50"));
        assert!(html.contains("value=\"2\""));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn test_custom_template() {
        let binder = PresentationBinder::default()
            .with_item_template(|item, view| format!("{}={}", item.id, view.format_price(item.line_total())));
        let mut cart = cart();
        cart.add_item(CartItem::new("a", "A", Money::from_major(3), 2));
        assert_eq!(binder.render_items(&cart.view()), "a=$6.00");
    }

    #[test]
    fn test_render_totals() {
        let mut binder = PresentationBinder::default();
        let mut cart = cart();
        binder.dispatch(&mut cart, &add_button("a", "50").attr("data-item-quantity", "2")).unwrap();
        cart.apply_discount("SAVE10");

        let totals = binder.render_totals(&cart.view());
        assert_eq!(
            totals,
            RenderedTotals {
                count: "2".into(),
                total: "$90.00".into(),
                discount: "$10.00".into(),
            }
        );
    }
}
