//! Shopping cart and its pure transitions.
//!
//! [`Cart`] holds at most one [`CartItem`] per product and never holds an
//! item with a zero quantity. Every method here is a pure in-memory
//! transition; persisting the result is the caller's job.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::Product;
use crate::types::ProductId;

/// One product line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(alias = "id")]
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub store_name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl CartItem {
    /// Build a cart line for `quantity` units of `product`.
    #[must_use]
    pub fn new(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            price: product.price,
            quantity,
            store_name: product.store_label().map(str::to_owned),
            image: product.primary_image(),
        }
    }

    /// Price multiplied by quantity, saturating at the `Decimal` bounds.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.price.saturating_mul(Decimal::from(self.quantity))
    }
}

/// Line sent to the order endpoint at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutLine {
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Decimal,
}

/// The shopping cart.
///
/// Deserializing replays every stored line through [`Cart::add_item`], so a
/// cart read back from storage merges duplicate products and drops
/// zero-quantity lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct Cart {
    items: Vec<CartItem>,
}

#[derive(Deserialize)]
struct StoredCart {
    #[serde(default)]
    items: Vec<CartItem>,
}

impl<'de> Deserialize<'de> for Cart {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let stored = StoredCart::deserialize(deserializer)?;
        let mut cart = Self::new();
        for item in stored.items {
            cart.add_item(item);
        }
        Ok(cart)
    }
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Add `item.quantity` units of a product.
    ///
    /// If the product is already in the cart its quantity grows by
    /// `item.quantity` and the existing line keeps its name and price;
    /// otherwise the item is appended. Adding zero units does nothing.
    pub fn add_item(&mut self, item: CartItem) {
        if item.quantity == 0 {
            return;
        }

        match self.position(item.product_id) {
            Some(index) => {
                if let Some(existing) = self.items.get_mut(index) {
                    existing.quantity = existing.quantity.saturating_add(item.quantity);
                }
            }
            None => self.items.push(item),
        }
    }

    /// Remove a product from the cart. Returns whether it was present.
    pub fn remove_item(&mut self, product_id: ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.product_id != product_id);
        self.items.len() != before
    }

    /// Set a product's quantity, removing it when `quantity <= 0`.
    ///
    /// Returns whether the product was present.
    pub fn update_quantity(&mut self, product_id: ProductId, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.remove_item(product_id);
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        self.items
            .iter_mut()
            .find(|item| item.product_id == product_id)
            .map(|item| item.quantity = quantity)
            .is_some()
    }

    /// Add one unit of a product already in the cart.
    pub fn increment(&mut self, product_id: ProductId) -> bool {
        let next = self.get_item(product_id).map(|item| i64::from(item.quantity) + 1);
        next.is_some_and(|quantity| self.update_quantity(product_id, quantity))
    }

    /// Remove one unit of a product, dropping the line at zero.
    pub fn decrement(&mut self, product_id: ProductId) -> bool {
        let next = self.get_item(product_id).map(|item| i64::from(item.quantity) - 1);
        next.is_some_and(|quantity| self.update_quantity(product_id, quantity))
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of price × quantity over all lines, saturating at the `Decimal`
    /// bounds.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items
            .iter()
            .map(CartItem::subtotal)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Whether a product is in the cart.
    #[must_use]
    pub fn is_in_cart(&self, product_id: ProductId) -> bool {
        self.position(product_id).is_some()
    }

    /// The line for a product, if present.
    #[must_use]
    pub fn get_item(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product_id == product_id)
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Lines in the shape the order endpoint expects.
    #[must_use]
    pub fn checkout_lines(&self) -> Vec<CheckoutLine> {
        self.items
            .iter()
            .map(|item| CheckoutLine {
                product_id: item.product_id,
                quantity: item.quantity,
                price: item.price,
            })
            .collect()
    }

    fn position(&self, product_id: ProductId) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.product_id == product_id)
    }
}
