//! The cart, persisted after every change.
//!
//! [`CartStore`] wraps the pure [`Cart`] transitions and writes the result
//! to storage under `covu_cart`, so the cart survives restarts.

use std::sync::Arc;

use covu_core::ProductId;
use covu_core::cart::{Cart, CartItem};
use covu_core::models::Product;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::storage::{CART_KEY, Storage, StorageError};

/// Persisted shopping cart.
pub struct CartStore {
    cart: Cart,
    storage: Arc<dyn Storage>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("cart", &self.cart)
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Load the cart from storage.
    ///
    /// A stored cart that no longer parses is discarded and replaced by an
    /// empty one.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn load(storage: Arc<dyn Storage>) -> Result<Self, StorageError> {
        let cart = match storage.get(CART_KEY)? {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "Discarding unreadable stored cart");
                Cart::new()
            }),
            None => Cart::new(),
        };
        Ok(Self { cart, storage })
    }

    /// The current cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        self.cart.items()
    }

    /// Add `quantity` units of `product`, merging with an existing line.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn add_item(&mut self, product: &Product, quantity: u32) -> Result<(), StorageError> {
        self.cart.add_item(CartItem::new(product, quantity));
        self.persist()
    }

    /// Add a prepared line, merging with an existing line.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn add_line(&mut self, item: CartItem) -> Result<(), StorageError> {
        self.cart.add_item(item);
        self.persist()
    }

    /// Remove a product. Returns whether it was in the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn remove_item(&mut self, product_id: ProductId) -> Result<bool, StorageError> {
        let removed = self.cart.remove_item(product_id);
        self.persist()?;
        Ok(removed)
    }

    /// Set a product's quantity; zero or less removes it.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn update_quantity(
        &mut self,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<bool, StorageError> {
        let found = self.cart.update_quantity(product_id, quantity);
        self.persist()?;
        Ok(found)
    }

    /// Add one unit of a product already in the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn increment(&mut self, product_id: ProductId) -> Result<bool, StorageError> {
        let found = self.cart.increment(product_id);
        self.persist()?;
        Ok(found)
    }

    /// Remove one unit of a product, dropping the line at zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn decrement(&mut self, product_id: ProductId) -> Result<bool, StorageError> {
        let found = self.cart.decrement(product_id);
        self.persist()?;
        Ok(found)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.cart.clear();
        self.persist()
    }

    #[must_use]
    pub fn total(&self) -> Decimal {
        self.cart.total()
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.cart.count()
    }

    #[must_use]
    pub fn is_in_cart(&self, product_id: ProductId) -> bool {
        self.cart.is_in_cart(product_id)
    }

    #[must_use]
    pub fn get_item(&self, product_id: ProductId) -> Option<&CartItem> {
        self.cart.get_item(product_id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    fn persist(&self) -> Result<(), StorageError> {
        self.storage.set(CART_KEY, &serde_json::to_string(&self.cart)?)?;
        debug!(
            lines = self.cart.items().len(),
            count = self.cart.count(),
            "Cart saved"
        );
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::{FileStorage, MemoryStorage};

    fn product(id: i64, price: i64) -> Product {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "name": format!("Product {id}"),
            "price": price.to_string(),
            "store_name": "Ada's Closet",
            "images": ["https://cdn.covu.ng/p.jpg"]
        }))
        .unwrap()
    }

    #[test]
    fn test_mutations_are_persisted() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let mut cart = CartStore::load(Arc::clone(&storage)).unwrap();

        cart.add_item(&product(1, 1000), 2).unwrap();
        cart.add_item(&product(1, 1000), 3).unwrap();
        cart.add_item(&product(2, 500), 1).unwrap();

        let reloaded = CartStore::load(Arc::clone(&storage)).unwrap();
        assert_eq!(reloaded.cart(), cart.cart());
        assert_eq!(reloaded.count(), 6);
        assert_eq!(reloaded.total(), Decimal::from(5500));

        let line = reloaded.get_item(ProductId::new(1)).unwrap();
        assert_eq!(line.store_name.as_deref(), Some("Ada's Closet"));
        assert_eq!(line.image.as_deref(), Some("https://cdn.covu.ng/p.jpg"));
    }

    #[test]
    fn test_update_and_clear_are_persisted() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let mut cart = CartStore::load(Arc::clone(&storage)).unwrap();
        cart.add_item(&product(1, 1000), 2).unwrap();

        assert!(cart.update_quantity(ProductId::new(1), 0).unwrap());
        assert!(CartStore::load(Arc::clone(&storage)).unwrap().is_empty());

        cart.add_item(&product(3, 200), 1).unwrap();
        cart.clear().unwrap();
        assert!(CartStore::load(storage).unwrap().is_empty());
    }

    #[test]
    fn test_cart_survives_restart_on_disk() {
        let dir = crate::storage::tests::scratch_dir("cart");
        {
            let mut cart = CartStore::load(Arc::new(FileStorage::in_dir(&dir))).unwrap();
            cart.add_item(&product(5, 12000), 1).unwrap();
            assert!(cart.increment(ProductId::new(5)).unwrap());
        }

        let cart = CartStore::load(Arc::new(FileStorage::in_dir(&dir))).unwrap();
        assert_eq!(cart.get_item(ProductId::new(5)).map(|i| i.quantity), Some(2));

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_unreadable_cart_starts_empty() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(CART_KEY, "[[[").unwrap();
        let cart = CartStore::load(storage).unwrap();
        assert!(cart.is_empty());
    }
}
