//! Cache types for catalog responses.

use covu_core::models::{Product, Store};
use covu_core::{ProductId, StoreId};

/// Cache key for catalog detail lookups.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Product(ProductId),
    Store(StoreId),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Store(Box<Store>),
}
