//! Store catalog operations.

use covu_core::models::{Product, Rating, Store};
use covu_core::validate::validate_rating;
use covu_core::{Category, Page, StoreId};
use serde_json::{Value, json};
use tracing::{debug, instrument};

use super::CovuClient;
use super::cache::{CacheKey, CacheValue};
use crate::error::ApiError;
use crate::http::ApiRequest;

/// Filters for the store list.
#[derive(Debug, Clone, Default)]
pub struct StoreQuery {
    /// 1-based page; `0` is treated as `1`.
    pub page: u32,
    /// Category slug; `all` disables filtering.
    pub category: Option<String>,
    pub search: Option<String>,
}

impl CovuClient {
    /// List stores.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_stores(&self, query: &StoreQuery) -> Result<Page<Store>, ApiError> {
        let page = query.page.max(1);
        let request = ApiRequest::get("/stores/")
            .query("page", page)
            .query("page_size", self.page_size())
            .query_opt("category", category_filter(query.category.as_deref()))
            .query_opt("search", search_filter(query.search.as_deref()));

        let stores: Page<Store> = self.api().send(request).await?;
        Ok(stores.with_page(page))
    }

    /// Get a store by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is not found or the API request fails.
    #[instrument(skip(self), fields(store_id = %id))]
    pub async fn get_store(&self, id: StoreId) -> Result<Store, ApiError> {
        let cache_key = CacheKey::Store(id);

        // Check cache
        if let Some(CacheValue::Store(store)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for store");
            return Ok(*store);
        }

        let store: Store = self
            .api()
            .send(ApiRequest::get(format!("/stores/{id}/")))
            .await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Store(Box::new(store.clone())))
            .await;

        Ok(store)
    }

    /// List a store's products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(store_id = %id))]
    pub async fn get_store_products(
        &self,
        id: StoreId,
        page: u32,
    ) -> Result<Page<Product>, ApiError> {
        let page = page.max(1);
        let request = ApiRequest::get(format!("/stores/{id}/products/"))
            .query("page", page)
            .query("page_size", self.page_size());

        let products: Page<Product> = self.api().send(request).await?;
        Ok(products.with_page(page))
    }

    /// Rate a store from 1 to 5 stars with an optional review.
    ///
    /// # Errors
    ///
    /// Returns an error if the rating is out of range or the backend
    /// rejects it (for example when the user has no completed order there).
    #[instrument(skip(self, review), fields(store_id = %id))]
    pub async fn rate_store(
        &self,
        id: StoreId,
        stars: u8,
        review: Option<&str>,
    ) -> Result<Rating, ApiError> {
        let stars = validate_rating(stars)?;
        let request = ApiRequest::post(format!("/stores/{id}/rate/"))
            .json(json!({ "rating": stars, "review": review.unwrap_or_default() }));

        let rating = self.api().send(request).await?;
        self.invalidate(CacheKey::Store(id)).await;
        Ok(rating)
    }

    /// Create a store for the signed-in seller.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the store.
    #[instrument(skip(self, fields))]
    pub async fn create_store(&self, fields: Value) -> Result<Store, ApiError> {
        self.api()
            .send(ApiRequest::post("/stores/").json(fields))
            .await
    }

    /// Update a store the signed-in seller owns.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the update.
    #[instrument(skip(self, changes), fields(store_id = %id))]
    pub async fn update_store(&self, id: StoreId, changes: Value) -> Result<Store, ApiError> {
        let store: Store = self
            .api()
            .send(ApiRequest::patch(format!("/stores/{id}/")).json(changes))
            .await?;
        self.invalidate(CacheKey::Store(id)).await;
        Ok(store)
    }
}

/// Category parameter, omitted for blank input and the `all` pseudo-category.
pub(super) fn category_filter(category: Option<&str>) -> Option<&str> {
    category
        .map(str::trim)
        .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case(Category::ALL))
}

/// Search parameter, omitted when blank.
pub(super) fn search_filter(search: Option<&str>) -> Option<&str> {
    search.map(str::trim).filter(|s| !s.is_empty())
}
