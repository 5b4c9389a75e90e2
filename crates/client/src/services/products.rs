//! Product catalog operations.

use covu_core::models::{Product, Rating, RatingStats};
use covu_core::validate::validate_rating;
use covu_core::{Page, ProductId, StoreId};
use serde_json::{Value, json};
use tracing::{debug, instrument};

use super::CovuClient;
use super::cache::{CacheKey, CacheValue};
use super::stores::{category_filter, search_filter};
use crate::error::ApiError;
use crate::http::ApiRequest;

/// Page size used for product reviews.
const REVIEW_PAGE_SIZE: u32 = 10;

/// Filters for the product list.
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    /// 1-based page; `0` is treated as `1`.
    pub page: u32,
    /// Category slug; `all` disables filtering.
    pub category: Option<String>,
    pub search: Option<String>,
    pub store: Option<StoreId>,
}

impl CovuClient {
    /// List products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self, query: &ProductQuery) -> Result<Page<Product>, ApiError> {
        let page = query.page.max(1);
        let request = ApiRequest::get("/products/")
            .query("page", page)
            .query("page_size", self.page_size())
            .query_opt("category", category_filter(query.category.as_deref()))
            .query_opt("search", search_filter(query.search.as_deref()))
            .query_opt("store", query.store);

        let products: Page<Product> = self.api().send(request).await?;
        Ok(products.with_page(page))
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        let cache_key = CacheKey::Product(id);

        // Check cache
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let product: Product = self
            .api()
            .send(ApiRequest::get(format!("/products/{id}/")))
            .await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Products in the same category, excluding `exclude`.
    ///
    /// A blank or `all` category yields an empty list without a request.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn related_products(
        &self,
        category: &str,
        exclude: ProductId,
        limit: usize,
    ) -> Result<Vec<Product>, ApiError> {
        let Some(category) = category_filter(Some(category)) else {
            return Ok(Vec::new());
        };

        // One extra so the limit still holds after dropping `exclude`.
        let request = ApiRequest::get("/products/")
            .query("category", category)
            .query("page_size", limit + 1);
        let products: Page<Product> = self.api().send(request).await?;

        Ok(products
            .items
            .into_iter()
            .filter(|p| p.id != exclude)
            .take(limit)
            .collect())
    }

    /// Rate a product from 1 to 5 stars with an optional review.
    ///
    /// # Errors
    ///
    /// Returns an error if the rating is out of range or the backend
    /// rejects it.
    #[instrument(skip(self, review), fields(product_id = %id))]
    pub async fn rate_product(
        &self,
        id: ProductId,
        stars: u8,
        review: Option<&str>,
    ) -> Result<Rating, ApiError> {
        let stars = validate_rating(stars)?;
        let request = ApiRequest::post(format!("/products/{id}/rate/"))
            .json(json!({ "rating": stars, "review": review.unwrap_or_default() }));

        let rating = self.api().send(request).await?;
        self.invalidate(CacheKey::Product(id)).await;
        Ok(rating)
    }

    /// Rating summary for a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product_rating_stats(&self, id: ProductId) -> Result<RatingStats, ApiError> {
        self.api()
            .send(ApiRequest::get("/ratings/stats/").query("product", id))
            .await
    }

    /// Reviews left on a product, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product_reviews(
        &self,
        id: ProductId,
        page: u32,
    ) -> Result<Page<Rating>, ApiError> {
        let page = page.max(1);
        let request = ApiRequest::get("/ratings/")
            .query("product", id)
            .query("page", page)
            .query("page_size", REVIEW_PAGE_SIZE);

        let reviews: Page<Rating> = self.api().send(request).await?;
        Ok(reviews.with_page(page))
    }

    /// Create a product in the signed-in seller's store.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the product.
    #[instrument(skip(self, fields))]
    pub async fn create_product(&self, fields: Value) -> Result<Product, ApiError> {
        self.api()
            .send(ApiRequest::post("/products/").json(fields))
            .await
    }

    /// Update a product the signed-in seller owns.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the update.
    #[instrument(skip(self, changes), fields(product_id = %id))]
    pub async fn update_product(&self, id: ProductId, changes: Value) -> Result<Product, ApiError> {
        let product: Product = self
            .api()
            .send(ApiRequest::patch(format!("/products/{id}/")).json(changes))
            .await?;
        self.invalidate(CacheKey::Product(id)).await;
        Ok(product)
    }

    /// Delete a product the signed-in seller owns.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the deletion.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), ApiError> {
        self.api()
            .send_empty(ApiRequest::delete(format!("/products/{id}/")))
            .await?;
        self.invalidate(CacheKey::Product(id)).await;
        Ok(())
    }
}
