//! Ratings and reviews.

use covu_core::models::{Rating, RatingStats};
use covu_core::{Page, ProductId, StoreId};
use tracing::instrument;

use super::CovuClient;
use crate::error::ApiError;
use crate::http::ApiRequest;

/// What a rating list is filtered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingTarget {
    Store(StoreId),
    Product(ProductId),
}

impl RatingTarget {
    fn query(self, request: ApiRequest) -> ApiRequest {
        match self {
            Self::Store(id) => request.query("store", id),
            Self::Product(id) => request.query("product", id),
        }
    }
}

impl CovuClient {
    /// List ratings, optionally for one store or product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_ratings(
        &self,
        target: Option<RatingTarget>,
        page: u32,
    ) -> Result<Page<Rating>, ApiError> {
        let page = page.max(1);
        let mut request = ApiRequest::get("/ratings/")
            .query("page", page)
            .query("page_size", self.page_size());
        if let Some(target) = target {
            request = target.query(request);
        }

        let ratings: Page<Rating> = self.api().send(request).await?;
        Ok(ratings.with_page(page))
    }

    /// Rating summary for a store.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(store_id = %id))]
    pub async fn get_store_rating_stats(&self, id: StoreId) -> Result<RatingStats, ApiError> {
        self.api()
            .send(ApiRequest::get(format!("/ratings/store/{id}/stats/")))
            .await
    }

    /// Ratings the signed-in user has left.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn my_ratings(&self) -> Result<Page<Rating>, ApiError> {
        self.api()
            .send(ApiRequest::get("/ratings/my-ratings/"))
            .await
    }
}
