//! Typed access to the Covu REST endpoints.
//!
//! [`CovuClient`] wraps an [`ApiClient`] and exposes one method per backend
//! operation, grouped by resource in the submodules. Product and store
//! detail lookups are cached in memory via `moka` (5 minute TTL) and
//! invalidated when the client itself changes them.
//!
//! # Example
//!
//! ```rust,ignore
//! use covu_client::{ClientConfig, CovuClient};
//!
//! let client = CovuClient::from_config(&ClientConfig::from_env()?)?;
//!
//! let page = client.list_products(&ProductQuery::default()).await?;
//! let product = client.get_product(page.items[0].id).await?;
//! ```

mod auth;
mod cache;
mod orders;
mod products;
mod ratings;
mod stores;
mod wallet;

pub use auth::{BecomeSellerInput, RegisterInput};
pub use orders::{CreateOrderRequest, DEFAULT_CANCEL_REASON, OrderFilter};
pub use products::ProductQuery;
pub use ratings::RatingTarget;
pub use stores::StoreQuery;
pub use wallet::BankDetails;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::ApiClient;
use crate::storage::{FileStorage, Storage};
use crate::tokens::TokenStore;

use cache::{CacheKey, CacheValue};

// =============================================================================
// CovuClient
// =============================================================================

/// Client for the Covu marketplace API.
#[derive(Clone)]
pub struct CovuClient {
    inner: Arc<CovuClientInner>,
}

struct CovuClientInner {
    api: ApiClient,
    storage: Arc<dyn Storage>,
    page_size: u32,
    cache: Cache<CacheKey, CacheValue>,
}

impl std::fmt::Debug for CovuClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CovuClient")
            .field("api", &self.inner.api)
            .field("page_size", &self.inner.page_size)
            .finish_non_exhaustive()
    }
}

impl CovuClient {
    /// Create a client persisting its session under `config.data_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        Self::with_storage(config, Arc::new(FileStorage::in_dir(&config.data_dir)))
    }

    /// Create a client over an explicit storage backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_storage(
        config: &ClientConfig,
        storage: Arc<dyn Storage>,
    ) -> Result<Self, ApiError> {
        let api = ApiClient::new(config, TokenStore::new(Arc::clone(&storage)))?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(CovuClientInner {
                api,
                storage,
                page_size: config.page_size,
                cache,
            }),
        })
    }

    /// The underlying transport.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// The persisted session.
    #[must_use]
    pub fn tokens(&self) -> &TokenStore {
        self.inner.api.tokens()
    }

    /// The storage backend shared by the session and the cart.
    #[must_use]
    pub fn storage(&self) -> Arc<dyn Storage> {
        Arc::clone(&self.inner.storage)
    }

    /// Page size sent with list requests.
    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.inner.page_size
    }

    /// Drop every cached catalog entry.
    pub fn clear_cache(&self) {
        self.inner.cache.invalidate_all();
    }

    async fn invalidate(&self, key: CacheKey) {
        self.inner.cache.invalidate(&key).await;
    }
}
