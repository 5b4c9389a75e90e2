//! Covu Client - REST client and persisted stores for the Covu marketplace.
//!
//! # Architecture
//!
//! - [`http::ApiClient`] sends requests with the stored bearer token and
//!   renews the session on a 401. Concurrent 401s share a single refresh
//!   call; requests that arrive while it is in flight wait for its outcome
//!   and are released in arrival order.
//! - [`tokens::TokenStore`] and [`cart::CartStore`] persist the session and
//!   the cart through a [`storage::Storage`] backend, so both survive a
//!   restart.
//! - [`services::CovuClient`] exposes one method per backend operation.
//!   [`checkout`] and [`orders`] add cart checkout, direct purchase, and
//!   role-checked order actions on top.
//!
//! # Example
//!
//! ```rust,ignore
//! use covu_client::{ClientConfig, CovuClient};
//!
//! let client = CovuClient::from_config(&ClientConfig::from_env()?)?;
//! let user = client.login(&email, &password).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod http;
pub mod orders;
pub mod services;
pub mod storage;
pub mod tokens;

pub use cart::CartStore;
pub use checkout::{CheckoutDetails, PurchasePreview};
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, RefreshFailure};
pub use http::{ApiClient, ApiRequest, SessionEvent};
pub use services::{
    BankDetails, BecomeSellerInput, CovuClient, CreateOrderRequest, DEFAULT_CANCEL_REASON,
    OrderFilter, ProductQuery, RatingTarget, RegisterInput, StoreQuery,
};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
pub use tokens::TokenStore;
