//! Covu Core - Domain types for the Covu marketplace client.
//!
//! This crate provides the types and pure state transitions shared by the
//! rest of the workspace:
//! - `client` - HTTP client, persisted stores, and REST services
//! - `cli` - Command-line storefront built on the client
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! storage access, no HTTP clients. Every transition here (cart edits,
//! order action availability, delivery quotes) can be tested without a
//! backend.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, statuses, emails, phone numbers, categories
//! - [`models`] - API resources (users, stores, products, orders, wallet)
//! - [`page`] - Canonical list result normalizing paginated and bare-array responses
//! - [`cart`] - Shopping cart and its pure transitions
//! - [`order`] - Order action availability per viewer role
//! - [`delivery`] - Delivery fee and direct purchase quotes
//! - [`validate`] - Input validation for forms submitted to the API

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod delivery;
pub mod models;
pub mod order;
pub mod page;
pub mod types;
pub mod validate;

pub use cart::{Cart, CartItem};
pub use page::Page;
pub use types::*;
