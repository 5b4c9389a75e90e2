//! Subcommand implementations.

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod orders;
pub mod products;
pub mod ratings;
pub mod stores;
pub mod wallet;

pub use auth::AuthAction;
pub use cart::CartAction;
pub use orders::OrdersAction;
pub use products::ProductsAction;
pub use ratings::RatingsAction;
pub use stores::StoresAction;
pub use wallet::WalletAction;

use covu_client::{ApiError, CartStore, ConfigError, CovuClient, StorageError};
use covu_core::models::{Product, Store};
use covu_core::{Page, Price, humanize_category};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that end a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{}", .0.user_message())]
    Api(#[from] ApiError),

    #[error("Local storage error: {0}")]
    Storage(#[from] StorageError),

    /// The command cannot be carried out as asked.
    #[error("{0}")]
    Refused(String),
}

/// Shared state for one command invocation.
pub struct Context {
    pub client: CovuClient,
}

impl Context {
    pub const fn new(client: CovuClient) -> Self {
        Self { client }
    }

    /// The persisted cart.
    pub fn cart(&self) -> Result<CartStore, StorageError> {
        CartStore::load(self.client.storage())
    }
}

// =============================================================================
// Output helpers
// =============================================================================

pub fn naira(amount: Decimal) -> String {
    Price::ngn(amount).display()
}

pub fn print_page_footer<T>(page: &Page<T>) {
    if page.items.is_empty() {
        println!("Nothing found.");
        return;
    }
    match page.next_page() {
        Some(next) => println!(
            "Page {} ({} of {} shown). Next: --page {next}",
            page.page,
            page.items.len(),
            page.count
        ),
        None => println!("Page {} ({} total)", page.page, page.count),
    }
}

pub fn print_product_line(product: &Product) {
    println!(
        "{:<7} {:<40} {:>14}  {}",
        format!("#{}", product.id),
        product.name,
        naira(product.price),
        product.store_label().unwrap_or("-")
    );
}

pub fn print_store_line(store: &Store) {
    let category = store
        .category
        .as_deref()
        .map_or_else(|| "-".to_owned(), humanize_category);
    let rating = store
        .average_rating
        .map_or_else(|| "-".to_owned(), |r| format!("{r:.1}"));
    println!(
        "{:<7} {:<32} {:<20} {:<16} {rating}",
        format!("#{}", store.id),
        store.name,
        category,
        store.city.as_deref().unwrap_or("-")
    );
}
