//! Covu CLI - Browse, buy, and sell on the Covu marketplace from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (the session is kept under COVU_DATA_DIR)
//! covu auth login -e ada@example.com
//!
//! # Browse and fill the cart
//! covu products list --category wigs
//! covu cart add 42 --quantity 2
//!
//! # Check out, then follow the order
//! covu checkout --address "12 Allen Avenue, Ikeja" --phone 08031234567
//! covu orders list
//!
//! # Sellers act on incoming orders
//! covu orders act 17 accept --as-seller
//! ```
//!
//! # Commands
//!
//! - `auth` - Sign in, register, profile, seller upgrade
//! - `stores` / `products` - Browse and rate the catalog
//! - `cart` - Manage the persisted cart
//! - `checkout` / `buy` - Place orders
//! - `orders` - List orders and request status changes
//! - `wallet` - Balance, top-ups, transactions, withdrawals
//! - `ratings` - Rating summaries
//!
//! # Environment Variables
//!
//! - `COVU_API_URL` - API base URL
//! - `COVU_DATA_DIR` - Where the session and cart are stored
//! - `RUST_LOG` - Log filter (default `covu=info`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use covu_client::{ClientConfig, CovuClient, SessionEvent};
use tokio::sync::broadcast::error::TryRecvError;
use tracing_subscriber::EnvFilter;

// Command output goes to stdout; logs go to stderr.
#[allow(clippy::print_stdout)]
mod commands;

use commands::{
    AuthAction, CartAction, CliError, Context, OrdersAction, ProductsAction, RatingsAction,
    StoresAction, WalletAction,
};

#[derive(Parser)]
#[command(name = "covu")]
#[command(author, version, about = "Covu marketplace CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in, register, and manage the account
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
    /// Browse and rate stores
    Stores {
        #[command(subcommand)]
        action: StoresAction,
    },
    /// Browse and rate products
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Order everything in the cart
    Checkout(commands::checkout::CheckoutArgs),
    /// Buy one product from the wallet
    Buy(commands::checkout::BuyArgs),
    /// List orders and act on them
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
    /// Wallet balance, top-ups, and withdrawals
    Wallet {
        #[command(subcommand)]
        action: WalletAction,
    },
    /// Rating summaries
    Ratings {
        #[command(subcommand)]
        action: RatingsAction,
    },
    /// List product categories
    Categories,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("covu=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = ClientConfig::from_env()?;
    let client = CovuClient::from_config(&config)?;
    let mut events = client.api().subscribe();
    let ctx = Context::new(client);

    let result = dispatch(&ctx, cli.command).await;

    // The session may have ended during the command even if it succeeded.
    loop {
        match events.try_recv() {
            Ok(SessionEvent::Expired) => {
                tracing::warn!("Your session has expired. Run `covu auth login` to sign in again.");
            }
            Ok(_) | Err(TryRecvError::Lagged(_)) => {}
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }

    result
}

async fn dispatch(ctx: &Context, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Auth { action } => commands::auth::run(ctx, action).await,
        Commands::Stores { action } => commands::stores::run(ctx, action).await,
        Commands::Products { action } => commands::products::run(ctx, action).await,
        Commands::Cart { action } => commands::cart::run(ctx, action).await,
        Commands::Checkout(args) => commands::checkout::checkout(ctx, args).await,
        Commands::Buy(args) => commands::checkout::buy(ctx, args).await,
        Commands::Orders { action } => commands::orders::run(ctx, action).await,
        Commands::Wallet { action } => commands::wallet::run(ctx, action).await,
        Commands::Ratings { action } => commands::ratings::run(ctx, action).await,
        Commands::Categories => {
            commands::products::categories();
            Ok(())
        }
    }
}
