//! Cart commands.
//!
//! The cart lives in local storage; only `add` talks to the API, to look up
//! the product being added.

use clap::Subcommand;
use covu_client::CartStore;
use covu_core::ProductId;

use super::{CliError, Context, naira};

#[derive(Subcommand)]
pub enum CartAction {
    /// Show the cart
    Show,
    /// Add a product
    Add {
        id: ProductId,

        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set a product's quantity (0 removes it)
    Set {
        id: ProductId,

        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a product
    Remove { id: ProductId },
    /// Empty the cart
    Clear,
}

pub async fn run(ctx: &Context, action: CartAction) -> Result<(), CliError> {
    let mut cart = ctx.cart()?;
    match action {
        CartAction::Show => {}
        CartAction::Add { id, quantity } => {
            let product = ctx.client.get_product(id).await?;
            if !product.has_stock_for(quantity) {
                return Err(CliError::Refused(format!(
                    "Only {} of {} left in stock.",
                    product.stock.unwrap_or_default(),
                    product.name
                )));
            }
            cart.add_item(&product, quantity)?;
            println!("Added {quantity} x {} to your cart.", product.name);
        }
        CartAction::Set { id, quantity } => {
            if !cart.update_quantity(id, quantity)? {
                return Err(not_in_cart(id));
            }
        }
        CartAction::Remove { id } => {
            if !cart.remove_item(id)? {
                return Err(not_in_cart(id));
            }
        }
        CartAction::Clear => cart.clear()?,
    }

    print_cart(&cart);
    Ok(())
}

fn not_in_cart(id: ProductId) -> CliError {
    CliError::Refused(format!("Product #{id} is not in your cart."))
}

pub fn print_cart(cart: &CartStore) {
    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }

    for item in cart.items() {
        println!(
            "{:<7} {:<40} {:>4} x {:>12} = {:>14}",
            format!("#{}", item.product_id),
            item.name,
            item.quantity,
            naira(item.price),
            naira(item.subtotal())
        );
    }
    println!("{} items, total {}", cart.count(), naira(cart.total()));
}
