//! Placing orders.
//!
//! # Usage
//!
//! ```bash
//! covu checkout --address "12 Allen Avenue, Ikeja" --phone 08031234567
//! covu buy 42 --quantity 2 --message "Gate 3, Unilag Akoka. Call on arrival."
//! covu buy 42 --preview
//! ```

use clap::Args;
use covu_client::{ApiError, CheckoutDetails, PurchasePreview};
use covu_core::validate::ValidationError;
use covu_core::{PaymentMethod, PhoneNumber, ProductId};

use super::auth::not_signed_in;
use super::cart::print_cart;
use super::{CliError, Context, naira};

#[derive(Args)]
pub struct CheckoutArgs {
    /// Where the order should be delivered
    #[arg(short, long)]
    address: String,

    /// Phone number for the delivery
    #[arg(short, long)]
    phone: PhoneNumber,

    /// Notes for the seller
    #[arg(short, long)]
    notes: Option<String>,

    /// `wallet` or `card`
    #[arg(long, default_value = "wallet")]
    payment: PaymentMethod,
}

#[derive(Args)]
pub struct BuyArgs {
    id: ProductId,

    #[arg(short, long, default_value_t = 1)]
    quantity: u32,

    /// Delivery details for the seller (at least 10 characters)
    #[arg(short, long, required_unless_present = "preview")]
    message: Option<String>,

    /// Only show what the purchase would cost
    #[arg(long)]
    preview: bool,
}

pub async fn checkout(ctx: &Context, args: CheckoutArgs) -> Result<(), CliError> {
    if !ctx.client.is_authenticated()? {
        return Err(not_signed_in());
    }

    let mut cart = ctx.cart()?;
    print_cart(&cart);

    let details = CheckoutDetails {
        delivery_address: args.address,
        phone: args.phone,
        notes: args.notes,
        payment_method: args.payment,
    };
    let orders = ctx.client.checkout(&mut cart, &details).await?;

    println!();
    for order in &orders {
        println!(
            "Order {} placed: {} ({})",
            order.reference(),
            naira(order.total_amount),
            order.status
        );
    }
    println!("Follow your orders with `covu orders list`.");
    Ok(())
}

pub async fn buy(ctx: &Context, args: BuyArgs) -> Result<(), CliError> {
    if !ctx.client.is_authenticated()? {
        return Err(not_signed_in());
    }

    let preview = ctx.client.preview_purchase(args.id, args.quantity).await?;
    print_preview(&preview);

    let Some(message) = args.message.filter(|_| !args.preview) else {
        return Ok(());
    };

    match ctx.client.purchase(args.id, args.quantity, &message).await {
        Ok(order) => {
            println!();
            println!(
                "Order {} placed. {} is held in escrow until you confirm delivery.",
                order.reference(),
                naira(order.total_amount)
            );
            Ok(())
        }
        Err(ApiError::Invalid(ValidationError::InsufficientBalance { needed, available })) => {
            Err(CliError::Refused(format!(
                "Insufficient balance: {} needed, {} available. Top up with `covu wallet fund {}`.",
                naira(needed),
                naira(available),
                (needed - available).ceil()
            )))
        }
        Err(e) => Err(e.into()),
    }
}

fn print_preview(preview: &PurchasePreview) {
    let quote = &preview.quote;
    println!("{} x {}", preview.quantity, preview.product.name);
    println!("  Subtotal:     {:>14}", naira(quote.subtotal));
    println!("  Delivery:     {:>14}", naira(quote.delivery_fee));
    println!("  Total:        {:>14}", naira(quote.total));
    println!("  Your balance: {:>14}", naira(preview.balance));
    if !preview.is_affordable() {
        println!("  Short by:     {:>14}", naira(preview.shortfall()));
    }
}
