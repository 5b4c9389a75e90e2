//! Order commands.
//!
//! Buyers see their purchases; `--as-seller` switches to the orders
//! received by the seller's store. Actions are only sent when they are
//! offered for the order's status from that side.
//!
//! # Usage
//!
//! ```bash
//! covu orders list --status pending
//! covu orders show 17 --as-seller
//! covu orders act 17 accept --as-seller
//! covu orders act 17 cancel --reason "Ordered the wrong size"
//! ```

use clap::Subcommand;
use covu_core::models::Order;
use covu_core::order::OrderView;
use covu_core::{OrderAction, OrderId, OrderStatus, ViewerRole};

use super::{CliError, Context, naira, print_page_footer};

#[derive(Subcommand)]
pub enum OrdersAction {
    /// List orders
    List {
        /// `pending`, `accepted`, `delivered`, `confirmed` or `cancelled`
        #[arg(short, long)]
        status: Option<OrderStatus>,

        /// Orders received by your store
        #[arg(long)]
        as_seller: bool,
    },
    /// Show one order and what you can do with it
    Show {
        id: OrderId,

        #[arg(long)]
        as_seller: bool,
    },
    /// Accept, deliver, confirm, or cancel an order
    Act {
        id: OrderId,

        /// `accept`, `deliver`, `confirm` or `cancel`
        action: OrderAction,

        #[arg(long)]
        as_seller: bool,

        /// Why the order is cancelled
        #[arg(short, long)]
        reason: Option<String>,
    },
}

const fn role(as_seller: bool) -> ViewerRole {
    if as_seller {
        ViewerRole::Seller
    } else {
        ViewerRole::Buyer
    }
}

pub async fn run(ctx: &Context, action: OrdersAction) -> Result<(), CliError> {
    let client = &ctx.client;
    match action {
        OrdersAction::List { status, as_seller } => {
            let role = role(as_seller);
            let orders = client.orders_for(role, status).await?;
            for order in &orders.items {
                print_order_line(&OrderView::new(order, role));
            }
            print_page_footer(&orders);
        }
        OrdersAction::Show { id, as_seller } => {
            let order = client.get_order(id).await?;
            print_order(&OrderView::new(&order, role(as_seller)));
        }
        OrdersAction::Act {
            id,
            action,
            as_seller,
            reason,
        } => {
            let role = role(as_seller);
            let order = client.get_order(id).await?;

            let view = OrderView::new(&order, role);
            if !view.offers(action) {
                return Err(CliError::Refused(refusal(&view, action)));
            }

            let updated = client
                .perform_order_action(&order, role, action, reason.as_deref())
                .await?;
            println!("{} done.", action.label());
            print_order(&OrderView::new(&updated, role));
        }
    }
    Ok(())
}

fn refusal(view: &OrderView<'_>, action: OrderAction) -> String {
    let offered: Vec<&str> = view.actions().iter().map(|a| a.endpoint_segment()).collect();
    let options = if offered.is_empty() {
        "nothing can be done with it now".to_owned()
    } else {
        format!("you can: {}", offered.join(", "))
    };
    format!(
        "Cannot {action} order {} as the {}: it is {} and {options}.",
        view.order.reference(),
        view.role,
        view.order.status
    )
}

fn print_order_line(view: &OrderView<'_>) {
    let order = view.order;
    println!(
        "{:<14} {:<32} {:>14}  {:<10} {}",
        order.reference(),
        order.product_label(),
        naira(order.total_amount),
        order.status,
        view.hint()
    );
}

fn print_order(view: &OrderView<'_>) {
    let order: &Order = view.order;
    println!("Order {} - {}", order.reference(), order.status);
    println!("  {}", view.hint());
    println!("  Product:  {}", order.product_label());
    if let Some(quantity) = order.quantity {
        println!("  Quantity: {quantity}");
    }
    println!("  Store:    {}", order.store_label());
    if let Some(fee) = order.delivery_fee {
        println!("  Delivery: {}", naira(fee));
    }
    println!("  Total:    {}", naira(order.total_amount));
    if let Some(escrow) = &order.escrow_status {
        println!("  Escrow:   {escrow}");
    }
    if let Some(message) = &order.delivery_message {
        println!("  Deliver:  {message}");
    }
    if let Some(created) = order.created_at {
        println!("  Placed:   {}", created.format("%d %b %Y %H:%M"));
    }

    let actions = view.actions();
    if !actions.is_empty() {
        let flag = if view.role == ViewerRole::Seller {
            " --as-seller"
        } else {
            ""
        };
        let labels: Vec<String> = actions
            .iter()
            .map(|a| format!("{} (`covu orders act {} {a}{flag}`)", a.label(), order.id))
            .collect();
        println!("  Next:     {}", labels.join(", "));
    }
}
