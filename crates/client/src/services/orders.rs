//! Order endpoints.
//!
//! These are the raw calls. Role checks and the refetch after an action
//! live in [`crate::orders`]; cart checkout and direct purchase live in
//! [`crate::checkout`].

use covu_core::cart::CheckoutLine;
use covu_core::models::Order;
use covu_core::{OrderAction, OrderId, OrderStatus, Page, PaymentMethod, ProductId, ViewerRole};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, instrument};

use super::CovuClient;
use crate::error::ApiError;
use crate::http::ApiRequest;

/// Reason sent when a cancellation gives none.
pub const DEFAULT_CANCEL_REASON: &str = "Cancelled by user";

/// Which orders to list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderFilter {
    /// Only orders in this status.
    pub status: Option<OrderStatus>,
    /// List orders received by the seller's store instead of purchases.
    pub as_seller: bool,
}

impl OrderFilter {
    /// Purchases, optionally in one status.
    #[must_use]
    pub const fn purchases(status: Option<OrderStatus>) -> Self {
        Self {
            status,
            as_seller: false,
        }
    }

    /// Sales, optionally in one status.
    #[must_use]
    pub const fn sales(status: Option<OrderStatus>) -> Self {
        Self {
            status,
            as_seller: true,
        }
    }

    /// Orders `role` is a party to.
    #[must_use]
    pub const fn for_role(role: ViewerRole, status: Option<OrderStatus>) -> Self {
        match role {
            ViewerRole::Buyer => Self::purchases(status),
            ViewerRole::Seller => Self::sales(status),
        }
    }

    /// The side of the listed orders the viewer is on.
    #[must_use]
    pub const fn role(&self) -> ViewerRole {
        if self.as_seller {
            ViewerRole::Seller
        } else {
            ViewerRole::Buyer
        }
    }
}

/// Body of `POST /orders/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CreateOrderRequest {
    /// Every line of the cart, paid as one checkout.
    Cart {
        items: Vec<CheckoutLine>,
        delivery_address: String,
        phone: String,
        notes: String,
        payment_method: PaymentMethod,
        total_amount: Decimal,
    },
    /// One product bought from its page, paid from the wallet.
    Direct {
        product_id: ProductId,
        delivery_message: String,
        quantity: u32,
    },
}

/// The order endpoint answers a checkout with one order, a list, or a
/// list wrapped under `orders`.
#[derive(Deserialize)]
#[serde(untagged)]
enum CreatedOrders {
    Many(Vec<Order>),
    Wrapped { orders: Vec<Order> },
    One(Box<Order>),
}

impl From<CreatedOrders> for Vec<Order> {
    fn from(created: CreatedOrders) -> Self {
        match created {
            CreatedOrders::Many(orders) | CreatedOrders::Wrapped { orders } => orders,
            CreatedOrders::One(order) => vec![*order],
        }
    }
}

impl CovuClient {
    /// List purchases or sales.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_orders(&self, filter: OrderFilter) -> Result<Page<Order>, ApiError> {
        let mut request =
            ApiRequest::get("/orders/").query_opt("status", filter.status.map(OrderStatus::as_str));
        if filter.as_seller {
            request = request.query("as_seller", "true");
        }
        self.api().send(request).await
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is not visible to the user or the
    /// request fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn get_order(&self, id: OrderId) -> Result<Order, ApiError> {
        self.api()
            .send(ApiRequest::get(format!("/orders/{id}/")))
            .await
    }

    /// Place an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the order.
    #[instrument(skip(self, request))]
    pub async fn create_order(&self, request: &CreateOrderRequest) -> Result<Vec<Order>, ApiError> {
        let body = serde_json::to_value(request)?;
        let created: CreatedOrders = self
            .api()
            .send(ApiRequest::post("/orders/").json(body))
            .await?;

        let orders = Vec::from(created);
        info!(count = orders.len(), "Order placed");
        Ok(orders)
    }

    /// Seller accepts a pending order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the transition.
    pub async fn accept_order(&self, id: OrderId) -> Result<(), ApiError> {
        self.post_order_action(id, OrderAction::Accept, None).await
    }

    /// Seller marks an accepted order as delivered.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the transition.
    pub async fn deliver_order(&self, id: OrderId) -> Result<(), ApiError> {
        self.post_order_action(id, OrderAction::Deliver, None).await
    }

    /// Buyer confirms receipt, releasing escrow to the seller.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the transition.
    pub async fn confirm_order(&self, id: OrderId) -> Result<(), ApiError> {
        self.post_order_action(id, OrderAction::Confirm, None).await
    }

    /// Cancel an order, with [`DEFAULT_CANCEL_REASON`] when `reason` is blank.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the transition.
    pub async fn cancel_order(&self, id: OrderId, reason: Option<&str>) -> Result<(), ApiError> {
        self.post_order_action(id, OrderAction::Cancel, reason).await
    }

    /// `POST /orders/{id}/{action}/`.
    #[instrument(skip(self, reason), fields(order_id = %id, action = %action))]
    pub(crate) async fn post_order_action(
        &self,
        id: OrderId,
        action: OrderAction,
        reason: Option<&str>,
    ) -> Result<(), ApiError> {
        let mut request =
            ApiRequest::post(format!("/orders/{id}/{}/", action.endpoint_segment()));
        if action == OrderAction::Cancel {
            request = request.json(json!({ "reason": cancel_reason(reason) }));
        }

        self.api().send_empty(request).await?;
        info!(target_status = %action.target_status(), "Order action accepted by backend");
        Ok(())
    }
}

fn cancel_reason(reason: Option<&str>) -> &str {
    reason
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or(DEFAULT_CANCEL_REASON)
}
