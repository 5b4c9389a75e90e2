//! Order actions from one side of the trade.
//!
//! An action is only sent when the viewer is offered it for the order's
//! current status. After the backend accepts it the order is fetched again,
//! so callers always hold the server's copy rather than a guessed status.

use covu_core::models::Order;
use covu_core::order::{OrderView, is_action_available};
use covu_core::validate::ValidationError;
use covu_core::{OrderAction, OrderStatus, Page, ViewerRole};
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::services::{CovuClient, OrderFilter};

impl CovuClient {
    /// Orders `role` is a party to, optionally in one status.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn orders_for(
        &self,
        role: ViewerRole,
        status: Option<OrderStatus>,
    ) -> Result<Page<Order>, ApiError> {
        self.list_orders(OrderFilter::for_role(role, status)).await
    }

    /// Request `action` on `order` as `role` and return the refetched order.
    ///
    /// `reason` is only sent with cancellations.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ActionUnavailable`] without a request if
    /// the action is not offered for the order's status, or an error if the
    /// backend rejects the transition or the refetch fails.
    #[instrument(skip(self, order, reason), fields(order_id = %order.id, status = %order.status))]
    pub async fn perform_order_action(
        &self,
        order: &Order,
        role: ViewerRole,
        action: OrderAction,
        reason: Option<&str>,
    ) -> Result<Order, ApiError> {
        if !is_action_available(order.status, role, action) {
            return Err(ValidationError::ActionUnavailable {
                action,
                status: order.status,
                role,
            }
            .into());
        }

        self.post_order_action(order.id, action, reason).await?;

        let fresh = self.get_order(order.id).await?;
        info!(
            action = %action,
            status = %fresh.status,
            hint = OrderView::new(&fresh, role).hint(),
            "Order updated"
        );
        Ok(fresh)
    }
}
