//! Order action availability.
//!
//! The backend enforces the order state machine. The client only decides
//! which transitions to *offer*, based on the order's status and whether
//! the viewer is its buyer or its seller:
//!
//! | status    | buyer   | seller          |
//! |-----------|---------|-----------------|
//! | pending   | cancel  | accept, cancel  |
//! | accepted  |         | deliver, cancel |
//! | delivered | confirm |                 |
//!
//! Nothing is offered for `confirmed`, `cancelled`, or unknown statuses.

use crate::models::Order;
use crate::types::{OrderAction, OrderStatus, ViewerRole};

/// Actions offered to `role` for an order in `status`, in display order.
#[must_use]
pub const fn available_actions(status: OrderStatus, role: ViewerRole) -> &'static [OrderAction] {
    match (role, status) {
        (ViewerRole::Buyer, OrderStatus::Pending) => &[OrderAction::Cancel],
        (ViewerRole::Buyer, OrderStatus::Delivered) => &[OrderAction::Confirm],
        (ViewerRole::Seller, OrderStatus::Pending) => &[OrderAction::Accept, OrderAction::Cancel],
        (ViewerRole::Seller, OrderStatus::Accepted) => {
            &[OrderAction::Deliver, OrderAction::Cancel]
        }
        _ => &[],
    }
}

/// Whether `action` is offered to `role` for an order in `status`.
#[must_use]
pub fn is_action_available(status: OrderStatus, role: ViewerRole, action: OrderAction) -> bool {
    available_actions(status, role).contains(&action)
}

/// One-line explanation of where the order stands, from the viewer's side.
#[must_use]
pub const fn status_hint(status: OrderStatus, role: ViewerRole) -> &'static str {
    match (role, status) {
        (ViewerRole::Buyer, OrderStatus::Pending) => "Waiting for seller to accept",
        (ViewerRole::Buyer, OrderStatus::Accepted) => "Seller is preparing your order",
        (ViewerRole::Buyer, OrderStatus::Delivered) => "Order delivered - confirm receipt",
        (ViewerRole::Buyer, OrderStatus::Confirmed) => "Order completed",
        (ViewerRole::Seller, OrderStatus::Pending) => "New order - accept or cancel",
        (ViewerRole::Seller, OrderStatus::Accepted) => "Preparing for delivery",
        (ViewerRole::Seller, OrderStatus::Delivered) => "Waiting for buyer confirmation",
        (ViewerRole::Seller, OrderStatus::Confirmed) => "Payment released",
        (_, OrderStatus::Cancelled) => "Order cancelled",
        (_, OrderStatus::Unknown) => "Unknown status",
    }
}

/// An order as seen by one side of the trade.
#[derive(Debug, Clone, Copy)]
pub struct OrderView<'a> {
    pub order: &'a Order,
    pub role: ViewerRole,
}

impl<'a> OrderView<'a> {
    #[must_use]
    pub const fn new(order: &'a Order, role: ViewerRole) -> Self {
        Self { order, role }
    }

    /// Actions to offer for this order.
    #[must_use]
    pub const fn actions(&self) -> &'static [OrderAction] {
        available_actions(self.order.status, self.role)
    }

    /// Whether `action` should be offered.
    #[must_use]
    pub fn offers(&self, action: OrderAction) -> bool {
        is_action_available(self.order.status, self.role, action)
    }

    /// Status explanation for this viewer.
    #[must_use]
    pub const fn hint(&self) -> &'static str {
        status_hint(self.order.status, self.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use OrderAction::{Accept, Cancel, Confirm, Deliver};
    use ViewerRole::{Buyer, Seller};

    #[test]
    fn test_pending_order() {
        assert_eq!(available_actions(OrderStatus::Pending, Buyer), &[Cancel]);
        assert_eq!(
            available_actions(OrderStatus::Pending, Seller),
            &[Accept, Cancel]
        );
    }

    #[test]
    fn test_accepted_order() {
        assert!(available_actions(OrderStatus::Accepted, Buyer).is_empty());
        assert_eq!(
            available_actions(OrderStatus::Accepted, Seller),
            &[Deliver, Cancel]
        );
    }

    #[test]
    fn test_delivered_order() {
        assert_eq!(available_actions(OrderStatus::Delivered, Buyer), &[Confirm]);
        assert!(available_actions(OrderStatus::Delivered, Seller).is_empty());
    }

    #[test]
    fn test_terminal_and_unknown_orders_offer_nothing() {
        for status in [
            OrderStatus::Confirmed,
            OrderStatus::Cancelled,
            OrderStatus::Unknown,
        ] {
            assert!(available_actions(status, Buyer).is_empty());
            assert!(available_actions(status, Seller).is_empty());
        }
    }

    #[test]
    fn test_no_action_outside_the_table() {
        let offered = [
            (OrderStatus::Pending, Buyer, Cancel),
            (OrderStatus::Delivered, Buyer, Confirm),
            (OrderStatus::Pending, Seller, Accept),
            (OrderStatus::Pending, Seller, Cancel),
            (OrderStatus::Accepted, Seller, Deliver),
            (OrderStatus::Accepted, Seller, Cancel),
        ];

        for status in OrderStatus::FILTERS {
            for role in [Buyer, Seller] {
                for action in [Accept, Deliver, Confirm, Cancel] {
                    assert_eq!(
                        is_action_available(status, role, action),
                        offered.contains(&(status, role, action)),
                        "{status} / {role} / {action}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_hints() {
        assert_eq!(
            status_hint(OrderStatus::Pending, Buyer),
            "Waiting for seller to accept"
        );
        assert_eq!(
            status_hint(OrderStatus::Pending, Seller),
            "New order - accept or cancel"
        );
        assert_eq!(status_hint(OrderStatus::Cancelled, Seller), "Order cancelled");
    }
}
