//! Order lifecycle actions from both sides of the trade.
//!
//! Run with: cargo test -p covu-integration-tests --test orders

#![allow(clippy::unwrap_used)]

use covu_client::{ApiError, DEFAULT_CANCEL_REASON};
use covu_core::validate::ValidationError;
use covu_core::{OrderAction, OrderId, OrderStatus, ViewerRole};
use covu_integration_tests::MockBackend;

#[tokio::test]
async fn test_seller_accepts_pending_order() {
    let backend = MockBackend::start().await;
    let client = backend.client();
    backend.sign_in(&client);
    backend.insert_order(7, "pending");

    let order = client.get_order(OrderId::new(7)).await.unwrap();
    let updated = client
        .perform_order_action(&order, ViewerRole::Seller, OrderAction::Accept, None)
        .await
        .unwrap();

    assert_eq!(updated.status, OrderStatus::Accepted);
    assert_eq!(backend.order_status(7).as_deref(), Some("accepted"));
    assert_eq!(backend.requests_to("POST", "/api/orders/7/accept/").len(), 1);
    // The order is read back after the action.
    assert_eq!(backend.requests_to("GET", "/api/orders/7/").len(), 2);
}

#[tokio::test]
async fn test_buyer_cancel_sends_default_reason() {
    let backend = MockBackend::start().await;
    let client = backend.client();
    backend.sign_in(&client);
    backend.insert_order(11, "pending");

    let order = client.get_order(OrderId::new(11)).await.unwrap();
    let cancelled = client
        .perform_order_action(&order, ViewerRole::Buyer, OrderAction::Cancel, Some("   "))
        .await
        .unwrap();

    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    let posted = backend.requests_to("POST", "/api/orders/11/cancel/");
    assert_eq!(
        posted[0].body.as_ref().unwrap()["reason"],
        DEFAULT_CANCEL_REASON
    );
}

#[tokio::test]
async fn test_buyer_confirms_delivered_order() {
    let backend = MockBackend::start().await;
    let client = backend.client();
    backend.sign_in(&client);
    backend.insert_order(12, "delivered");

    let order = client.get_order(OrderId::new(12)).await.unwrap();
    let confirmed = client
        .perform_order_action(&order, ViewerRole::Buyer, OrderAction::Confirm, None)
        .await
        .unwrap();

    assert_eq!(confirmed.status, OrderStatus::Confirmed);
    let posted = backend.requests_to("POST", "/api/orders/12/confirm/");
    assert_eq!(posted.len(), 1);
    assert!(posted[0].body.as_ref().is_none_or(|body| body.get("reason").is_none()));
}

#[tokio::test]
async fn test_unavailable_action_is_not_sent() {
    let backend = MockBackend::start().await;
    let client = backend.client();
    backend.sign_in(&client);
    backend.insert_order(13, "pending");

    let order = client.get_order(OrderId::new(13)).await.unwrap();
    // Only the seller can accept.
    let err = client
        .perform_order_action(&order, ViewerRole::Buyer, OrderAction::Accept, None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ApiError::Invalid(ValidationError::ActionUnavailable {
            action: OrderAction::Accept,
            status: OrderStatus::Pending,
            role: ViewerRole::Buyer,
        })
    ));
    assert!(
        backend
            .requests()
            .iter()
            .all(|request| request.method != "POST")
    );
    assert_eq!(backend.order_status(13).as_deref(), Some("pending"));
}

#[tokio::test]
async fn test_rejected_action_leaves_order_unchanged() {
    let backend = MockBackend::start().await;
    let client = backend.client();
    backend.sign_in(&client);
    backend.insert_order(16, "pending");
    backend.fail_order_actions(true);

    let order = client.get_order(OrderId::new(16)).await.unwrap();
    let err = client
        .perform_order_action(&order, ViewerRole::Seller, OrderAction::Accept, None)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Client { .. }));
    assert_eq!(err.user_message(), "Order already accepted");
    assert_eq!(backend.requests_to("POST", "/api/orders/16/accept/").len(), 1);
    // No refetch after a failed action.
    assert_eq!(backend.requests_to("GET", "/api/orders/16/").len(), 1);
    assert_eq!(backend.order_status(16).as_deref(), Some("pending"));
    assert_eq!(order.status, OrderStatus::Pending);
}

#[tokio::test]
async fn test_finished_order_offers_nothing() {
    let backend = MockBackend::start().await;
    let client = backend.client();
    backend.sign_in(&client);
    backend.insert_order(14, "confirmed");

    let order = client.get_order(OrderId::new(14)).await.unwrap();
    for role in [ViewerRole::Buyer, ViewerRole::Seller] {
        for action in [
            OrderAction::Accept,
            OrderAction::Deliver,
            OrderAction::Confirm,
            OrderAction::Cancel,
        ] {
            let result = client
                .perform_order_action(&order, role, action, None)
                .await;
            assert!(result.is_err());
        }
    }
    assert_eq!(backend.requests_to("GET", "/api/orders/14/").len(), 1);
}

#[tokio::test]
async fn test_seller_listing_sends_role_and_status() {
    let backend = MockBackend::start().await;
    let client = backend.client();
    backend.sign_in(&client);
    backend.insert_order(15, "pending");

    let sales = client
        .orders_for(ViewerRole::Seller, Some(OrderStatus::Pending))
        .await
        .unwrap();
    client.orders_for(ViewerRole::Buyer, None).await.unwrap();

    assert_eq!(sales.items.len(), 1);
    assert_eq!(sales.items[0].id, OrderId::new(15));

    let requests = backend.requests_to("GET", "/api/orders/");
    let seller_query = requests[0].query.as_deref().unwrap();
    assert!(seller_query.contains("as_seller=true"));
    assert!(seller_query.contains("status=pending"));
    let buyer_query = requests[1].query.as_deref().unwrap_or_default();
    assert!(!buyer_query.contains("as_seller"));
    assert!(!buyer_query.contains("status"));
}
