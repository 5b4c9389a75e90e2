//! Cart checkout and direct purchase.
//!
//! Run with: cargo test -p covu-integration-tests --test cart_checkout

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use covu_client::{ApiError, CartStore, CheckoutDetails, MemoryStorage, Storage};
use covu_core::validate::ValidationError;
use covu_core::{PaymentMethod, PhoneNumber, ProductId};
use covu_integration_tests::{LOCAL_PRODUCT, MockBackend, REMOTE_PRODUCT};
use rust_decimal::Decimal;

fn details() -> CheckoutDetails {
    CheckoutDetails {
        delivery_address: "12 Allen Avenue, Ikeja".to_owned(),
        phone: PhoneNumber::parse("+2348031234567").unwrap(),
        notes: None,
        payment_method: PaymentMethod::Wallet,
    }
}

async fn filled_cart(backend: &MockBackend, storage: &Arc<dyn Storage>) -> CartStore {
    let client = backend.client_with_storage(Arc::clone(storage));
    let mut cart = CartStore::load(Arc::clone(storage)).unwrap();
    let gown = client.get_product(ProductId::new(LOCAL_PRODUCT)).await.unwrap();
    let scarf = client.get_product(ProductId::new(REMOTE_PRODUCT)).await.unwrap();
    cart.add_item(&gown, 1).unwrap();
    cart.add_item(&scarf, 2).unwrap();
    cart
}

#[tokio::test]
async fn test_checkout_clears_cart_after_order_is_created() {
    let backend = MockBackend::start().await;
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let client = backend.client_with_storage(Arc::clone(&storage));
    backend.sign_in(&client);
    let mut cart = filled_cart(&backend, &storage).await;

    let orders = client.checkout(&mut cart, &details()).await.unwrap();

    assert_eq!(orders.len(), 1);
    assert!(cart.is_empty());
    assert!(CartStore::load(Arc::clone(&storage)).unwrap().is_empty());

    let posted = backend.requests_to("POST", "/api/orders/");
    let body = posted[0].body.as_ref().unwrap();
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["items"][1]["quantity"], 2);
    assert_eq!(body["total_amount"], "17000.00");
    assert_eq!(body["phone"], "08031234567");
    assert_eq!(body["payment_method"], "wallet");
}

#[tokio::test]
async fn test_failed_checkout_keeps_cart() {
    let backend = MockBackend::start().await;
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let client = backend.client_with_storage(Arc::clone(&storage));
    backend.sign_in(&client);
    backend.fail_orders(true);
    let mut cart = filled_cart(&backend, &storage).await;

    let err = client.checkout(&mut cart, &details()).await.unwrap_err();

    assert!(matches!(err, ApiError::Client { .. }));
    assert_eq!(err.user_message(), "Insufficient stock");
    assert_eq!(cart.count(), 3);
    assert_eq!(CartStore::load(storage).unwrap().count(), 3);
}

#[tokio::test]
async fn test_empty_cart_is_not_sent() {
    let backend = MockBackend::start().await;
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let client = backend.client_with_storage(Arc::clone(&storage));
    backend.sign_in(&client);
    let mut cart = CartStore::load(storage).unwrap();

    let err = client.checkout(&mut cart, &details()).await.unwrap_err();

    assert!(matches!(err, ApiError::Invalid(ValidationError::EmptyCart)));
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_purchase_quote_uses_local_delivery_fee() {
    let backend = MockBackend::start().await;
    let client = backend.client();
    backend.sign_in(&client);

    // Buyer in "Ikeja", store in "ikeja ".
    let local = client
        .preview_purchase(ProductId::new(LOCAL_PRODUCT), 2)
        .await
        .unwrap();
    assert_eq!(local.quote.subtotal, Decimal::from(24000));
    assert_eq!(local.quote.delivery_fee, Decimal::from(1000));
    assert_eq!(local.quote.total, Decimal::from(25000));
    assert_eq!(local.balance, Decimal::from(50000));
    assert!(local.is_affordable());

    // No store details: the outside default applies.
    let remote = client
        .preview_purchase(ProductId::new(REMOTE_PRODUCT), 1)
        .await
        .unwrap();
    assert_eq!(remote.quote.delivery_fee, Decimal::from(2500));
}

#[tokio::test]
async fn test_purchase_posts_trimmed_message() {
    let backend = MockBackend::start().await;
    let client = backend.client();
    backend.sign_in(&client);

    let order = client
        .purchase(
            ProductId::new(LOCAL_PRODUCT),
            2,
            "  Gate 3, Unilag Akoka. Call on arrival.  ",
        )
        .await
        .unwrap();

    assert_eq!(order.total_amount, Decimal::from(24000));
    let posted = backend.requests_to("POST", "/api/orders/");
    let body = posted[0].body.as_ref().unwrap();
    assert_eq!(body["product_id"], LOCAL_PRODUCT);
    assert_eq!(body["quantity"], 2);
    assert_eq!(
        body["delivery_message"],
        "Gate 3, Unilag Akoka. Call on arrival."
    );
}

#[tokio::test]
async fn test_purchase_refused_when_wallet_is_short() {
    let backend = MockBackend::start().await;
    let client = backend.client();
    backend.sign_in(&client);
    backend.set_wallet_balance("5000.00");

    let err = client
        .purchase(ProductId::new(LOCAL_PRODUCT), 1, "Gate 3, Unilag Akoka")
        .await
        .unwrap_err();

    let ApiError::Invalid(ValidationError::InsufficientBalance { needed, available }) = err else {
        panic!("expected an insufficient balance error, got {err:?}");
    };
    assert_eq!(needed, Decimal::from(13000));
    assert_eq!(available, Decimal::from(5000));
    assert!(backend.requests_to("POST", "/api/orders/").is_empty());
}

#[tokio::test]
async fn test_purchase_requires_delivery_details() {
    let backend = MockBackend::start().await;
    let client = backend.client();
    backend.sign_in(&client);

    let err = client
        .purchase(ProductId::new(LOCAL_PRODUCT), 1, "Ikeja")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ApiError::Invalid(ValidationError::DeliveryMessageTooShort)
    ));
    assert!(backend.requests().is_empty());
}
