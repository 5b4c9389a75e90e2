//! Catalog reads: list normalization, query parameters, and the product cache.
//!
//! Run with: cargo test -p covu-integration-tests --test catalog

#![allow(clippy::unwrap_used)]

use covu_client::{ApiError, ProductQuery};
use covu_core::ProductId;
use covu_integration_tests::{LOCAL_PRODUCT, MockBackend, REMOTE_PRODUCT};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_array_and_paginated_lists_normalize_identically() {
    let backend = MockBackend::start().await;
    let client = backend.client();

    let bare = client.list_products(&ProductQuery::default()).await.unwrap();
    backend.paginate_lists(true);
    let paginated = client.list_products(&ProductQuery::default()).await.unwrap();

    assert_eq!(bare.items, paginated.items);
    assert_eq!(bare.count, 2);
    assert_eq!(paginated.count, 2);
    assert_eq!(bare.page, 1);
    assert!(!paginated.has_next());
}

#[tokio::test]
async fn test_list_query_skips_all_category() {
    let backend = MockBackend::start().await;
    let client = backend.client();

    client
        .list_products(&ProductQuery {
            category: Some("all".to_owned()),
            search: Some("  ".to_owned()),
            ..ProductQuery::default()
        })
        .await
        .unwrap();
    let wigs = client
        .list_products(&ProductQuery {
            page: 2,
            category: Some("ladies_clothes".to_owned()),
            ..ProductQuery::default()
        })
        .await
        .unwrap();

    let requests = backend.requests_to("GET", "/api/products/");
    let first = requests[0].query.as_deref().unwrap();
    assert!(!first.contains("category"));
    assert!(!first.contains("search"));
    assert!(first.contains("page=1"));
    assert!(first.contains("page_size=20"));

    let second = requests[1].query.as_deref().unwrap();
    assert!(second.contains("category=ladies_clothes"));
    assert!(second.contains("page=2"));
    assert_eq!(wigs.page, 2);
    assert_eq!(wigs.items.len(), 1);
}

#[tokio::test]
async fn test_product_details_are_cached_until_updated() {
    let backend = MockBackend::start().await;
    let client = backend.client();
    backend.sign_in(&client);
    let id = ProductId::new(LOCAL_PRODUCT);

    let first = client.get_product(id).await.unwrap();
    let second = client.get_product(id).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(backend.product_hits(), 1);

    let updated = client
        .update_product(id, json!({ "name": "Ankara maxi gown" }))
        .await
        .unwrap();
    assert_eq!(updated.name, "Ankara maxi gown");

    let refetched = client.get_product(id).await.unwrap();
    assert_eq!(refetched.name, "Ankara maxi gown");
    assert_eq!(backend.product_hits(), 2);
}

#[tokio::test]
async fn test_related_products_exclude_the_current_one() {
    let backend = MockBackend::start().await;
    let client = backend.client();

    let related = client
        .related_products("ladies_clothes", ProductId::new(LOCAL_PRODUCT), 4)
        .await
        .unwrap();
    assert!(related.is_empty());

    let related = client
        .related_products("clothing_extras", ProductId::new(LOCAL_PRODUCT), 4)
        .await
        .unwrap();
    assert_eq!(related.len(), 1);
    assert_eq!(related[0].id, ProductId::new(REMOTE_PRODUCT));

    let before = backend.requests().len();
    let related = client
        .related_products("all", ProductId::new(LOCAL_PRODUCT), 4)
        .await
        .unwrap();
    assert!(related.is_empty());
    assert_eq!(backend.requests().len(), before);
}

#[tokio::test]
async fn test_missing_product_surfaces_backend_message() {
    let backend = MockBackend::start().await;
    let client = backend.client();

    let err = client.get_product(ProductId::new(999)).await.unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    assert!(matches!(err, ApiError::Client { .. }));
    assert_eq!(err.user_message(), "Not found.");
}
