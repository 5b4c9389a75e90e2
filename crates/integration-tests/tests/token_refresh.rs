//! Session renewal against the mock backend.
//!
//! Run with: cargo test -p covu-integration-tests --test token_refresh

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use covu_client::{ApiError, RefreshFailure, SessionEvent};
use covu_core::Email;
use covu_integration_tests::{MockBackend, USER_EMAIL, USER_PASSWORD};
use futures::future::join_all;
use secrecy::{ExposeSecret, SecretString};

fn stored_access(client: &covu_client::CovuClient) -> Option<String> {
    client
        .tokens()
        .access_token()
        .unwrap()
        .map(|t| t.expose_secret().to_owned())
}

#[tokio::test]
async fn test_login_stores_session() {
    let backend = MockBackend::start().await;
    let client = backend.client();

    let user = client
        .login(
            &Email::parse(USER_EMAIL).unwrap(),
            &SecretString::from(USER_PASSWORD),
        )
        .await
        .unwrap();

    assert_eq!(user.email, USER_EMAIL);
    assert!(client.is_authenticated().unwrap());
    assert_eq!(stored_access(&client), Some(backend.access_token()));
    assert_eq!(client.current_user().unwrap().map(|u| u.id), Some(user.id));
}

#[tokio::test]
async fn test_bad_credentials_do_not_trigger_refresh() {
    let backend = MockBackend::start().await;
    let client = backend.client();

    let err = client
        .login(
            &Email::parse(USER_EMAIL).unwrap(),
            &SecretString::from("wrong-password"),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized { .. }));
    assert_eq!(
        err.user_message(),
        "No active account found with the given credentials"
    );
    assert_eq!(backend.refresh_calls(), 0);
}

#[tokio::test]
async fn test_concurrent_401s_share_one_refresh() {
    let backend = MockBackend::start().await;
    let client = backend.client();
    backend.sign_in(&client);
    backend.expire_access_token();
    backend.set_refresh_delay(Duration::from_millis(200));

    let results = join_all((0..8).map(|_| client.get_profile())).await;

    for result in &results {
        assert_eq!(result.as_ref().unwrap().email, USER_EMAIL);
    }
    assert_eq!(backend.refresh_calls(), 1);
    assert_eq!(stored_access(&client), Some(backend.access_token()));
}

#[tokio::test]
async fn test_retried_request_does_not_refresh_twice() {
    let backend = MockBackend::start().await;
    let client = backend.client();
    backend.sign_in(&client);
    backend.reject_all_tokens(true);

    let err = client.get_profile().await.unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized { .. }));
    assert_eq!(backend.refresh_calls(), 1);
    // Refresh itself succeeded, so the session is kept.
    assert!(client.is_authenticated().unwrap());
}

#[tokio::test]
async fn test_missing_refresh_token_expires_session_without_refresh_call() {
    let backend = MockBackend::start().await;
    let client = backend.client();
    client
        .tokens()
        .set_access_token(&SecretString::from(backend.access_token()))
        .unwrap();
    backend.expire_access_token();
    let mut events = client.api().subscribe();

    let err = client.get_profile().await.unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized { .. }));
    assert_eq!(backend.refresh_calls(), 0);
    assert!(!client.is_authenticated().unwrap());
    assert_eq!(events.try_recv().unwrap(), SessionEvent::Expired);
}

#[tokio::test]
async fn test_refresh_failure_rejects_every_queued_request() {
    let backend = MockBackend::start().await;
    let client = backend.client();
    backend.sign_in(&client);
    backend.expire_access_token();
    backend.fail_refresh(true);
    backend.set_refresh_delay(Duration::from_millis(200));
    let mut events = client.api().subscribe();

    let results = join_all((0..5).map(|_| client.get_profile())).await;

    let mut rejected_by_refresh = 0;
    for result in results {
        let err = result.unwrap_err();
        assert!(err.is_auth_failure(), "{err:?}");
        if let ApiError::SessionExpired(RefreshFailure::Rejected { status, .. }) = err {
            assert_eq!(status, 401);
            rejected_by_refresh += 1;
        }
    }
    assert_eq!(rejected_by_refresh, 5);
    assert_eq!(backend.refresh_calls(), 1);
    assert!(!client.is_authenticated().unwrap());
    assert!(client.tokens().refresh_token().unwrap().is_none());
    assert_eq!(events.try_recv().unwrap(), SessionEvent::Expired);
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_rotated_refresh_token_is_stored() {
    let backend = MockBackend::start().await;
    let client = backend.client();
    backend.sign_in(&client);
    backend.rotate_refresh_tokens(true);
    backend.expire_access_token();

    client.get_profile().await.unwrap();

    let stored = client
        .tokens()
        .refresh_token()
        .unwrap()
        .map(|t| t.expose_secret().to_owned());
    assert_eq!(stored.as_deref(), Some("refresh-1"));
    assert_eq!(stored, Some(backend.refresh_token()));

    // The rotated token works for the next renewal.
    backend.expire_access_token();
    client.get_profile().await.unwrap();
    assert_eq!(backend.refresh_calls(), 2);
}

#[tokio::test]
async fn test_refresh_is_sent_without_bearer_header() {
    let backend = MockBackend::start().await;
    let client = backend.client();
    backend.sign_in(&client);
    backend.expire_access_token();

    client.get_profile().await.unwrap();

    let refreshes = backend.requests_to("POST", "/api/auth/token/refresh/");
    assert_eq!(refreshes.len(), 1);
    assert!(refreshes[0].authorization.is_none());
    assert_eq!(
        refreshes[0].body.as_ref().unwrap()["refresh"],
        "refresh-0"
    );

    let profiles = backend.requests_to("GET", "/api/auth/profile/");
    assert_eq!(profiles.len(), 2);
    assert_eq!(profiles[0].authorization.as_deref(), Some("Bearer access-0"));
    assert_eq!(profiles[1].authorization.as_deref(), Some("Bearer access-1"));
}
