//! HTTP transport for the Covu REST API.
//!
//! Every request carries the stored access token as a bearer header. When
//! the backend answers 401 the client renews the session once and retries:
//!
//! - Only one refresh call is in flight at a time. Requests that hit a 401
//!   while it runs queue up and are released in arrival order when it
//!   settles.
//! - If another caller already replaced the token a request was sent with,
//!   the request is retried with the current token and no refresh happens.
//! - When the refresh fails (or there is no refresh token) the stored
//!   session is cleared and [`SessionEvent::Expired`] is broadcast.
//! - A retried request is never retried again.

use std::mem;
use std::sync::{Arc, Mutex, PoisonError};

use reqwest::header::AUTHORIZATION;
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::sync::{broadcast, oneshot};
use tracing::{debug, info, instrument, warn};

use crate::config::ClientConfig;
use crate::error::{ApiError, RefreshFailure, extract_message};
use crate::tokens::TokenStore;

/// Path of the token refresh endpoint.
pub const REFRESH_PATH: &str = "/auth/token/refresh/";

/// Changes to the session that callers may want to react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Tokens were stored after login or registration.
    SignedIn,
    /// The access token was renewed.
    Refreshed,
    /// The session could not be renewed and was cleared.
    Expired,
    /// The user logged out.
    SignedOut,
}

// =============================================================================
// ApiRequest
// =============================================================================

/// A request to the Covu API, relative to the configured base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<Value>,
    authorization: Option<String>,
    allow_refresh: bool,
    retried: bool,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            authorization: None,
            allow_refresh: true,
            retried: false,
        }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append a query parameter.
    #[must_use]
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_owned(), value.to_string()));
        self
    }

    /// Append a query parameter when `value` is present.
    #[must_use]
    pub fn query_opt(self, key: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    /// Set the JSON body.
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Send an explicit `Authorization` header instead of the stored token.
    #[must_use]
    pub fn authorization(mut self, value: impl Into<String>) -> Self {
        self.authorization = Some(value.into());
        self
    }

    /// Treat a 401 as a plain error instead of a reason to refresh.
    ///
    /// Used for credential endpoints, where a 401 means wrong credentials.
    #[must_use]
    pub const fn without_refresh(mut self) -> Self {
        self.allow_refresh = false;
        self
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the Covu REST API.
///
/// Cheap to clone; clones share the connection pool, the session, and the
/// refresh coordination.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: String,
    tokens: TokenStore,
    refresh: Mutex<RefreshState>,
    events: broadcast::Sender<SessionEvent>,
}

type RefreshOutcome = Result<(), RefreshFailure>;

/// Refresh coordination. Never held across an await.
enum RefreshState {
    Idle,
    InFlight(Vec<oneshot::Sender<RefreshOutcome>>),
}

/// What a request that got a 401 should do.
enum Recovery {
    /// Run the refresh and release everyone queued behind it.
    Lead,
    /// Wait for the refresh already in flight.
    Wait(oneshot::Receiver<RefreshOutcome>),
    /// The token was replaced after this request was sent; just retry.
    Retry,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access: String,
    #[serde(default)]
    refresh: Option<String>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client for `config.api_url` using `tokens` for the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig, tokens: TokenStore) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("covu-client/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let (events, _) = broadcast::channel(16);

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url: config.api_url.trim_end_matches('/').to_owned(),
                tokens,
                refresh: Mutex::new(RefreshState::Idle),
                events,
            }),
        })
    }

    /// The session store this client reads tokens from.
    #[must_use]
    pub fn tokens(&self) -> &TokenStore {
        &self.inner.tokens
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Receive session events from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    pub(crate) fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.inner.events.send(event);
    }

    /// Absolute URL for an API path. The base URL's own path is kept.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.inner.base_url)
        } else {
            format!("{}/{path}", self.inner.base_url)
        }
    }

    /// Send a request and decode the JSON response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the session cannot be
    /// renewed, or the response does not decode as `T`.
    pub async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let body = self.execute(request).await?;
        let text = if body.trim().is_empty() { "null" } else { &body };
        serde_json::from_str(text).map_err(|e| {
            warn!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to decode API response"
            );
            ApiError::Parse(e)
        })
    }

    /// Send a request and ignore the response body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the session cannot be
    /// renewed.
    pub async fn send_empty(&self, request: ApiRequest) -> Result<(), ApiError> {
        self.execute(request).await.map(drop)
    }

    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    async fn execute(&self, mut request: ApiRequest) -> Result<String, ApiError> {
        loop {
            let token = if request.authorization.is_some() {
                None
            } else {
                self.inner.tokens.access_token()?
            };

            let response = self.dispatch(&request, token.as_ref()).await?;
            let status = response.status();
            let body = response.text().await?;

            if status.is_success() {
                return Ok(body);
            }

            if status != StatusCode::UNAUTHORIZED || request.retried || !request.allow_refresh {
                debug!(status = %status, retried = request.retried, "Request failed");
                return Err(ApiError::from_response(status, &body));
            }

            request.retried = true;
            request.authorization = None;

            match self.recover_session(token.as_ref()).await {
                Ok(()) => {}
                Err(ApiError::SessionExpired(RefreshFailure::MissingRefreshToken)) => {
                    return Err(ApiError::from_response(status, &body));
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn dispatch(
        &self,
        request: &ApiRequest,
        token: Option<&SecretString>,
    ) -> Result<reqwest::Response, ApiError> {
        let mut builder = self
            .inner
            .http
            .request(request.method.clone(), self.url(&request.path));

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(authorization) = &request.authorization {
            builder = builder.header(AUTHORIZATION, authorization);
        } else if let Some(token) = token {
            builder = builder.bearer_auth(token.expose_secret());
        }

        debug!(retried = request.retried, "Dispatching request");
        Ok(builder.send().await?)
    }

    // =========================================================================
    // Session renewal
    // =========================================================================

    /// Make the session usable again after a 401 on a request sent with
    /// `sent_token`.
    async fn recover_session(&self, sent_token: Option<&SecretString>) -> Result<(), ApiError> {
        match self.plan_recovery(sent_token)? {
            Recovery::Retry => {
                debug!("Token changed since request was sent, retrying");
                Ok(())
            }
            Recovery::Wait(receiver) => {
                debug!("Refresh in flight, queueing request");
                match receiver.await {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(failure)) => Err(ApiError::SessionExpired(failure)),
                    Err(_) => Err(ApiError::RefreshAborted),
                }
            }
            Recovery::Lead => {
                let guard = RefreshGuard::new(self);
                let outcome = self.refresh_session().await;
                guard.settle(&outcome);
                outcome.map_err(ApiError::SessionExpired)
            }
        }
    }

    fn plan_recovery(&self, sent_token: Option<&SecretString>) -> Result<Recovery, ApiError> {
        let mut state = self.lock_refresh();
        if let RefreshState::InFlight(waiters) = &mut *state {
            let (sender, receiver) = oneshot::channel();
            waiters.push(sender);
            return Ok(Recovery::Wait(receiver));
        }

        let current = self.inner.tokens.access_token()?;
        let replaced = match (&current, sent_token) {
            (Some(current), Some(sent)) => current.expose_secret() != sent.expose_secret(),
            (Some(_), None) => true,
            (None, _) => false,
        };
        if replaced {
            return Ok(Recovery::Retry);
        }

        *state = RefreshState::InFlight(Vec::new());
        Ok(Recovery::Lead)
    }

    /// Exchange the refresh token for a new access token, clearing the
    /// session on failure.
    #[instrument(skip(self))]
    async fn refresh_session(&self) -> RefreshOutcome {
        match self.request_new_tokens().await {
            Ok(()) => {
                info!("Access token refreshed");
                self.emit(SessionEvent::Refreshed);
                Ok(())
            }
            Err(failure) => {
                warn!(error = %failure, "Token refresh failed, clearing session");
                if let Err(e) = self.inner.tokens.clear() {
                    warn!(error = %e, "Failed to clear stored session");
                }
                self.emit(SessionEvent::Expired);
                Err(failure)
            }
        }
    }

    async fn request_new_tokens(&self) -> RefreshOutcome {
        let tokens = &self.inner.tokens;
        let refresh = tokens
            .refresh_token()
            .map_err(|e| RefreshFailure::Storage(e.to_string()))?
            .ok_or(RefreshFailure::MissingRefreshToken)?;

        let response = self
            .inner
            .http
            .post(self.url(REFRESH_PATH))
            .json(&json!({ "refresh": refresh.expose_secret() }))
            .send()
            .await
            .map_err(|e| RefreshFailure::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RefreshFailure::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(RefreshFailure::Rejected {
                status: status.as_u16(),
                message: extract_message(&body),
            });
        }

        let renewed: RefreshResponse =
            serde_json::from_str(&body).map_err(|e| RefreshFailure::Rejected {
                status: status.as_u16(),
                message: format!("unexpected refresh response: {e}"),
            })?;

        tokens
            .set_access_token(&SecretString::from(renewed.access))
            .map_err(|e| RefreshFailure::Storage(e.to_string()))?;
        if let Some(rotated) = renewed.refresh {
            tokens
                .set_refresh_token(&SecretString::from(rotated))
                .map_err(|e| RefreshFailure::Storage(e.to_string()))?;
        }
        Ok(())
    }

    fn lock_refresh(&self) -> std::sync::MutexGuard<'_, RefreshState> {
        self.inner
            .refresh
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn take_waiters(&self) -> Vec<oneshot::Sender<RefreshOutcome>> {
        match mem::replace(&mut *self.lock_refresh(), RefreshState::Idle) {
            RefreshState::InFlight(waiters) => waiters,
            RefreshState::Idle => Vec::new(),
        }
    }
}

/// Returns the client to idle when the leading request finishes or is
/// dropped. Waiters of an abandoned refresh see their sender dropped.
struct RefreshGuard<'a> {
    client: &'a ApiClient,
    settled: bool,
}

impl<'a> RefreshGuard<'a> {
    const fn new(client: &'a ApiClient) -> Self {
        Self {
            client,
            settled: false,
        }
    }

    fn settle(mut self, outcome: &RefreshOutcome) {
        self.settled = true;
        let waiters = self.client.take_waiters();
        debug!(waiters = waiters.len(), "Releasing queued requests");
        for waiter in waiters {
            // A waiter that gave up has dropped its receiver.
            let _ = waiter.send(outcome.clone());
        }
    }
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let abandoned = self.client.take_waiters();
        if !abandoned.is_empty() {
            warn!(waiters = abandoned.len(), "Token refresh abandoned");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn client(api_url: &str) -> ApiClient {
        let config = ClientConfig::for_api_url(api_url).unwrap();
        let tokens = TokenStore::new(Arc::new(MemoryStorage::new()));
        ApiClient::new(&config, tokens).unwrap()
    }

    #[test]
    fn test_url_keeps_base_path() {
        let api = client("https://covu.onrender.com/api/");
        assert_eq!(
            api.url("/products/12/"),
            "https://covu.onrender.com/api/products/12/"
        );
        assert_eq!(api.url("orders/"), "https://covu.onrender.com/api/orders/");
    }

    #[test]
    fn test_request_builder() {
        let request = ApiRequest::get("/products/")
            .query("page", 2)
            .query_opt("category", None::<&str>)
            .query_opt("search", Some("ankara"));

        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.path(), "/products/");
        assert_eq!(
            request.query,
            vec![
                ("page".to_owned(), "2".to_owned()),
                ("search".to_owned(), "ankara".to_owned()),
            ]
        );
        assert!(request.allow_refresh);
        assert!(!ApiRequest::post("/auth/login/").without_refresh().allow_refresh);
    }

    #[tokio::test]
    async fn test_missing_refresh_token_expires_session_without_network() {
        // Unroutable base URL: any network call would fail with Transport.
        let api = client("http://127.0.0.1:9");
        let mut events = api.subscribe();
        let stale = SecretString::from("stale");
        api.tokens().set_access_token(&stale).unwrap();

        let result = api.recover_session(Some(&stale)).await;

        assert!(matches!(
            result,
            Err(ApiError::SessionExpired(RefreshFailure::MissingRefreshToken))
        ));
        assert!(!api.tokens().is_authenticated().unwrap());
        assert_eq!(events.recv().await.unwrap(), SessionEvent::Expired);
        assert!(matches!(*api.lock_refresh(), RefreshState::Idle));
    }

    #[tokio::test]
    async fn test_replaced_token_retries_without_refresh() {
        let api = client("http://127.0.0.1:9");
        api.tokens()
            .set_access_token(&SecretString::from("new"))
            .unwrap();

        let result = api.recover_session(Some(&SecretString::from("old"))).await;

        assert!(result.is_ok());
        assert!(api.tokens().is_authenticated().unwrap());
        assert!(matches!(*api.lock_refresh(), RefreshState::Idle));
    }

    #[tokio::test]
    async fn test_waiters_see_abandoned_refresh() {
        let api = client("http://127.0.0.1:9");
        *api.lock_refresh() = RefreshState::InFlight(Vec::new());

        let Recovery::Wait(receiver) = api.plan_recovery(None).unwrap() else {
            panic!("expected to queue behind the in-flight refresh");
        };

        drop(RefreshGuard::new(&api));

        assert!(receiver.await.is_err());
        assert!(matches!(*api.lock_refresh(), RefreshState::Idle));
    }

    #[tokio::test]
    async fn test_settle_releases_waiters_in_order() {
        let api = client("http://127.0.0.1:9");
        *api.lock_refresh() = RefreshState::InFlight(Vec::new());

        let mut receivers = Vec::new();
        for _ in 0..3 {
            let Recovery::Wait(receiver) = api.plan_recovery(None).unwrap() else {
                panic!("expected to queue");
            };
            receivers.push(receiver);
        }

        let failure = RefreshFailure::Rejected {
            status: 401,
            message: "Token is invalid or expired".to_owned(),
        };
        RefreshGuard::new(&api).settle(&Err(failure.clone()));

        for receiver in receivers {
            assert_eq!(receiver.await.unwrap(), Err(failure.clone()));
        }
    }
}
