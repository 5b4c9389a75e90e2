//! Integration tests for the Covu client.
//!
//! [`MockBackend`] serves the slice of the Covu REST API the tests need
//! from an axum router bound to `127.0.0.1:0`. Each test starts its own
//! backend, so tests never share tokens, orders, or counters.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p covu-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `token_refresh` - Single-flight refresh, expiry, and rotation
//! - `catalog` - List normalization and the product cache
//! - `cart_checkout` - Cart checkout and direct purchase
//! - `orders` - Role-checked order actions

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Path, Query, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use covu_client::{ClientConfig, CovuClient, MemoryStorage, Storage};
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio::task::JoinHandle;

/// Email of the seeded account.
pub const USER_EMAIL: &str = "ada@example.com";
/// Password of the seeded account.
pub const USER_PASSWORD: &str = "Sup3rSecret";

/// Product sold by a store in the buyer's city.
pub const LOCAL_PRODUCT: i64 = 7;
/// Product without store details.
pub const REMOTE_PRODUCT: i64 = 8;

const INITIAL_ACCESS: &str = "access-0";
const INITIAL_REFRESH: &str = "refresh-0";

/// A request as the backend received it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

#[derive(Default)]
struct BackendState {
    access_token: Mutex<String>,
    refresh_token: Mutex<String>,
    refresh_calls: AtomicUsize,
    refresh_delay: Mutex<Duration>,
    fail_refresh: AtomicBool,
    rotate_refresh: AtomicBool,
    reject_all_tokens: AtomicBool,
    paginate_lists: AtomicBool,
    fail_orders: AtomicBool,
    fail_order_actions: AtomicBool,
    product_hits: AtomicUsize,
    wallet_balance: Mutex<String>,
    products: Mutex<BTreeMap<i64, Value>>,
    orders: Mutex<BTreeMap<i64, Value>>,
    next_order_id: AtomicI64,
    requests: Mutex<Vec<RecordedRequest>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// MockBackend
// =============================================================================

/// An in-process Covu API.
pub struct MockBackend {
    addr: SocketAddr,
    state: Arc<BackendState>,
    server: JoinHandle<()>,
}

impl MockBackend {
    /// Start a backend with one account, two products, and no orders.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start() -> Self {
        let state = Arc::new(BackendState {
            access_token: Mutex::new(INITIAL_ACCESS.to_owned()),
            refresh_token: Mutex::new(INITIAL_REFRESH.to_owned()),
            wallet_balance: Mutex::new("50000.00".to_owned()),
            products: Mutex::new(seed_products()),
            next_order_id: AtomicI64::new(100),
            ..BackendState::default()
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock backend");
        let addr = listener.local_addr().expect("Mock backend has no address");

        let app = router(Arc::clone(&state));
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            state,
            server,
        }
    }

    /// Base URL to configure the client with.
    #[must_use]
    pub fn api_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// A client with in-memory storage and no session.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn client(&self) -> CovuClient {
        self.client_with_storage(Arc::new(MemoryStorage::new()))
    }

    /// A client over the given storage.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn client_with_storage(&self, storage: Arc<dyn Storage>) -> CovuClient {
        let config = ClientConfig::for_api_url(&self.api_url()).expect("Invalid mock URL");
        CovuClient::with_storage(&config, storage).expect("Failed to build client")
    }

    /// Store the backend's current tokens in `client`, as after a login.
    ///
    /// # Panics
    ///
    /// Panics if the tokens cannot be stored.
    pub fn sign_in(&self, client: &CovuClient) {
        client
            .tokens()
            .set_tokens(
                &SecretString::from(self.access_token()),
                &SecretString::from(self.refresh_token()),
            )
            .expect("Failed to store tokens");
    }

    /// Invalidate the access token every client currently holds.
    pub fn expire_access_token(&self) {
        *lock(&self.state.access_token) = "revoked".to_owned();
    }

    #[must_use]
    pub fn access_token(&self) -> String {
        lock(&self.state.access_token).clone()
    }

    #[must_use]
    pub fn refresh_token(&self) -> String {
        lock(&self.state.refresh_token).clone()
    }

    /// Calls made to the refresh endpoint.
    #[must_use]
    pub fn refresh_calls(&self) -> usize {
        self.state.refresh_calls.load(Ordering::SeqCst)
    }

    /// Product detail reads served.
    #[must_use]
    pub fn product_hits(&self) -> usize {
        self.state.product_hits.load(Ordering::SeqCst)
    }

    /// Hold each refresh response for `delay`.
    pub fn set_refresh_delay(&self, delay: Duration) {
        *lock(&self.state.refresh_delay) = delay;
    }

    /// Reject every refresh attempt.
    pub fn fail_refresh(&self, fail: bool) {
        self.state.fail_refresh.store(fail, Ordering::SeqCst);
    }

    /// Issue a new refresh token with every refresh.
    pub fn rotate_refresh_tokens(&self, rotate: bool) {
        self.state.rotate_refresh.store(rotate, Ordering::SeqCst);
    }

    /// Answer 401 to every authenticated request, even with a fresh token.
    pub fn reject_all_tokens(&self, reject: bool) {
        self.state.reject_all_tokens.store(reject, Ordering::SeqCst);
    }

    /// Answer list endpoints with a paginated envelope instead of an array.
    pub fn paginate_lists(&self, paginate: bool) {
        self.state.paginate_lists.store(paginate, Ordering::SeqCst);
    }

    /// Reject order creation with a 400.
    pub fn fail_orders(&self, fail: bool) {
        self.state.fail_orders.store(fail, Ordering::SeqCst);
    }

    /// Reject order actions with a 400, leaving the order as it was.
    pub fn fail_order_actions(&self, fail: bool) {
        self.state.fail_order_actions.store(fail, Ordering::SeqCst);
    }

    pub fn set_wallet_balance(&self, balance: &str) {
        *lock(&self.state.wallet_balance) = balance.to_owned();
    }

    /// Add an order for product 7 in `status`.
    pub fn insert_order(&self, id: i64, status: &str) {
        lock(&self.state.orders).insert(
            id,
            json!({
                "id": id,
                "order_number": format!("CV-{id}"),
                "status": status,
                "escrow_status": "HELD",
                "buyer": { "id": 1, "full_name": "Ada Obi" },
                "seller": { "id": 2, "full_name": "Chinedu Eze" },
                "product_snapshot": {
                    "id": LOCAL_PRODUCT,
                    "name": "Ankara gown",
                    "price": "12000.00"
                },
                "quantity": 1,
                "total_amount": "13000.00"
            }),
        );
    }

    /// Current status of an order, as the backend sees it.
    #[must_use]
    pub fn order_status(&self, id: i64) -> Option<String> {
        lock(&self.state.orders)
            .get(&id)
            .and_then(|order| order["status"].as_str())
            .map(str::to_owned)
    }

    /// Every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.state.requests).clone()
    }

    /// Requests received for one method and path.
    #[must_use]
    pub fn requests_to(&self, method: &str, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn seed_products() -> BTreeMap<i64, Value> {
    BTreeMap::from([
        (
            LOCAL_PRODUCT,
            json!({
                "id": LOCAL_PRODUCT,
                "name": "Ankara gown",
                "price": "12000.00",
                "stock": 5,
                "category": "ladies_clothes",
                "store": 3,
                "store_name": "Ada's Closet",
                "store_info": {
                    "id": 3,
                    "name": "Ada's Closet",
                    "city": "ikeja ",
                    "delivery_within_lga": "1000.00",
                    "delivery_outside_lga": "3000.00"
                }
            }),
        ),
        (
            REMOTE_PRODUCT,
            json!({
                "id": REMOTE_PRODUCT,
                "name": "Silk scarf",
                "price": "2500.00",
                "stock": 2,
                "category": "clothing_extras"
            }),
        ),
    ])
}

// =============================================================================
// Routes
// =============================================================================

fn router(state: Arc<BackendState>) -> Router {
    Router::new()
        .route("/api/auth/login/", post(login))
        .route("/api/auth/token/refresh/", post(refresh))
        .route("/api/auth/profile/", get(profile))
        .route("/api/products/", get(list_products))
        .route("/api/products/{id}/", get(get_product).patch(update_product))
        .route("/api/orders/", get(list_orders).post(create_order))
        .route("/api/orders/{id}/", get(get_order))
        .route("/api/orders/{id}/{action}/", post(order_action))
        .route("/api/wallet/balance/", get(wallet_balance))
        .layer(middleware::from_fn_with_state(Arc::clone(&state), record))
        .with_state(state)
}

async fn record(State(state): State<Arc<BackendState>>, request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();

    lock(&state.requests).push(RecordedRequest {
        method: parts.method.to_string(),
        path: parts.uri.path().to_owned(),
        query: parts.uri.query().map(str::to_owned),
        authorization: parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned),
        body: serde_json::from_slice(&bytes).ok(),
    });

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

fn error(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn authorize(state: &BackendState, headers: &HeaderMap) -> Result<(), Response> {
    let expected = format!("Bearer {}", lock(&state.access_token));
    let sent = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());

    if state.reject_all_tokens.load(Ordering::SeqCst) || sent != Some(expected.as_str()) {
        return Err(error(
            StatusCode::UNAUTHORIZED,
            json!({
                "detail": "Given token not valid for any token type",
                "code": "token_not_valid"
            }),
        ));
    }
    Ok(())
}

fn user(state: &BackendState) -> Value {
    json!({
        "id": 1,
        "email": USER_EMAIL,
        "full_name": "Ada Obi",
        "phone_number": "08031234567",
        "state": "lagos",
        "city": "Ikeja",
        "is_seller": false,
        "wallet_balance": lock(&state.wallet_balance).clone()
    })
}

async fn login(State(state): State<Arc<BackendState>>, Json(body): Json<Value>) -> Response {
    if body["email"] != USER_EMAIL || body["password"] != USER_PASSWORD {
        return error(
            StatusCode::UNAUTHORIZED,
            json!({ "detail": "No active account found with the given credentials" }),
        );
    }

    Json(json!({
        "access": lock(&state.access_token).clone(),
        "refresh": lock(&state.refresh_token).clone(),
        "user": user(&state)
    }))
    .into_response()
}

async fn refresh(State(state): State<Arc<BackendState>>, Json(body): Json<Value>) -> Response {
    let call = state.refresh_calls.fetch_add(1, Ordering::SeqCst) + 1;

    let delay = *lock(&state.refresh_delay);
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let current_refresh = lock(&state.refresh_token).clone();
    if state.fail_refresh.load(Ordering::SeqCst) || body["refresh"] != current_refresh.as_str() {
        return error(
            StatusCode::UNAUTHORIZED,
            json!({ "detail": "Token is invalid or expired", "code": "token_not_valid" }),
        );
    }

    let access = format!("access-{call}");
    *lock(&state.access_token) = access.clone();

    if state.rotate_refresh.load(Ordering::SeqCst) {
        let rotated = format!("refresh-{call}");
        *lock(&state.refresh_token) = rotated.clone();
        Json(json!({ "access": access, "refresh": rotated })).into_response()
    } else {
        Json(json!({ "access": access })).into_response()
    }
}

async fn profile(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Response {
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }
    Json(user(&state)).into_response()
}

fn list_response(state: &BackendState, items: Vec<Value>) -> Response {
    if state.paginate_lists.load(Ordering::SeqCst) {
        Json(json!({
            "count": items.len(),
            "next": null,
            "previous": null,
            "results": items
        }))
        .into_response()
    } else {
        Json(Value::Array(items)).into_response()
    }
}

async fn list_products(
    State(state): State<Arc<BackendState>>,
    Query(params): Query<BTreeMap<String, String>>,
) -> Response {
    let products: Vec<Value> = lock(&state.products)
        .values()
        .filter(|p| {
            params
                .get("category")
                .is_none_or(|category| p["category"] == category.as_str())
        })
        .cloned()
        .collect();
    list_response(&state, products)
}

async fn get_product(State(state): State<Arc<BackendState>>, Path(id): Path<i64>) -> Response {
    state.product_hits.fetch_add(1, Ordering::SeqCst);
    match lock(&state.products).get(&id) {
        Some(product) => Json(product.clone()).into_response(),
        None => error(StatusCode::NOT_FOUND, json!({ "detail": "Not found." })),
    }
}

async fn update_product(
    State(state): State<Arc<BackendState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(changes): Json<Value>,
) -> Response {
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }

    let mut products = lock(&state.products);
    let Some(product) = products.get_mut(&id) else {
        return error(StatusCode::NOT_FOUND, json!({ "detail": "Not found." }));
    };
    if let (Some(product), Some(changes)) = (product.as_object_mut(), changes.as_object()) {
        for (key, value) in changes {
            product.insert(key.clone(), value.clone());
        }
    }
    Json(product.clone()).into_response()
}

async fn list_orders(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Response {
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }
    let orders: Vec<Value> = lock(&state.orders).values().cloned().collect();
    list_response(&state, orders)
}

async fn create_order(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }
    if state.fail_orders.load(Ordering::SeqCst) {
        return error(StatusCode::BAD_REQUEST, json!({ "message": "Insufficient stock" }));
    }

    let id = state.next_order_id.fetch_add(1, Ordering::SeqCst);
    let (total, quantity) = if let Some(total) = body["total_amount"].as_str() {
        (total.to_owned(), Value::Null)
    } else {
        let price = lock(&state.products)
            .get(&body["product_id"].as_i64().unwrap_or_default())
            .and_then(|p| p["price"].as_str().and_then(|s| s.parse::<Decimal>().ok()))
            .unwrap_or_default();
        let quantity = body["quantity"].as_u64().unwrap_or(1);
        ((price * Decimal::from(quantity)).to_string(), json!(quantity))
    };

    let order = json!({
        "id": id,
        "order_number": format!("CV-{id}"),
        "status": "pending",
        "escrow_status": "HELD",
        "quantity": quantity,
        "total_amount": total,
        "delivery_message": body["delivery_message"]
    });
    lock(&state.orders).insert(id, order.clone());

    // Cart checkouts answer with a wrapped list, direct purchases with the order.
    let response = if body.get("items").is_some() {
        json!({ "orders": [order] })
    } else {
        order
    };
    (StatusCode::CREATED, Json(response)).into_response()
}

async fn get_order(
    State(state): State<Arc<BackendState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }
    match lock(&state.orders).get(&id) {
        Some(order) => Json(order.clone()).into_response(),
        None => error(StatusCode::NOT_FOUND, json!({ "detail": "Not found." })),
    }
}

async fn order_action(
    State(state): State<Arc<BackendState>>,
    Path((id, action)): Path<(i64, String)>,
    headers: HeaderMap,
) -> Response {
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }

    if state.fail_order_actions.load(Ordering::SeqCst) {
        return error(StatusCode::BAD_REQUEST, json!({ "message": "Order already accepted" }));
    }

    let status = match action.as_str() {
        "accept" => "accepted",
        "deliver" => "delivered",
        "confirm" => "confirmed",
        "cancel" => "cancelled",
        _ => return error(StatusCode::NOT_FOUND, json!({ "detail": "Not found." })),
    };

    let mut orders = lock(&state.orders);
    let Some(order) = orders.get_mut(&id) else {
        return error(StatusCode::NOT_FOUND, json!({ "detail": "Not found." }));
    };
    order["status"] = json!(status);
    Json(json!({ "message": format!("Order {status}") })).into_response()
}

async fn wallet_balance(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Response {
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }
    Json(json!({ "balance": lock(&state.wallet_balance).clone() })).into_response()
}
