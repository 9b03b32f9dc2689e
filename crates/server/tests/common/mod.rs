//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with mock reference lookups and a file-backed order store, so the API can
//! be exercised without external services.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::sync::broadcast;
use tower::ServiceExt;

use comanda_core::{
    testing::{MockMenuLookup, MockTableAvailability},
    Config, DatabaseConfig, MenuLookup, OrderStore, SqliteOrderStore, TableAvailability,
};
use comanda_server::api::{create_router, OrderBroadcaster, OrderEvent};
use comanda_server::state::AppState;

/// Re-export fixtures for test convenience
pub use comanda_core::testing::fixtures;

/// Test fixture for API testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_order_creation() {
///     let fixture = TestFixture::new();
///
///     let response = fixture.post("/api/v1/orders", json!({
///         "table": 5,
///         "dish": "HOTDOG"
///     })).await;
///
///     assert_eq!(response.status, 201);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock menu - configure dishes and failures
    pub menu: Arc<MockMenuLookup>,
    /// Mock table service - configure tables and failures
    pub tables: Arc<MockTableAvailability>,
    /// Broadcaster shared with the router, for subscribing to events
    pub broadcaster: OrderBroadcaster,
    /// Temporary directory for the test database
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

impl TestFixture {
    /// Create a fixture with the demo menu and tables 1 to 10 available.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let menu = Arc::new(MockMenuLookup::with_items(fixtures::demo_menu()));
        let tables = Arc::new(MockTableAvailability::with_available(
            &(1..=10).collect::<Vec<u32>>(),
        ));

        let config = Config {
            database: DatabaseConfig {
                path: db_path.clone(),
            },
            ..Default::default()
        };

        let order_store: Arc<dyn OrderStore> =
            Arc::new(SqliteOrderStore::new(&db_path).expect("Failed to create order store"));
        let broadcaster = OrderBroadcaster::default();

        let state = Arc::new(AppState::new(
            config,
            order_store,
            Arc::clone(&menu) as Arc<dyn MenuLookup>,
            Arc::clone(&tables) as Arc<dyn TableAvailability>,
            broadcaster.clone(),
        ));

        let router = create_router(state);

        Self {
            router,
            menu,
            tables,
            broadcaster,
            temp_dir,
        }
    }

    /// Subscribe to order events published by the API.
    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.broadcaster.subscribe()
    }

    /// Create an order and return its id, asserting success.
    pub async fn create_order(&self, table: u32, dish: &str) -> String {
        let response = self
            .post("/api/v1/orders", json!({ "table": table, "dish": dish }))
            .await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "create failed: {}",
            response.text
        );
        response.body["id"]
            .as_str()
            .expect("order id in response")
            .to_string()
    }

    /// Apply an order action (`confirm`, `ready`, ...) and return the response.
    pub async fn action(&self, id: &str, action: &str) -> TestResponse {
        self.post_empty(&format!("/api/v1/orders/{}/{}", id, action))
            .await
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request without a body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        self.send(request_builder.body(body).unwrap()).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).to_string();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body, text }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {{
        let response = &$response;
        assert_eq!(
            response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status, response.status, response.text
        );
    }};
}
