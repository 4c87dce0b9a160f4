//! Shared test helpers for API integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use futures::StreamExt;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tower::ServiceExt;

use dealerchat_api::{AppState, build_app};
use dealerchat_auth::JwtEncoder;
use dealerchat_core::config::AppConfig;
use dealerchat_database::MemoryChatStore;
use dealerchat_entity::employee::{Employee, EmployeeRole};

pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

const FRAME_TIMEOUT: Duration = Duration::from_secs(5);

/// Test application context backed by the in-memory store.
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, for inspecting the realtime engine
    pub state: AppState,
    /// The store behind the state, for seeding
    pub store: Arc<MemoryChatStore>,
    /// Signs employee tokens with the test secret
    pub encoder: JwtEncoder,
}

impl TestApp {
    /// Create a new test application
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// Create a test application with custom configuration
    pub fn with_config(config: AppConfig) -> Self {
        let store = Arc::new(MemoryChatStore::new());
        let encoder = JwtEncoder::new(&config.auth);
        let state = AppState::new(config, store.clone(), None).expect("Failed to build state");
        let router = build_app(state.clone());

        Self {
            router,
            state,
            store,
            encoder,
        }
    }

    /// Seed an activated employee
    pub async fn add_employee(&self, name: &str, role: EmployeeRole) -> Employee {
        self.store.add_activated_employee(name, role).await
    }

    /// Mint an access token for an employee
    pub fn token_for(&self, employee: &Employee) -> String {
        self.encoder
            .generate_access_token(employee.id, employee.role, &employee.name)
            .expect("Failed to mint token")
            .access_token
    }

    /// Make an HTTP request against the router
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Open a chat session through the API and return its ID
    pub async fn open_session(&self, form_instance_id: &str, customer_name: &str) -> String {
        let response = self
            .request(
                "POST",
                "/api/chat/sessions",
                Some(serde_json::json!({
                    "form_instance_id": form_instance_id,
                    "customer_name": customer_name,
                })),
                None,
            )
            .await;
        assert!(response.status.is_success(), "open failed: {:?}", response);
        response.body["data"]["id"]
            .as_str()
            .expect("session id")
            .to_string()
    }

    /// Serve the app on an ephemeral port
    pub async fn spawn_server(&self) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("local addr");
        let app = self.router.clone();
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("server failed");
        });
        addr
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body (`Null` if not JSON)
    pub body: Value,
}

/// Configuration used by every test app
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = "integration-test-secret".to_string();
    config.realtime.send_timeout_ms = 500;
    config
}

/// Connect a WebSocket client
pub async fn connect(addr: SocketAddr, path: &str) -> WsClient {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}{path}"))
        .await
        .expect("Failed to connect");
    ws
}

/// Next text frame as JSON, skipping control frames
pub async fn next_json(ws: &mut WsClient) -> Value {
    loop {
        let frame = tokio::time::timeout(FRAME_TIMEOUT, ws.next())
            .await
            .expect("Timed out waiting for frame")
            .expect("Stream ended")
            .expect("WebSocket error");
        match frame {
            Message::Text(text) => {
                return serde_json::from_str(text.as_str()).expect("Frame is not JSON");
            }
            Message::Close(frame) => panic!("Unexpected close: {frame:?}"),
            _ => continue,
        }
    }
}

/// Wait for the server's close frame and return its code
pub async fn expect_close(ws: &mut WsClient) -> u16 {
    let frame = tokio::time::timeout(FRAME_TIMEOUT, ws.next())
        .await
        .expect("Timed out waiting for close");
    match frame {
        Some(Ok(Message::Close(Some(frame)))) => u16::from(frame.code),
        Some(Ok(Message::Close(None))) | None => panic!("Closed without a code"),
        Some(Ok(other)) => panic!("Expected close, got {other:?}"),
        Some(Err(e)) => panic!("WebSocket error before close: {e}"),
    }
}

/// Poll until `check` holds or the frame timeout passes
pub async fn wait_until(mut check: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + FRAME_TIMEOUT;
    while !check() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "Condition not reached in time"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
