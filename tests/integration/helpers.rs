//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::OnceLock;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower::ServiceExt;

use relayhub_api::{AppState, build_app};
use relayhub_auth::{JwtEncoder, PasswordHasher};
use relayhub_core::config::{AppConfig, UserCredential};
use relayhub_core::traits::TokenIssuer;
use relayhub_core::types::Identity;

pub const TEST_SECRET: &str = "integration-test-secret";

/// (username, password) pairs seeded into every test app.
pub const USERS: &[(&str, &str)] = &[("alice", "wonderland"), ("bob", "builder")];

fn seeded_users() -> Vec<UserCredential> {
    static HASHED: OnceLock<Vec<UserCredential>> = OnceLock::new();
    HASHED
        .get_or_init(|| {
            let hasher = PasswordHasher::new();
            USERS
                .iter()
                .map(|(username, password)| UserCredential {
                    username: username.to_string(),
                    password_hash: hasher.hash_password(password).unwrap(),
                })
                .collect()
        })
        .clone()
}

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// State shared with any spawned server
    pub state: AppState,
    /// Application config
    pub config: AppConfig,
}

/// Simplified response for assertions
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    /// Create a new test application with seeded users
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = TEST_SECRET.to_string();
        config.auth.users = seeded_users();
        Self::with_config(config)
    }

    pub fn with_config(config: AppConfig) -> Self {
        let state = AppState::from_config(config.clone()).expect("Failed to build state");
        Self {
            router: build_app(state.clone()),
            state,
            config,
        }
    }

    /// Send a request through the router without a socket
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        body: Option<String>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body)),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        TestResponse { status, body }
    }

    /// POST /login from a given client address
    pub async fn login_from(&self, addr: &str, username: &str, password: &str) -> TestResponse {
        let body = serde_json::json!({ "username": username, "password": password }).to_string();
        self.request("POST", "/login", Some(body), &[("x-forwarded-for", addr)])
            .await
    }

    /// Mint a token directly with the configured secret
    pub fn token_for(&self, username: &str) -> String {
        JwtEncoder::new(&self.config.auth)
            .mint(&Identity::from(username))
            .unwrap()
    }

    /// Serve the app on an ephemeral port
    pub async fn spawn_server(&self) -> RunningServer {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let state = self.state.clone();
        let task = tokio::spawn(async move {
            relayhub_api::serve(listener, state, async move {
                let _ = stop_rx.await;
            })
            .await
            .unwrap();
        });
        RunningServer {
            addr,
            stop: Some(stop_tx),
            task,
        }
    }
}

/// Handle to a server spawned by [`TestApp::spawn_server`]
pub struct RunningServer {
    pub addr: SocketAddr,
    stop: Option<oneshot::Sender<()>>,
    pub task: JoinHandle<()>,
}

impl RunningServer {
    pub fn ws_url(&self, token: &str) -> String {
        format!("ws://{}/ws?token={}", self.addr, token)
    }

    /// Trigger graceful shutdown and wait for it
    pub async fn stop(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        tokio::time::timeout(std::time::Duration::from_secs(10), &mut self.task)
            .await
            .expect("server did not stop")
            .unwrap();
    }
}
