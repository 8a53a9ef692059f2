//! Common test utilities for netta integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use serde_json::{json, Value};

use netta_service::{create_router, AppState, ServiceConfig};
use netta_store::SqliteStore;

/// Password used for every test account.
pub const PASSWORD: &str = "secret123";

/// A registered, logged-in test user.
#[derive(Debug, Clone)]
pub struct TestUser {
    /// User ID.
    pub id: String,
    /// Username.
    pub username: String,
    /// Session token.
    pub token: String,
}

impl TestUser {
    /// The authorization header value for this user.
    pub fn auth(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// The store behind the server, for direct inspection.
    pub store: Arc<SqliteStore>,
}

impl TestHarness {
    /// Create a new test harness with a fresh in-memory database.
    pub async fn new() -> Self {
        let store = Arc::new(
            SqliteStore::in_memory()
                .await
                .expect("Failed to open store"),
        );

        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            database_url: "sqlite::memory:".into(),
            secret_key: "test-secret".into(),
            token_ttl_seconds: 3600,
            seed_demo_data: false,
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
        };

        let state = AppState::new(store.clone(), config);
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self { server, store }
    }

    /// Register `username` and log in.
    pub async fn user(&self, username: &str) -> TestUser {
        let response = self
            .server
            .post("/register")
            .json(&json!({
                "username": username,
                "email": format!("{username}@example.com"),
                "password": PASSWORD,
                "confirm_password": PASSWORD,
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);

        let response = self
            .server
            .post("/login")
            .json(&json!({ "username": username, "password": PASSWORD }))
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        TestUser {
            id: body["user"]["id"].as_str().expect("user id").to_string(),
            username: username.to_string(),
            token: body["token"].as_str().expect("token").to_string(),
        }
    }

    /// Create a post as `user` and return its ID.
    pub async fn post(&self, user: &TestUser, content: &str, is_private: bool) -> String {
        let response = self
            .server
            .post("/create_post")
            .add_header("authorization", user.auth())
            .json(&json!({ "content": content, "is_private": is_private }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);

        let body: Value = response.json();
        body["post"]["id"].as_str().expect("post id").to_string()
    }

    /// Make `a` and `b` friends.
    pub async fn befriend(&self, a: &TestUser, b: &TestUser) {
        self.server
            .post(&format!("/api/friends/{}", b.username))
            .add_header("authorization", a.auth())
            .await
            .assert_status_ok();
        self.server
            .post(&format!("/api/friends/{}/respond", a.username))
            .add_header("authorization", b.auth())
            .json(&json!({ "accept": true }))
            .await
            .assert_status_ok();
    }
}
