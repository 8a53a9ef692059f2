//! Registration, login, and session integration tests.

mod common;

use axum::http::StatusCode;
use common::{TestHarness, PASSWORD};
use serde_json::{json, Value};

fn registration(username: &str, email: &str) -> Value {
    json!({
        "username": username,
        "email": email,
        "password": PASSWORD,
        "confirm_password": PASSWORD,
    })
}

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn register_success() {
    let harness = TestHarness::new().await;

    let response = harness
        .server
        .post("/register")
        .json(&registration("alice", "Alice@Example.com"))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["username"], "alice");
    assert_eq!(body["user"]["email"], "alice@example.com");
    assert_eq!(body["user"]["level"], 1);
    assert_eq!(body["user"]["xp"], 0);
    assert_eq!(body["user"]["coins"], 0);
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn register_duplicate_username_fails() {
    let harness = TestHarness::new().await;
    harness.user("alice").await;

    let response = harness
        .server
        .post("/register")
        .json(&registration("ALICE", "other@example.com"))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "conflict");
    assert_eq!(body["error"]["message"], "Username already taken");
}

#[tokio::test]
async fn register_duplicate_email_fails() {
    let harness = TestHarness::new().await;
    harness.user("alice").await;

    let response = harness
        .server
        .post("/register")
        .json(&registration("bob", "alice@example.com"))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["error"]["message"], "Email already in use");
}

#[tokio::test]
async fn register_password_mismatch_fails() {
    let harness = TestHarness::new().await;

    let response = harness
        .server
        .post("/register")
        .json(&json!({
            "username": "alice",
            "email": "alice@example.com",
            "password": "secret123",
            "confirm_password": "secret124",
        }))
        .await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn register_short_password_fails() {
    let harness = TestHarness::new().await;

    let response = harness
        .server
        .post("/register")
        .json(&json!({
            "username": "alice",
            "email": "alice@example.com",
            "password": "abc",
            "confirm_password": "abc",
        }))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn register_invalid_email_fails() {
    let harness = TestHarness::new().await;

    let response = harness
        .server
        .post("/register")
        .json(&registration("alice", "not-an-email"))
        .await;

    response.assert_status_bad_request();
}

// ============================================================================
// Login / Logout
// ============================================================================

#[tokio::test]
async fn login_with_wrong_password_fails() {
    let harness = TestHarness::new().await;
    harness.user("alice").await;

    let wrong_password = harness
        .server
        .post("/login")
        .json(&json!({ "username": "alice", "password": "nope-nope" }))
        .await;
    wrong_password.assert_status_unauthorized();

    let unknown_user = harness
        .server
        .post("/login")
        .json(&json!({ "username": "nobody", "password": PASSWORD }))
        .await;
    unknown_user.assert_status_unauthorized();

    let a: Value = wrong_password.json();
    let b: Value = unknown_user.json();
    assert_eq!(a, b);
}

#[tokio::test]
async fn token_grants_access_to_me() {
    let harness = TestHarness::new().await;
    let alice = harness.user("alice").await;

    let response = harness
        .server
        .get("/api/me")
        .add_header("authorization", alice.auth())
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["user"]["id"], alice.id);
    assert_eq!(body["user"]["xp_to_next_level"], 100);
    assert_eq!(body["unread_notifications"], 0);
}

#[tokio::test]
async fn me_without_auth_fails() {
    let harness = TestHarness::new().await;

    let response = harness.server.get("/api/me").await;

    response.assert_status_unauthorized();
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "unauthorized");
}

#[tokio::test]
async fn garbage_token_fails() {
    let harness = TestHarness::new().await;

    let response = harness
        .server
        .get("/api/me")
        .add_header("authorization", "Bearer not.a.jwt")
        .await;

    response.assert_status_unauthorized();
}

#[tokio::test]
async fn logout_revokes_the_token() {
    let harness = TestHarness::new().await;
    let alice = harness.user("alice").await;

    harness
        .server
        .post("/logout")
        .add_header("authorization", alice.auth())
        .await
        .assert_status_ok();

    harness
        .server
        .get("/api/me")
        .add_header("authorization", alice.auth())
        .await
        .assert_status_unauthorized();
}

#[tokio::test]
async fn profile_update_round_trips() {
    let harness = TestHarness::new().await;
    let alice = harness.user("alice").await;

    let response = harness
        .server
        .patch("/api/me")
        .add_header("authorization", alice.auth())
        .json(&json!({ "full_name": "Alice A.", "location": "Berlin" }))
        .await;
    response.assert_status_ok();

    let response = harness.server.get("/api/users/alice").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["user"]["full_name"], "Alice A.");
    assert_eq!(body["user"]["location"], "Berlin");
    assert!(body["user"].get("email").is_none());
}

#[tokio::test]
async fn unknown_profile_is_not_found() {
    let harness = TestHarness::new().await;

    harness
        .server
        .get("/api/users/ghost")
        .await
        .assert_status_not_found();
}
