//! Friendship integration tests.

mod common;

use axum::http::StatusCode;
use common::TestHarness;
use serde_json::{json, Value};

fn usernames(body: &Value) -> Vec<String> {
    body["users"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["username"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn request_and_accept_is_symmetric() {
    let harness = TestHarness::new().await;
    let alice = harness.user("alice").await;
    let bob = harness.user("bob").await;

    let response = harness
        .server
        .post("/api/friends/bob")
        .add_header("authorization", alice.auth())
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["friendship"]["status"], "pending");
    assert_eq!(body["friendship"]["outgoing"], true);

    let requests: Value = harness
        .server
        .get("/api/friends/requests")
        .add_header("authorization", bob.auth())
        .await
        .json();
    assert_eq!(usernames(&requests), ["alice"]);

    let accepted: Value = harness
        .server
        .post("/api/friends/alice/respond")
        .add_header("authorization", bob.auth())
        .json(&json!({ "accept": true }))
        .await
        .json();
    assert_eq!(accepted["friendship"]["status"], "accepted");

    for (user, friend) in [(&alice, "bob"), (&bob, "alice")] {
        let friends: Value = harness
            .server
            .get("/api/friends")
            .add_header("authorization", user.auth())
            .await
            .json();
        assert_eq!(usernames(&friends), [friend]);
    }

    let profile: Value = harness
        .server
        .get("/api/users/bob")
        .add_header("authorization", alice.auth())
        .await
        .json();
    assert_eq!(profile["is_friend"], true);
}

#[tokio::test]
async fn requester_cannot_accept_own_request() {
    let harness = TestHarness::new().await;
    let alice = harness.user("alice").await;
    harness.user("bob").await;

    harness
        .server
        .post("/api/friends/bob")
        .add_header("authorization", alice.auth())
        .await
        .assert_status_ok();

    harness
        .server
        .post("/api/friends/bob/respond")
        .add_header("authorization", alice.auth())
        .json(&json!({ "accept": true }))
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn duplicate_request_conflicts() {
    let harness = TestHarness::new().await;
    let alice = harness.user("alice").await;
    let bob = harness.user("bob").await;
    harness.befriend(&alice, &bob).await;

    let response = harness
        .server
        .post("/api/friends/bob")
        .add_header("authorization", alice.auth())
        .await;
    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn self_request_is_rejected() {
    let harness = TestHarness::new().await;
    let alice = harness.user("alice").await;

    harness
        .server
        .post("/api/friends/alice")
        .add_header("authorization", alice.auth())
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn request_to_unknown_user_is_not_found() {
    let harness = TestHarness::new().await;
    let alice = harness.user("alice").await;

    harness
        .server
        .post("/api/friends/ghost")
        .add_header("authorization", alice.auth())
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn rejected_request_can_be_resent() {
    let harness = TestHarness::new().await;
    let alice = harness.user("alice").await;
    let bob = harness.user("bob").await;

    harness
        .server
        .post("/api/friends/bob")
        .add_header("authorization", alice.auth())
        .await
        .assert_status_ok();

    let rejected: Value = harness
        .server
        .post("/api/friends/alice/respond")
        .add_header("authorization", bob.auth())
        .json(&json!({ "accept": false }))
        .await
        .json();
    assert_eq!(rejected["friendship"]["status"], "rejected");

    let again: Value = harness
        .server
        .post("/api/friends/bob")
        .add_header("authorization", alice.auth())
        .await
        .json();
    assert_eq!(again["friendship"]["status"], "pending");
}

#[tokio::test]
async fn block_then_unblock() {
    let harness = TestHarness::new().await;
    let alice = harness.user("alice").await;
    let bob = harness.user("bob").await;
    harness.befriend(&alice, &bob).await;

    let blocked: Value = harness
        .server
        .post("/api/friends/alice/block")
        .add_header("authorization", bob.auth())
        .await
        .json();
    assert_eq!(blocked["friendship"]["status"], "blocked");
    assert_eq!(blocked["friendship"]["outgoing"], true);

    let friends: Value = harness
        .server
        .get("/api/friends")
        .add_header("authorization", alice.auth())
        .await
        .json();
    assert!(usernames(&friends).is_empty());

    harness
        .server
        .post("/api/friends/bob")
        .add_header("authorization", alice.auth())
        .await
        .assert_status(StatusCode::FORBIDDEN);
    harness
        .server
        .delete("/api/friends/bob")
        .add_header("authorization", alice.auth())
        .await
        .assert_status(StatusCode::FORBIDDEN);

    harness
        .server
        .delete("/api/friends/alice")
        .add_header("authorization", bob.auth())
        .await
        .assert_status_ok();

    harness
        .server
        .post("/api/friends/bob")
        .add_header("authorization", alice.auth())
        .await
        .assert_status_ok();
}
