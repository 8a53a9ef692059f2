//! Client tests against a mocked Netta server.

use netta_client::{
    ClientError, FriendshipStatus, NettaClient, NewPost, NotificationKind, Page, Registration,
};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TS: &str = "2026-01-01T12:00:00+00:00";

fn profile(username: &str) -> Value {
    json!({
        "id": "6f1c0b8e-1d5a-4a43-9a41-0c9b7e3f2a10",
        "username": username,
        "full_name": null,
        "bio": null,
        "avatar_url": null,
        "location": null,
        "level": 1,
        "xp": 0,
        "coins": 0,
        "created_at": TS,
        "last_seen": TS
    })
}

fn post_json(id: &str) -> Value {
    json!({
        "id": id,
        "author_id": "6f1c0b8e-1d5a-4a43-9a41-0c9b7e3f2a10",
        "author_username": "alice",
        "content": "hello",
        "image_url": null,
        "is_private": false,
        "likes_count": 0,
        "comments_count": 0,
        "liked": false,
        "created_at": TS
    })
}

fn error_json(code: &str, message: &str) -> Value {
    json!({ "success": false, "error": { "code": code, "message": message } })
}

async fn logged_in(server: &MockServer) -> NettaClient {
    let mut user = profile("alice");
    user["email"] = json!("alice@example.com");
    user["xp_to_next_level"] = json!(100);

    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_json(json!({ "username": "alice", "password": "secret123" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "token": "tok-123",
            "token_type": "Bearer",
            "expires_at": TS,
            "user": user
        })))
        .mount(server)
        .await;

    let mut client = NettaClient::new(server.uri()).unwrap();
    client.login("alice", "secret123").await.unwrap();
    client
}

#[tokio::test]
async fn login_stores_token() {
    let server = MockServer::start().await;
    let client = logged_in(&server).await;

    assert_eq!(client.token(), Some("tok-123"));
}

#[tokio::test]
async fn login_rejected_maps_to_unauthorized() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(error_json("unauthorized", "Authentication required")),
        )
        .mount(&server)
        .await;

    let mut client = NettaClient::new(server.uri()).unwrap();
    let err = client.login("alice", "wrong").await.unwrap_err();

    assert!(matches!(err, ClientError::Unauthorized));
    assert!(client.token().is_none());
}

#[tokio::test]
async fn register_conflict_maps_to_conflict() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/register"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(error_json("conflict", "Username already taken")),
        )
        .mount(&server)
        .await;

    let client = NettaClient::new(server.uri()).unwrap();
    let err = client
        .register(&Registration {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "secret123".to_string(),
            confirm_password: "secret123".to_string(),
        })
        .await
        .unwrap_err();

    match err {
        ClientError::Conflict(message) => assert_eq!(message, "Username already taken"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn create_post_sends_bearer_token() {
    let server = MockServer::start().await;
    let client = logged_in(&server).await;

    Mock::given(method("POST"))
        .and(path("/create_post"))
        .and(header("authorization", "Bearer tok-123"))
        .and(body_json(json!({ "content": "hello", "is_private": false })))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "success": true, "post": post_json("p1") })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let post = client
        .create_post(&NewPost {
            content: "hello".to_string(),
            ..NewPost::default()
        })
        .await
        .unwrap();

    assert_eq!(post.id, "p1");
    assert_eq!(post.author_username, "alice");
}

#[tokio::test]
async fn toggle_like_decodes_progress() {
    let server = MockServer::start().await;
    let client = logged_in(&server).await;

    Mock::given(method("POST"))
        .and(path("/like/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "liked": true,
            "likes_count": 1,
            "xp_awarded": 5,
            "leveled_up": true,
            "level": 2,
            "xp": 0,
            "coins": 50
        })))
        .mount(&server)
        .await;

    let toggle = client.toggle_like("p1").await.unwrap();

    assert!(toggle.liked);
    assert!(toggle.leveled_up);
    assert_eq!(toggle.level, 2);
    assert_eq!(toggle.coins, 50);
}

#[tokio::test]
async fn feed_passes_paging() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("limit", "2"))
        .and(query_param("offset", "4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "posts": [post_json("p5"), post_json("p6")],
            "username": null
        })))
        .mount(&server)
        .await;

    let client = NettaClient::new(server.uri()).unwrap();
    let feed = client.feed(Page::new(2, 4)).await.unwrap();

    assert_eq!(feed.posts.len(), 2);
    assert!(feed.username.is_none());
}

#[tokio::test]
async fn hidden_post_maps_to_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/posts/secret"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(error_json("not_found", "Post not found")),
        )
        .mount(&server)
        .await;

    let client = NettaClient::new(server.uri()).unwrap();
    let err = client.get_post("secret").await.unwrap_err();

    assert!(matches!(err, ClientError::NotFound(message) if message == "Post not found"));
}

#[tokio::test]
async fn forbidden_maps_to_api_error() {
    let server = MockServer::start().await;
    let client = logged_in(&server).await;

    Mock::given(method("DELETE"))
        .and(path("/api/posts/p1"))
        .respond_with(ResponseTemplate::new(403).set_body_json(error_json(
            "forbidden",
            "Only the author can delete a post",
        )))
        .mount(&server)
        .await;

    let err = client.delete_post("p1").await.unwrap_err();

    match err {
        ClientError::Api { code, status, .. } => {
            assert_eq!(code, "forbidden");
            assert_eq!(status, 403);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn non_json_error_body_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let client = NettaClient::new(server.uri()).unwrap();
    let err = client.health().await.unwrap_err();

    assert!(matches!(err, ClientError::Api { status: 502, .. }));
}

#[tokio::test]
async fn respond_sends_accept_flag() {
    let server = MockServer::start().await;
    let client = logged_in(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/friends/bob/respond"))
        .and(body_json(json!({ "accept": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "friendship": {
                "username": "bob",
                "status": "accepted",
                "outgoing": false,
                "updated_at": TS
            }
        })))
        .mount(&server)
        .await;

    let friendship = client.respond_friend_request("bob", true).await.unwrap();

    assert_eq!(friendship.status, FriendshipStatus::Accepted);
    assert!(!friendship.outgoing);
}

#[tokio::test]
async fn notifications_decode_kinds() {
    let server = MockServer::start().await;
    let client = logged_in(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/notifications"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "notifications": [{
                "id": "n1",
                "kind": "like",
                "content": "bob liked your post",
                "reference_id": "p1",
                "is_read": false,
                "created_at": TS
            }],
            "unread_count": 1
        })))
        .mount(&server)
        .await;

    let page = client.notifications(Page::default()).await.unwrap();

    assert_eq!(page.unread_count, 1);
    assert_eq!(page.notifications[0].kind, NotificationKind::Like);
    assert_eq!(page.notifications[0].reference_id.as_deref(), Some("p1"));
}

#[tokio::test]
async fn logout_clears_token() {
    let server = MockServer::start().await;
    let mut client = logged_in(&server).await;

    Mock::given(method("POST"))
        .and(path("/logout"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .mount(&server)
        .await;

    client.logout().await.unwrap();

    assert!(client.token().is_none());
    assert!(matches!(
        client.send_message("bob", "hi").await.unwrap_err(),
        ClientError::NotLoggedIn
    ));
}
