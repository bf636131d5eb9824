//! End-to-end tests for the login flow and bearer-protected routes,
//! driving the full router in-process.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use portcullis::{
    router, seed_admin, AppConfig, AppState, InMemoryUserStore, SigningSecret, TokenCodec,
    UserStore,
};

const TEST_SECRET: [u8; 32] = [7u8; 32];

fn test_state() -> (AppState, Arc<InMemoryUserStore>) {
    let store = Arc::new(InMemoryUserStore::new());
    seed_admin(store.as_ref(), "password").unwrap();

    let config = AppConfig {
        bind_addr: "127.0.0.1:0".into(),
        signing_secret: SigningSecret::from_bytes(TEST_SECRET),
        token_ttl: Duration::hours(1),
        admin_password: "password".into(),
    };
    (AppState::new(config, store.clone()).unwrap(), store)
}

fn test_app() -> (Router, Arc<InMemoryUserStore>) {
    let (state, store) = test_state();
    (router(state), store)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn bearer_request(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

async fn login(app: &Router, username: &str, password: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/login",
            json!({"username": username, "password": password}),
        ))
        .await
        .unwrap();
    let status = response.status();
    (status, body_bytes(response).await)
}

async fn admin_token(app: &Router) -> String {
    let (status, body) = login(app, "admin", "password").await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_public() {
    let (app, _) = test_app();
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_returns_verifiable_token() {
    let (app, _) = test_app();
    let (status, body) = login(&app, "admin", "password").await;
    assert_eq!(status, StatusCode::OK);

    let body: Value = serde_json::from_slice(&body).unwrap();
    // The token is the sole field of the response
    let fields: Vec<&str> = body.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(fields, ["token"]);

    let codec = TokenCodec::new(SigningSecret::from_bytes(TEST_SECRET)).unwrap();
    let claims = codec
        .verify(body["token"].as_str().unwrap(), Utc::now())
        .unwrap();
    assert_eq!(claims.subject(), "admin");
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let (app, _) = test_app();
    let (wrong_pw_status, wrong_pw_body) = login(&app, "admin", "wrong").await;
    let (unknown_status, unknown_body) = login(&app, "nobody", "x").await;

    assert_eq!(wrong_pw_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    // Byte-identical bodies: no username enumeration through error text
    assert_eq!(wrong_pw_body, unknown_body);
}

#[tokio::test]
async fn protected_route_requires_token() {
    let (app, _) = test_app();

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/api/users").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(bearer_request("GET", "/api/users", "not.a.token"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let (app, _) = test_app();
    let codec = TokenCodec::new(SigningSecret::from_bytes(TEST_SECRET)).unwrap();
    let stale = codec
        .mint("admin", Utc::now() - Duration::hours(2), Duration::hours(1))
        .unwrap();

    let response = app
        .oneshot(bearer_request("GET", "/api/users", &stale))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn valid_token_lists_users_without_hashes() {
    let (app, _) = test_app();
    let token = admin_token(&app).await;

    let response = app
        .oneshot(bearer_request("GET", "/api/users", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_bytes(response).await;
    let text = String::from_utf8(body.clone()).unwrap();
    assert!(text.contains("admin"));
    assert!(!text.contains("password_hash"));
    assert!(!text.contains("$argon2"));

    let users: Value = serde_json::from_slice(&body).unwrap();
    let roles = users[0]["roles"].as_array().unwrap();
    assert!(roles.iter().any(|r| r == "ROLE_ADMIN"));
}

#[tokio::test]
async fn token_for_deleted_subject_is_unauthenticated() {
    let (app, store) = test_app();
    let token = admin_token(&app).await;

    // Subject vanishes after issuance; the still-valid token must not
    // authenticate, and must not surface a distinct error either
    store.delete("admin");

    let response = app
        .oneshot(bearer_request("GET", "/api/users", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_get_and_login_as_new_user() {
    let (app, _) = test_app();
    let token = admin_token(&app).await;

    let mut request = json_request(
        "POST",
        "/api/users",
        json!({"username": "alice", "password": "wonderland-tea-party"}),
    );
    request.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {token}").parse().unwrap(),
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let created: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(created["username"], "alice");
    assert!(created["roles"].as_array().unwrap().iter().any(|r| r == "ROLE_USER"));
    assert!(created.get("password_hash").is_none());

    let response = app
        .clone()
        .oneshot(bearer_request("GET", "/api/users/alice", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (status, _) = login(&app, "alice", "wonderland-tea-party").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn duplicate_username_conflicts() {
    let (app, _) = test_app();
    let token = admin_token(&app).await;

    let mut request = json_request(
        "POST",
        "/api/users",
        json!({"username": "admin", "password": "whatever-else"}),
    );
    request.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {token}").parse().unwrap(),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn whitespace_padded_username_is_rejected() {
    let (app, store) = test_app();
    let token = admin_token(&app).await;

    for username in [" admin", "admin ", "  alice"] {
        let mut request = json_request(
            "POST",
            "/api/users",
            json!({"username": username, "password": "irrelevant-here"}),
        );
        request.headers_mut().insert(
            header::AUTHORIZATION,
            format!("Bearer {token}").parse().unwrap(),
        );
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{username:?}");
        assert!(store.find_by_username(username).is_none());
    }
}

#[tokio::test]
async fn unknown_user_is_404() {
    let (app, _) = test_app();
    let token = admin_token(&app).await;

    let response = app
        .oneshot(bearer_request("GET", "/api/users/ghost", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_requires_admin_role() {
    let (app, store) = test_app();
    let admin = admin_token(&app).await;

    // Provision a plain user through the API, then act as them
    let mut request = json_request(
        "POST",
        "/api/users",
        json!({"username": "bob", "password": "builder-yes-we-can"}),
    );
    request.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {admin}").parse().unwrap(),
    );
    assert_eq!(
        app.clone().oneshot(request).await.unwrap().status(),
        StatusCode::CREATED
    );

    let (status, body) = login(&app, "bob", "builder-yes-we-can").await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    let bob = body["token"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(bearer_request("DELETE", "/api/users/admin", bob))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(store.find_by_username("admin").is_some());

    let response = app
        .oneshot(bearer_request("DELETE", "/api/users/bob", &admin))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(store.find_by_username("bob").is_none());
}
