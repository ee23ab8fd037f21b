//! End-to-end tests of the HTTP API over an in-memory store.

use std::sync::Arc;
use std::time::Duration;

use adapters::{App, MemoryStore, Provisioner, UserSaver};
use authgate::auth::{AuthService, Claims, PasswordHasher};
use authgate::config::HashingConfig;
use authgate::errors::{ApiError, Code};
use authgate::router;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::{json, Value};
use tower::ServiceExt;

const APP_ID: i32 = 7;
const APP_SECRET: &str = "test-secret";
const ADMIN_EMAIL: &str = "admin-user@localhost.com";
const TOKEN_TTL: Duration = Duration::from_secs(3600);

struct Harness {
    app: Router,
    admin_id: i64,
}

async fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    store
        .upsert_app(&App {
            id: APP_ID,
            name: "test".into(),
            secret: APP_SECRET.into(),
        })
        .await
        .unwrap();

    let hasher = PasswordHasher::new(&HashingConfig {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    })
    .unwrap();
    let admin_hash = hasher.hash("admin-password").await.unwrap();
    let admin_id = store.save_user(ADMIN_EMAIL, &admin_hash).await.unwrap();
    store.set_admin(ADMIN_EMAIL, true).await.unwrap();

    let auth = AuthService::new(store.clone(), store.clone(), store, hasher, TOKEN_TTL)
        .await
        .unwrap();

    Harness {
        app: router(Arc::new(auth), Duration::from_secs(10)),
        admin_id,
    }
}

async fn post(app: &Router, path: &str, body: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn send_raw(
    app: &Router,
    path: &str,
    content_type: Option<&str>,
    body: &'static str,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method("POST").uri(path);
    if let Some(content_type) = content_type {
        req = req.header(header::CONTENT_TYPE, content_type);
    }
    let resp = app
        .clone()
        .oneshot(req.body(Body::from(body)).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn api_error(body: Value) -> ApiError {
    serde_json::from_value(body).unwrap()
}

async fn register(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
    post(
        app,
        "/api/auth/register",
        json!({ "email": email, "password": password }),
    )
    .await
}

async fn login(app: &Router, email: &str, password: &str, app_id: i32) -> (StatusCode, Value) {
    post(
        app,
        "/api/auth/login",
        json!({ "email": email, "password": password, "app_id": app_id }),
    )
    .await
}

#[tokio::test]
async fn register_then_login_issues_scoped_token() {
    let h = harness().await;

    let (status, body) = register(&h.app, "a@x.com", "p1").await;
    assert_eq!(status, StatusCode::OK);
    let user_id = body["user_id"].as_i64().unwrap();
    assert!(user_id > 0);

    let login_time = chrono::Utc::now().timestamp();
    let (status, body) = login(&h.app, "a@x.com", "p1", APP_ID).await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap();
    assert!(!token.is_empty());

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(APP_SECRET.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .unwrap()
    .claims;
    assert_eq!(claims.user_id, user_id);
    assert_eq!(claims.email, "a@x.com");
    assert_eq!(claims.app_id, APP_ID);
    assert!((claims.exp - (login_time + TOKEN_TTL.as_secs() as i64)).abs() <= 1);
}

#[tokio::test]
async fn double_registration_conflicts_and_keeps_first_account() {
    let h = harness().await;

    let (status, _) = register(&h.app, "dup@x.com", "original").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = register(&h.app, "dup@x.com", "other-password").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        api_error(body),
        ApiError::new(Code::AlreadyExists, "user already exists")
    );

    let (status, _) = login(&h.app, "dup@x.com", "original", APP_ID).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn register_rejects_malformed_input() {
    let h = harness().await;

    let cases = [
        ("", "password1", "email is required"),
        ("this is not an email", "password1", "email is not valid"),
        ("fresh@x.com", "", "password is required"),
    ];

    for (email, password, message) in cases {
        let (status, body) = register(&h.app, email, password).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{email:?}");
        assert_eq!(api_error(body), ApiError::new(Code::InvalidArgument, message));
    }
}

#[tokio::test]
async fn register_with_missing_fields_is_invalid_argument() {
    let h = harness().await;

    let (status, body) = post(&h.app, "/api/auth/register", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(api_error(body).message, "email is required");
}

#[tokio::test]
async fn login_failures_collapse_to_internal() {
    let h = harness().await;

    let cases = [
        ("notexistingemail@incognito.com", "whatever", APP_ID),
        (ADMIN_EMAIL, "wrong-password", APP_ID),
        (ADMIN_EMAIL, "admin-password", 0),
        (ADMIN_EMAIL, "admin-password", 998),
    ];

    for (email, password, app_id) in cases {
        let (status, body) = login(&h.app, email, password, app_id).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{email} {app_id}");
        assert_eq!(api_error(body), ApiError::new(Code::Internal, "internal error"));
    }
}

#[tokio::test]
async fn login_rejects_malformed_input() {
    let h = harness().await;

    let cases = [
        ("", "password1", "email is required"),
        ("this is not an email", "password1", "email is not valid"),
        ("someone@x.com", "", "password is required"),
    ];

    for (email, password, message) in cases {
        let (status, body) = login(&h.app, email, password, APP_ID).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(api_error(body), ApiError::new(Code::InvalidArgument, message));
    }
}

#[tokio::test]
async fn is_admin_reports_flag() {
    let h = harness().await;

    let (_, body) = register(&h.app, "plain@x.com", "p").await;
    let user_id = body["user_id"].as_i64().unwrap();

    let (status, body) = post(&h.app, "/api/auth/is_admin", json!({ "user_id": user_id })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_admin"], json!(false));

    let (status, body) = post(
        &h.app,
        "/api/auth/is_admin",
        json!({ "user_id": h.admin_id }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_admin"], json!(true));
}

#[tokio::test]
async fn is_admin_rejects_empty_and_unknown_ids() {
    let h = harness().await;

    for body in [json!({ "user_id": 0 }), json!({})] {
        let (status, body) = post(&h.app, "/api/auth/is_admin", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            api_error(body),
            ApiError::new(Code::InvalidArgument, "userID is required")
        );
    }

    let (status, body) = post(&h.app, "/api/auth/is_admin", json!({ "user_id": 99_999 })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(api_error(body).message, "internal error");
}

#[tokio::test]
async fn root_answers() {
    let h = harness().await;
    let resp = h
        .app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn undecodable_bodies_are_invalid_argument() {
    let h = harness().await;
    let json = Some("application/json");

    let cases = [
        ("/api/auth/is_admin", json, r#"{"user_id":"abc"}"#),
        (
            "/api/auth/login",
            json,
            r#"{"email":"a@x.com","password":"p","app_id":3000000000}"#,
        ),
        ("/api/auth/register", json, "not json"),
        ("/api/auth/register", Some("text/plain"), r#"{"email":"a@x.com","password":"p"}"#),
        ("/api/auth/register", None, r#"{"email":"a@x.com","password":"p"}"#),
    ];

    for (path, content_type, body) in cases {
        let (status, body) = send_raw(&h.app, path, content_type, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{path} {content_type:?}");
        assert_eq!(
            api_error(body),
            ApiError::new(Code::InvalidArgument, "invalid request body")
        );
    }
}
