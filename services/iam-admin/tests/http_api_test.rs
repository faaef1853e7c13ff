//! HTTP 路由测试（tower oneshot，内存存储）

mod common;

use std::sync::Arc;

use admin_config::PermissionSource;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
};
use common::{InMemoryStore, app_state, create_role, create_user, ctx, hasher, login_with_permissions};
use iam_admin::api::http::router;
use iam_admin::application::{SystemAccount, seed_system};
use secrecy::Secret;
use serde_json::{Value, json};
use tower::ServiceExt;

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

fn send_json(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn setup(source: PermissionSource) -> (Arc<InMemoryStore>, Router) {
    let store = InMemoryStore::new();
    let app = router(app_state(&store, source));
    (store, app)
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let (_, app) = setup(PermissionSource::Token).await;

    let response = app.clone().oneshot(get("/users/search", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/problem+json"
    );

    let response = app
        .oneshot(get("/users/search", Some("not.a.jwt")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_endpoint() {
    let store = InMemoryStore::new();
    let state = app_state(&store, PermissionSource::Token);
    let token = login_with_permissions(&state, "http@example.com", &["users:read"]).await;
    assert!(!token.is_empty());
    let app = router(state);

    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/auth/login",
            None,
            json!({"email": "http@example.com", "password": common::DEFAULT_PASSWORD}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["access_token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 3600);

    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/auth/login",
            None,
            json!({"email": "http@example.com", "password": "wrong-password"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["status"], 401);

    let response = app
        .oneshot(send_json("POST", "/auth/login", None, json!({"email": "x"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_me_returns_caller_identity() {
    let store = InMemoryStore::new();
    let state = app_state(&store, PermissionSource::Token);
    let token = login_with_permissions(&state, "me@example.com", &["users:read"]).await;
    let app = router(state);

    let response = app.oneshot(get("/auth/me", Some(&token))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["email"], "me@example.com");
    assert_eq!(body["permissions"], json!(["users:read"]));
    assert!(body["expiresAt"].is_i64());
}

#[tokio::test]
async fn test_guard_denies_missing_permission() {
    let store = InMemoryStore::new();
    let state = app_state(&store, PermissionSource::Token);
    let token = login_with_permissions(&state, "reader@example.com", &["users:read"]).await;
    let app = router(state);

    let response = app
        .clone()
        .oneshot(get("/roles/search", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert!(body["detail"].as_str().unwrap().contains("roles:read"));

    let response = app
        .oneshot(send_json(
            "DELETE",
            "/users",
            Some(&token),
            json!({"ids": []}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_search_response_shape() {
    let store = InMemoryStore::new();
    let state = app_state(&store, PermissionSource::Token);
    let token = login_with_permissions(&state, "searcher@example.com", &["users:read"]).await;
    create_user(&state, "other@example.com", vec![]).await;
    let app = router(state);

    let response = app
        .clone()
        .oneshot(get(
            "/users/search?value=example&page=1&limit=1&sortField=email&sortOrder=ASC",
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["page"], 1);
    assert_eq!(body["limit"], 1);
    assert_eq!(body["totalPages"], 2);
    assert_eq!(body["users"][0]["email"], "other@example.com");
    assert!(body["users"][0].get("password").is_none());

    let response = app
        .clone()
        .oneshot(get("/users/search?sortField=password", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(get("/users/search?limit=501", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let (_, app) = setup(PermissionSource::Token).await;

    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "req-123")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("x-request-id").unwrap(), "req-123");

    let response = app.oneshot(get("/health", None)).await.unwrap();
    let generated = response.headers().get("x-request-id").unwrap().to_str().unwrap();
    assert!(uuid::Uuid::parse_str(generated).is_ok());
}

#[tokio::test]
async fn test_metrics_without_exporter() {
    let (_, app) = setup(PermissionSource::Token).await;
    let response = app.oneshot(get("/metrics", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_root_permission_passes_every_guard() {
    let store = InMemoryStore::new();
    let state = app_state(&store, PermissionSource::Token);
    let account = SystemAccount {
        email: "root@example.com".to_string(),
        password: Secret::new("root-password".to_string()),
        first_name: "Root".to_string(),
        last_name: "User".to_string(),
    };
    seed_system(&ctx(), store.as_ref(), hasher().as_ref(), &account)
        .await
        .unwrap();
    let token = state
        .auth
        .login(&ctx(), "root@example.com", "root-password")
        .await
        .unwrap()
        .access_token;
    let app = router(state);

    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/departments",
            Some(&token),
            json!({"name": "Finance", "country": "US"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["name"], "Finance");

    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/departments",
            Some(&token),
            json!({"name": "Finance", "country": "DE"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .clone()
        .oneshot(send_json(
            "PATCH",
            "/roles/not-a-uuid",
            Some(&token),
            json!({"name": "Renamed"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(send_json(
            "DELETE",
            "/user-roles",
            Some(&token),
            json!({"userIds": [], "roleIds": []}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"unassigned": false}));
}

#[tokio::test]
async fn test_store_source_sees_revoked_roles() {
    let store = InMemoryStore::new();
    let token_state = app_state(&store, PermissionSource::Token);
    let token = login_with_permissions(&token_state, "revoked@example.com", &["users:read"]).await;
    let role = token_state
        .roles
        .search(&ctx(), Default::default())
        .await
        .unwrap()
        .items
        .remove(0);
    let user = token_state
        .users
        .find_by_email(&ctx(), "revoked@example.com")
        .await
        .unwrap();

    token_state
        .user_roles
        .unassign_role_from_user(&ctx(), &[user.id], &[role.id])
        .await
        .unwrap();

    // 令牌中的权限仍然有效
    let response = router(token_state)
        .oneshot(get("/users/search", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // 按存储重新解析时已无权限
    let store_app = router(app_state(&store, PermissionSource::Store));
    let response = store_app
        .oneshot(get("/users/search", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_create_user_roles_defaults_assigner_to_caller() {
    let store = InMemoryStore::new();
    let state = app_state(&store, PermissionSource::Token);
    let token =
        login_with_permissions(&state, "assigner@example.com", &["user_roles:create"]).await;
    let caller = state
        .users
        .find_by_email(&ctx(), "assigner@example.com")
        .await
        .unwrap();
    let target = create_user(&state, "target@example.com", vec![]).await;
    let role = create_role(&state, "Target role", &[]).await;
    let app = router(state);

    let response = app
        .oneshot(send_json(
            "POST",
            "/user-roles",
            Some(&token),
            json!({"userId": target.id, "roleIds": [role.id]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body[0]["assignedBy"], json!(caller.id));
    assert_eq!(body[0]["roleId"], json!(role.id));
}
