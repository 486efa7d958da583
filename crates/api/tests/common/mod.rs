//! Shared helpers for HTTP integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use tidyhome_api::auth::jwt::{generate_access_token, JwtConfig};
use tidyhome_api::auth::password::hash_password;
use tidyhome_api::config::ServerConfig;
use tidyhome_api::routes;
use tidyhome_api::state::AppState;
use tidyhome_core::roles::Role;
use tidyhome_db::models::user::{CreateUser, User};
use tidyhome_db::repositories::UserRepo;

pub const TEST_PASSWORD: &str = "test_password_123!";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: String::new(),
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "integration-test-secret-long-enough".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// Build the full application router with all middleware layers.
///
/// Mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack production uses.
pub fn build_test_app(pool: PgPool) -> Router {
    let state = AppState {
        pool,
        config: Arc::new(test_config()),
    };

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:5173".parse().unwrap()])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Users and tokens
// ---------------------------------------------------------------------------

/// Insert a user with [`TEST_PASSWORD`].
pub async fn create_user(pool: &PgPool, name: &str, role: Role) -> User {
    let input = CreateUser {
        full_name: name.to_string(),
        email: format!("{}@tidyhome.test", name.to_lowercase()),
        phone: None,
        password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
        role,
    };
    UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed")
}

/// Mint an access token for `user` with the test JWT secret.
pub fn token_for(user: &User) -> String {
    let role = user.parsed_role().expect("seeded users have known roles");
    generate_access_token(user.id, role, &test_config().jwt).expect("token generation")
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request should build");
    app.oneshot(request).await.expect("router is infallible")
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

// ---------------------------------------------------------------------------
// Assignment fixtures
// ---------------------------------------------------------------------------

/// Create a pending assignment through the API and return its id.
pub async fn create_assignment(app: Router, admin_token: &str, service_type: &str) -> i64 {
    let body = serde_json::json!({
        "address": "12 Sadovaya St, apt 4",
        "client_name": "Irina Petrova",
        "client_phone": "+7 900 123 45 67",
        "service_type": service_type,
        "area": 50,
        "scheduled_date": "2026-04-01",
        "scheduled_time": "10:00:00",
    });
    let response = post_json_auth(app, "/api/v1/assignments", admin_token, body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"]
        .as_i64()
        .expect("created assignment has an id")
}

/// Updates that check every item of a checklist JSON value.
pub fn all_checked(checklist: &serde_json::Value) -> serde_json::Value {
    let items: Vec<serde_json::Value> = checklist["items"]
        .as_array()
        .expect("checklist has items")
        .iter()
        .map(|item| serde_json::json!({ "id": item["id"], "checked": true }))
        .collect();
    serde_json::Value::Array(items)
}

/// Drive a fresh assignment to `completed`: assign, start, photo, check
/// everything, complete. Returns the final assignment JSON.
pub async fn complete_assignment(
    app: Router,
    id: i64,
    admin_token: &str,
    maid_token: &str,
    assign_body: serde_json::Value,
) -> serde_json::Value {
    let base = format!("/api/v1/assignments/{id}");

    let response =
        post_json_auth(app.clone(), &format!("{base}/assign"), admin_token, assign_body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let assigned = body_json(response).await;

    let response = post_json_auth(
        app.clone(),
        &format!("{base}/status"),
        maid_token,
        serde_json::json!({ "status": "in_progress" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json_auth(
        app.clone(),
        &format!("{base}/photos"),
        maid_token,
        serde_json::json!({ "after": "https://cdn.tidyhome.test/after.jpg" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let items = all_checked(&assigned["data"]["checklist"]);
    let response = put_json_auth(
        app.clone(),
        &format!("{base}/checklist"),
        maid_token,
        serde_json::json!({ "items": items }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json_auth(
        app,
        &format!("{base}/status"),
        maid_token,
        serde_json::json!({ "status": "completed" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}
