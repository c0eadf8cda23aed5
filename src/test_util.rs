//! Request helpers for router-level tests.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::{app::build_app, state::AppState};

async fn call(state: &AppState, req: Request<Body>) -> (StatusCode, Value) {
    let res = build_app(state.clone())
        .oneshot(req)
        .await
        .expect("router is infallible");
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX)
        .await
        .expect("read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, body)
}

pub async fn send(
    state: &AppState,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let req = match body {
        Some(body) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => req.body(Body::empty()),
    }
    .expect("valid request");
    call(state, req).await
}

pub async fn send_raw(
    state: &AppState,
    method: Method,
    uri: &str,
    raw: &'static str,
) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(raw))
        .expect("valid request");
    call(state, req).await
}

pub async fn register(
    state: &AppState,
    full_name: &str,
    student_id: &str,
    email: &str,
) -> (StatusCode, Value) {
    send(
        state,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "fullName": full_name,
            "studentId": student_id,
            "email": email,
            "phone": "09170000000",
            "password": "secret123"
        })),
    )
    .await
}

pub async fn register_ana(state: &AppState) -> (StatusCode, Value) {
    register(state, "Ana Cruz", "S-001", "ana@example.com").await
}

/// Token for the user registered by `register_ana`.
pub async fn student_token(state: &AppState) -> String {
    let (status, body) = send(
        state,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "userIdOrEmail": "S-001", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "student login failed: {body}");
    body["token"].as_str().expect("token").to_string()
}

/// Token for the seeded default admin.
pub async fn admin_token(state: &AppState) -> String {
    let (status, body) = send(
        state,
        Method::POST,
        "/api/auth/admin-login",
        None,
        Some(json!({ "username": "admin", "password": "admin123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "admin login failed: {body}");
    body["token"].as_str().expect("token").to_string()
}
