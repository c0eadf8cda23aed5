use axum::{
    extract::Request,
    http::{header, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

#[derive(Debug, Serialize)]
pub struct Health {
    status: &'static str,
    message: &'static str,
    timestamp: String,
}

pub async fn health() -> Json<Health> {
    let timestamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default();
    Json(Health {
        status: "OK",
        message: "Skwela Alert Backend is running",
        timestamp,
    })
}

/// Directory of the public endpoints.
pub async fn index() -> Json<Value> {
    Json(json!({
        "message": "Welcome to Skwela Alert API",
        "status": "running",
        "endpoints": {
            "health": "/api/health",
            "register": "POST /api/auth/register",
            "login": "POST /api/auth/login",
            "adminLogin": "POST /api/auth/admin-login",
            "me": "GET /api/auth/me",
            "users": "GET /api/users",
            "announcements": "GET /api/announcements",
            "createAnnouncement": "POST /api/announcements"
        }
    }))
}

pub async fn not_found(uri: Uri) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": format!("Invalid path: {uri}") })),
    )
}

/// Gives axum's bare 405 the same `{"error": ..}` body as every other failure.
pub async fn method_not_allowed(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let res = next.run(req).await;
    if res.status() != StatusCode::METHOD_NOT_ALLOWED {
        return res;
    }
    let allow = res.headers().get(header::ALLOW).cloned();
    let mut out = (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": format!("Method not allowed: {method} {uri}") })),
    )
        .into_response();
    if let Some(allow) = allow {
        out.headers_mut().insert(header::ALLOW, allow);
    }
    out
}
