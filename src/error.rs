use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Every failure a handler can produce. The routing layer turns these into
/// `{"error": "..."}` bodies; nothing below the message reaches the client.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Auth(String),
    #[error("Invalid or expired token")]
    InvalidOrExpiredToken,
    #[error("{0}")]
    Forbidden(String),
    #[error("{message}")]
    Server {
        message: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    /// `map_err` adapter for unexpected store/library failures.
    pub fn server<E: Into<anyhow::Error>>(message: &'static str) -> impl FnOnce(E) -> Self {
        move |e| Self::Server {
            message,
            source: e.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::Auth(_) | AppError::InvalidOrExpiredToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Server { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Server { message, source } = &self {
            error!(error = ?source, "{message}");
        }
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
