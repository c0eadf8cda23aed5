use axum::{extract::State, routing::get, Json, Router};
use tracing::{debug, instrument};

use crate::{
    auth::{extractors::AdminUser, repo_types::User},
    error::AppError,
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/users", get(list_users))
}

/// All registered users, newest first. Admin only.
#[instrument(skip(state, _admin))]
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<User>>, AppError> {
    let users = state
        .store
        .list_users()
        .await
        .map_err(AppError::server("Server error"))?;
    debug!(count = users.len(), "listed users");
    Ok(Json(users))
}
