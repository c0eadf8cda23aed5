use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{CreateAnnouncementRequest, CreatedAnnouncementResponse},
    repo_types::Announcement,
    services,
};
use crate::{
    auth::extractors::{AdminUser, AuthUser},
    error::AppError,
    state::AppState,
};

// --- public routers ---

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/announcements", get(list_announcements))
}

pub fn write_routes() -> Router<AppState> {
    Router::new().route("/announcements", post(create_announcement))
}

// --- handlers ---

/// Any signed-in user or admin.
#[instrument(skip(state, _caller))]
pub async fn list_announcements(
    State(state): State<AppState>,
    _caller: AuthUser,
) -> Result<Json<Vec<Announcement>>, AppError> {
    let rows = services::list_announcements(state.store.as_ref()).await?;
    Ok(Json(rows))
}

#[instrument(skip(state, admin, payload), fields(admin_id = %admin.0.id))]
pub async fn create_announcement(
    State(state): State<AppState>,
    admin: AdminUser,
    payload: Result<Json<CreateAnnouncementRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedAnnouncementResponse>), AppError> {
    let Json(payload) = payload?;
    let (announcement, recipient_count) =
        services::create_announcement(state.store.as_ref(), payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedAnnouncementResponse {
            message: "Announcement created successfully",
            announcement,
            recipient_count,
        }),
    ))
}
