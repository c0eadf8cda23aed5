use tracing::{info, warn};

use super::{
    dto::CreateAnnouncementRequest,
    repo_types::{Announcement, NewAnnouncement, DEFAULT_KIND, DEFAULT_POSTED_BY},
};
use crate::{
    auth::services::{check_len, present},
    db::Store,
    error::AppError,
};

const FAILED: &str = "Server error";

/// Stores the announcement and reports how many users it would reach.
pub async fn create_announcement(
    store: &dyn Store,
    req: CreateAnnouncementRequest,
) -> Result<(Announcement, i64), AppError> {
    // Stored as written; whitespace-only counts as missing.
    let message = req.message.filter(|m| !m.trim().is_empty());
    let (Some(title), Some(message)) = (present(req.title), message) else {
        warn!("announcement without title or message");
        return Err(AppError::Validation(
            "Title and message are required".into(),
        ));
    };
    let kind = present(req.kind).unwrap_or_else(|| DEFAULT_KIND.to_string());
    let posted_by = present(req.posted_by).unwrap_or_else(|| DEFAULT_POSTED_BY.to_string());

    check_len("Title", &title, 255)?;
    check_len("Type", &kind, 50)?;
    check_len("Posted by", &posted_by, 255)?;

    let announcement = store
        .insert_announcement(NewAnnouncement {
            title,
            message,
            kind,
            posted_by,
        })
        .await
        .map_err(AppError::server(FAILED))?;

    let recipient_count = store.count_users().await.map_err(AppError::server(FAILED))?;

    info!(
        announcement_id = %announcement.id,
        kind = %announcement.kind,
        recipient_count,
        "announcement created"
    );
    Ok((announcement, recipient_count))
}

pub async fn list_announcements(store: &dyn Store) -> Result<Vec<Announcement>, AppError> {
    store
        .list_announcements()
        .await
        .map_err(AppError::server(FAILED))
}
