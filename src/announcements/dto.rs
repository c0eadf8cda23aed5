use serde::{Deserialize, Serialize};

use super::repo_types::Announcement;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAnnouncementRequest {
    pub title: Option<String>,
    pub message: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub posted_by: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedAnnouncementResponse {
    pub message: &'static str,
    pub announcement: Announcement,
    /// Users registered at creation time. Nothing is delivered to them.
    pub recipient_count: i64,
}
