use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    announcements::repo_types::{Announcement, NewAnnouncement},
    auth::{
        password::hash_password,
        repo_types::{Admin, NewUser, User},
    },
};

#[cfg(test)]
pub mod memory;
mod postgres;

pub use postgres::PgStore;

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique column (student id, email, username) already holds the value.
    #[error("unique constraint violated")]
    UniqueViolation,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Persistence for users, admins and announcements.
#[async_trait]
pub trait Store: Send + Sync {
    /// Create the tables if they do not exist yet.
    async fn ensure_schema(&self) -> anyhow::Result<()>;

    async fn find_user_by_student_id_or_email(
        &self,
        student_id: &str,
        email: &str,
    ) -> anyhow::Result<Option<User>>;

    /// Login lookup: `identifier` is either a student id or an email.
    /// A student id match wins over an email match.
    async fn find_user_by_login(&self, identifier: &str) -> anyhow::Result<Option<User>>;

    async fn find_user_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;

    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError>;

    /// Newest first.
    async fn list_users(&self) -> anyhow::Result<Vec<User>>;

    async fn count_users(&self) -> anyhow::Result<i64>;

    async fn find_admin_by_username(&self, username: &str) -> anyhow::Result<Option<Admin>>;

    /// Returns `true` if a row was inserted. An existing admin is left untouched.
    async fn insert_admin_if_absent(&self, username: &str, password_hash: &str)
        -> anyhow::Result<bool>;

    async fn insert_announcement(&self, announcement: NewAnnouncement)
        -> anyhow::Result<Announcement>;

    /// Newest first.
    async fn list_announcements(&self) -> anyhow::Result<Vec<Announcement>>;
}

/// Startup routine: schema plus the default admin account. Failures are
/// logged and the server starts anyway.
pub async fn bootstrap(store: &dyn Store) {
    if let Err(e) = store.ensure_schema().await {
        error!(error = ?e, "failed to initialize database schema");
    }

    let hash = match hash_password(DEFAULT_ADMIN_PASSWORD).await {
        Ok(h) => h,
        Err(e) => {
            error!(error = ?e, "failed to hash default admin password");
            return;
        }
    };

    match store
        .insert_admin_if_absent(DEFAULT_ADMIN_USERNAME, &hash)
        .await
    {
        Ok(true) => info!(username = DEFAULT_ADMIN_USERNAME, "default admin created"),
        Ok(false) => info!(username = DEFAULT_ADMIN_USERNAME, "default admin already present"),
        Err(e) => error!(error = ?e, "failed to seed default admin"),
    }
    info!("database initialized");
}
