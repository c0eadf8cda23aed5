use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Registered student record.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub student_id: String,           // unique
    pub email: String,                // unique, stored lowercase
    pub phone: String,
    #[serde(skip_serializing)]
    pub password_hash: String,        // bcrypt digest, never exposed in JSON
    pub role: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Fields needed to insert a user; the store fills in role and timestamp.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub student_id: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct Admin {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
}
