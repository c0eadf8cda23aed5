use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo_types::User;

/// Request body for student registration. Every field is required; they are
/// optional here so a missing one becomes a validation error instead of a
/// deserialisation failure.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub full_name: Option<String>,
    pub student_id: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
}

/// Request body for student login; the identifier is a student id or an email.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub user_id_or_email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AdminLoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: &'static str,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct AdminLoginResponse {
    pub message: &'static str,
    pub token: String,
    pub admin: AdminDescriptor,
}

/// Public part of an admin returned to the client.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AdminDescriptor {
    pub id: Uuid,
    pub username: String,
    pub role: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum MeResponse {
    User(User),
    Admin(AdminDescriptor),
}
