use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_STUDENT: &str = "student";

/// The role-distinguishing identifier carried next to `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Subject {
    Student {
        #[serde(rename = "studentId")]
        student_id: String,
    },
    Admin {
        username: String,
    },
}

/// JWT payload: `{id, studentId | username, role, iat, exp}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: Uuid,
    #[serde(flatten)]
    pub subject: Subject,
    pub role: String,
    pub iat: usize,
    pub exp: usize,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}
