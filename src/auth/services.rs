use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::{
    auth::{
        claims::{Subject, ROLE_ADMIN},
        dto::{AdminDescriptor, AdminLoginRequest, LoginRequest, RegisterRequest},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo_types::{NewUser, User},
    },
    db::{Store, StoreError},
    error::AppError,
};

const INVALID_CREDENTIALS: &str = "Invalid credentials";
const INVALID_ADMIN_CREDENTIALS: &str = "Invalid admin credentials";

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Trimmed value, or `None` when absent or blank.
pub(crate) fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn check_len(field: &str, value: &str, max: usize) -> Result<(), AppError> {
    if value.chars().count() > max {
        return Err(AppError::Validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

pub async fn register_user(store: &dyn Store, req: RegisterRequest) -> Result<User, AppError> {
    const FAILED: &str = "Server error during registration";

    let (Some(full_name), Some(student_id), Some(email), Some(phone), Some(password)) = (
        present(req.full_name),
        present(req.student_id),
        present(req.email),
        present(req.phone),
        req.password.filter(|p| !p.is_empty()),
    ) else {
        warn!("registration with missing fields");
        return Err(AppError::Validation("All fields are required".into()));
    };

    let email = email.to_lowercase();
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::Validation("Invalid email".into()));
    }
    check_len("Full name", &full_name, 255)?;
    check_len("Student ID", &student_id, 100)?;
    check_len("Email", &email, 255)?;
    check_len("Phone", &phone, 20)?;

    // Friendly early exit; the unique constraints decide the race below.
    let existing = store
        .find_user_by_student_id_or_email(&student_id, &email)
        .await
        .map_err(AppError::server(FAILED))?;
    if existing.is_some() {
        warn!(student_id = %student_id, email = %email, "user already exists");
        return Err(AppError::Conflict("User already exists".into()));
    }

    let password_hash = hash_password(&password)
        .await
        .map_err(AppError::server(FAILED))?;

    let new_user = NewUser {
        full_name,
        student_id,
        email,
        phone,
        password_hash,
    };
    match store.insert_user(new_user).await {
        Ok(user) => {
            info!(user_id = %user.id, student_id = %user.student_id, "user registered");
            Ok(user)
        }
        Err(StoreError::UniqueViolation) => {
            warn!("user already exists (unique constraint)");
            Err(AppError::Conflict("User already exists".into()))
        }
        Err(StoreError::Other(e)) => Err(AppError::server(FAILED)(e)),
    }
}

/// Returns the session token and the stored user.
pub async fn login_user(
    store: &dyn Store,
    keys: &JwtKeys,
    req: LoginRequest,
) -> Result<(String, User), AppError> {
    const FAILED: &str = "Server error during login";

    let (Some(identifier), Some(password)) = (
        present(req.user_id_or_email),
        req.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::Validation(
            "User ID/email and password are required".into(),
        ));
    };

    let user = match store
        .find_user_by_login(&identifier)
        .await
        .map_err(AppError::server(FAILED))?
    {
        Some(u) => u,
        None => {
            warn!(identifier = %identifier, "login unknown identifier");
            return Err(AppError::Auth(INVALID_CREDENTIALS.into()));
        }
    };

    if !verify_password(&password, &user.password_hash)
        .await
        .map_err(AppError::server(FAILED))?
    {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::Auth(INVALID_CREDENTIALS.into()));
    }

    let subject = Subject::Student {
        student_id: user.student_id.clone(),
    };
    let token = keys
        .sign(user.id, subject, &user.role)
        .map_err(AppError::server(FAILED))?;

    info!(user_id = %user.id, "user logged in");
    Ok((token, user))
}

pub async fn login_admin(
    store: &dyn Store,
    keys: &JwtKeys,
    req: AdminLoginRequest,
) -> Result<(String, AdminDescriptor), AppError> {
    const FAILED: &str = "Server error during admin login";

    let (Some(username), Some(password)) =
        (present(req.username), req.password.filter(|p| !p.is_empty()))
    else {
        return Err(AppError::Validation(
            "Username and password are required".into(),
        ));
    };

    let admin = match store
        .find_admin_by_username(&username)
        .await
        .map_err(AppError::server(FAILED))?
    {
        Some(a) => a,
        None => {
            warn!(username = %username, "admin login unknown username");
            return Err(AppError::Auth(INVALID_ADMIN_CREDENTIALS.into()));
        }
    };

    if !verify_password(&password, &admin.password_hash)
        .await
        .map_err(AppError::server(FAILED))?
    {
        warn!(admin_id = %admin.id, "admin login invalid password");
        return Err(AppError::Auth(INVALID_ADMIN_CREDENTIALS.into()));
    }

    let subject = Subject::Admin {
        username: admin.username.clone(),
    };
    let token = keys
        .sign(admin.id, subject, ROLE_ADMIN)
        .map_err(AppError::server(FAILED))?;

    info!(admin_id = %admin.id, "admin logged in");
    Ok((
        token,
        AdminDescriptor {
            id: admin.id,
            username: admin.username,
            role: ROLE_ADMIN,
        },
    ))
}
