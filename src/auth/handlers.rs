use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{instrument, warn};

use crate::{
    auth::{
        claims::{Subject, ROLE_ADMIN},
        dto::{
            AdminDescriptor, AdminLoginRequest, AdminLoginResponse, LoginRequest, LoginResponse,
            MeResponse, RegisterRequest, RegisterResponse,
        },
        extractors::AuthUser,
        jwt::JwtKeys,
        services,
    },
    error::AppError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/admin-login", post(admin_login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let Json(payload) = payload?;
    let user = services::register_user(state.store.as_ref(), payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully",
            user,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(payload) = payload?;
    let keys = JwtKeys::from_ref(&state);
    let (token, user) = services::login_user(state.store.as_ref(), &keys, payload).await?;
    Ok(Json(LoginResponse {
        message: "Login successful",
        token,
        user,
    }))
}

#[instrument(skip(state, payload))]
pub async fn admin_login(
    State(state): State<AppState>,
    payload: Result<Json<AdminLoginRequest>, JsonRejection>,
) -> Result<Json<AdminLoginResponse>, AppError> {
    let Json(payload) = payload?;
    let keys = JwtKeys::from_ref(&state);
    let (token, admin) = services::login_admin(state.store.as_ref(), &keys, payload).await?;
    Ok(Json(AdminLoginResponse {
        message: "Admin login successful",
        token,
        admin,
    }))
}

#[instrument(skip(state, claims))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<MeResponse>, AppError> {
    match claims.subject {
        Subject::Admin { username } if claims.role == ROLE_ADMIN => {
            Ok(Json(MeResponse::Admin(AdminDescriptor {
                id: claims.id,
                username,
                role: ROLE_ADMIN,
            })))
        }
        _ => {
            let user = state
                .store
                .find_user_by_id(claims.id)
                .await
                .map_err(AppError::server("Server error"))?
                .ok_or_else(|| {
                    warn!(user_id = %claims.id, "user not found");
                    AppError::Auth("User not found".into())
                })?;
            Ok(Json(MeResponse::User(user)))
        }
    }
}
