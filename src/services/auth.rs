//! Auth services - Registration, login and logout

use crate::core::auth::{cleared_session_cookie, session_cookie};
use crate::core::{AppError, AppState, encode_jwt};
use crate::dtos::{CreateUserDTO, LoginDTO, RegisterRequestDTO, UserDTO};
use crate::entities::{User, UserRole};
use crate::repositories::Create;
use axum::{
    extract::{Json, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[instrument(skip(state, body))]
pub async fn login_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginDTO>,
) -> Result<impl IntoResponse, AppError> {
    let email = normalize_email(&body.email);
    if email.is_empty() || body.password.is_empty() {
        return Err(AppError::unauthorized("Invalid email or password"));
    }

    // unknown email and wrong password look the same to the client
    let user = match state.user.find_by_email(&email).await? {
        Some(user) if user.verify_password(&body.password) => user,
        _ => {
            warn!("Failed login attempt");
            return Err(AppError::unauthorized("Invalid email or password"));
        }
    };

    let token = encode_jwt(&user, &state.jwt_secret, state.jwt_ttl_hours)?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        HeaderValue::from_str(&session_cookie(&token, state.jwt_ttl_hours))
            .map_err(|_| AppError::internal_server_error("Failed to build session cookie"))?,
    );
    headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| AppError::internal_server_error("Failed to build authorization header"))?,
    );

    info!("User {} logged in", user.user_id);
    Ok((StatusCode::OK, headers, Json(UserDTO::from(user))))
}

#[instrument(skip(state, body))]
pub async fn register_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterRequestDTO>,
) -> Result<(StatusCode, Json<UserDTO>), AppError> {
    body.validate()?;

    if body.role == UserRole::Admin {
        return Err(AppError::forbidden("Admin accounts cannot be registered"));
    }

    let email = normalize_email(&body.email);
    if state.user.find_by_email(&email).await?.is_some() {
        debug!("Email already registered");
        return Err(AppError::conflict("Email already registered"));
    }

    let new_user = CreateUserDTO {
        name: body.name.trim().to_string(),
        email,
        password: User::hash_password(&body.password)?,
        role: body.role,
        phone: body.phone,
    };

    let created_user = state.user.create(&new_user).await?;
    info!("User {} registered as {:?}", created_user.user_id, created_user.role);

    Ok((StatusCode::CREATED, Json(UserDTO::from(created_user))))
}

pub async fn logout_user() -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, cleared_session_cookie())],
    )
}
