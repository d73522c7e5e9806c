//! Email/password authentication handlers

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::error::{ApiError, ApiJson, MessageError};
use crate::models::{
    EmailUserSummary, LoginRequest, LoginResponse, MessageResponse, RegisterRequest,
};
use crate::state::AppState;

/// POST /register - Create an email/password account
pub async fn register(
    State(state): State<AppState>,
    payload: Result<ApiJson<RegisterRequest>, ApiError>,
) -> Result<(StatusCode, Json<MessageResponse>), MessageError> {
    let ApiJson(req) = payload?;
    req.validate()?;

    state
        .auth_service
        .register(req.name.trim(), req.email.trim(), &req.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User created successfully".to_string(),
        }),
    ))
}

/// POST /login - Exchange email/password for a session token
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let success = state
        .auth_service
        .login(req.email.trim(), &req.password)
        .await?;

    let email = success
        .user
        .email()
        .ok_or_else(|| ApiError::InternalError("email login for non-email user".to_string()))?
        .to_string();

    Ok(Json(LoginResponse {
        token: success.token,
        user: EmailUserSummary {
            id: success.user.id,
            name: success.user.name,
            email,
        },
    }))
}
