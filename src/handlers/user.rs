//! Handlers behind bearer-token authentication

use axum::{extract::State, Json};
use serde::Serialize;

use crate::auth::Claims;
use crate::error::ApiError;
use crate::handlers::AuthenticatedUser;
use crate::models::UserResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProtectedResponse {
    pub message: String,
    pub user: Claims,
}

/// GET /protected - Echo the decoded token claims
pub async fn protected(user: AuthenticatedUser) -> Json<ProtectedResponse> {
    Json(ProtectedResponse {
        message: "This is a protected route".to_string(),
        user: user.claims,
    })
}

/// GET /auth/me - Get current authenticated user
pub async fn get_current_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.auth_service.get_user_by_id(user.user_id).await?;

    Ok(Json(user.into()))
}
