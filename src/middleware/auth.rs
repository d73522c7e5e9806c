//! Authentication middleware
//!
//! Extractor for JWT token verification and user extraction.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::{get_user_id_from_claims, AuthService, Claims};
use crate::error::ApiError;
use crate::models::AuthType;

/// Authenticated user extracted from JWT token
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub auth_type: AuthType,
    pub wallet_address: Option<String>,
    pub claims: Claims,
}

/// Extractor for authenticated users
///
/// Rejects with 401 when no bearer token is present and 403 when the
/// token fails signature or expiry checks.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(user: AuthenticatedUser) -> impl IntoResponse {
///     format!("Hello, user {}", user.user_id)
/// }
/// ```
#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    Arc<AuthService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::TokenMissing)?;

        let auth_service = Arc::<AuthService>::from_ref(state);

        let claims = auth_service.verify_token(bearer.token()).map_err(|e| {
            tracing::debug!(error = %e, "Rejected bearer token");
            ApiError::TokenInvalid
        })?;

        let user_id = get_user_id_from_claims(&claims).map_err(|_| ApiError::TokenInvalid)?;

        Ok(AuthenticatedUser {
            user_id,
            auth_type: claims.auth_type,
            wallet_address: claims.wallet_address.clone(),
            claims,
        })
    }
}
