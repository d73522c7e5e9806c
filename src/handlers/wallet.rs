//! Wallet challenge-response handlers

use axum::{extract::State, Json};

use crate::error::{ApiError, ApiJson};
use crate::models::{
    NonceRequest, NonceResponse, WalletLoginResponse, WalletUserSummary, WalletVerifyRequest,
};
use crate::state::AppState;

/// POST /auth/wallet/nonce - Issue a fresh challenge for a wallet
pub async fn request_nonce(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<NonceRequest>,
) -> Result<Json<NonceResponse>, ApiError> {
    let challenge = state
        .auth_service
        .issue_nonce(req.wallet_address.trim())
        .await?;

    Ok(Json(challenge))
}

/// POST /auth/wallet/verify - Verify the signed challenge and issue a token
pub async fn verify_signature(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<WalletVerifyRequest>,
) -> Result<Json<WalletLoginResponse>, ApiError> {
    let success = state
        .auth_service
        .verify_wallet(
            req.wallet_address.trim(),
            &req.signature,
            req.name.as_deref(),
        )
        .await?;

    let wallet_address = success
        .user
        .wallet_address()
        .ok_or_else(|| ApiError::InternalError("wallet login for non-wallet user".to_string()))?
        .to_string();

    Ok(Json(WalletLoginResponse {
        token: success.token,
        user: WalletUserSummary {
            id: success.user.id,
            name: success.user.name,
            wallet_address,
        },
    }))
}
