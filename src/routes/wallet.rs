//! Wallet challenge-response routes

use axum::{routing::post, Router};

use crate::handlers::wallet;
use crate::state::AppState;

/// Create wallet authentication routes
///
/// The `/auth/metamask/*` paths are kept for clients built against them.
pub fn wallet_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/wallet/nonce", post(wallet::request_nonce))
        .route("/auth/wallet/verify", post(wallet::verify_signature))
        .route("/auth/metamask/nonce", post(wallet::request_nonce))
        .route("/auth/metamask/verify", post(wallet::verify_signature))
}
