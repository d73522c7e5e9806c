//! Route definitions

mod auth;
mod user;
mod wallet;

use axum::{extract::Request, middleware::Next, routing::get, Router};

use crate::handlers::{health_check, root};
use crate::middleware::{self, RateLimiter};
use crate::state::AppState;

pub use auth::auth_routes;
pub use user::user_routes;
pub use wallet::wallet_routes;

/// Assemble the full application router with its middleware stack
pub fn build_router(state: AppState, rate_limiter: RateLimiter) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .merge(auth_routes())
        .merge(wallet_routes())
        .merge(user_routes())
        .with_state(state)
        .layer(axum::middleware::from_fn(middleware::security_headers))
        .layer(axum::middleware::from_fn(middleware::request_tracing))
        .layer(axum::middleware::from_fn(move |req: Request, next: Next| {
            let limiter = rate_limiter.clone();
            middleware::rate_limit_layer(limiter)(req, next)
        }))
}
