//! Routes that require a session token

use axum::{routing::get, Router};

use crate::handlers::user;
use crate::state::AppState;

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/protected", get(user::protected))
        .route("/auth/me", get(user::get_current_user))
}
