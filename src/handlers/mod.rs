//! API handlers

pub mod auth;
pub mod health;
pub mod user;
pub mod wallet;

pub use auth::{login, register};
pub use health::{health_check, root};
pub use user::{get_current_user, protected};
pub use wallet::{request_nonce, verify_signature};

// Re-export AuthenticatedUser from middleware for handler use
pub use crate::middleware::auth::AuthenticatedUser;
