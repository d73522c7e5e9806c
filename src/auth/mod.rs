//! Authentication module
//!
//! Two ways in, one session token out:
//! - Email/password with bcrypt-hashed passwords
//! - Wallet challenge-response: nonce, `personal_sign`, signer recovery
//! - JWT token generation and validation

pub mod crypto;
mod jwt;
mod nonce;
mod service;

pub use crypto::{recover_address, sign_personal_message, verify_wallet_signature};
pub use jwt::{
    generate_token, generate_token_at, get_user_id_from_claims, verify_token, verify_token_at,
    Claims, JwtError, DEFAULT_TOKEN_TTL_SECONDS,
};
pub use nonce::{challenge_message, generate_nonce};
pub use service::{AuthError, AuthService, AuthSuccess};
