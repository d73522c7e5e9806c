//! Real Estate DApp Auth Server Library
//!
//! Email/password and wallet-signature authentication for the listing
//! frontend. Successful logins of either kind yield a 24h session token.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
