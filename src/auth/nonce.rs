//! Challenge nonces and the message wallets are asked to sign

use rand::Rng;

/// Random bytes per nonce (256 bits)
pub const NONCE_BYTES: usize = 32;

/// Generate a hex-encoded nonce from the thread-local CSPRNG
pub fn generate_nonce() -> String {
    let bytes: [u8; NONCE_BYTES] = rand::thread_rng().gen();
    hex::encode(bytes)
}

/// Render the challenge for `nonce`.
///
/// Issuance and verification both call this, so the text a wallet signs is
/// byte-for-byte the text the server later checks.
pub fn challenge_message(app_name: &str, nonce: &str) -> String {
    format!(
        "Welcome to {app_name}! Please sign this message to verify your wallet ownership. Nonce: {nonce}"
    )
}
