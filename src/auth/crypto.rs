//! Ethereum wallet signature verification
//!
//! Recovers the signer of an EIP-191 `personal_sign` message, the format
//! browser wallets produce, and compares it with a claimed address.

use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use sha3::{Digest, Keccak256};
use thiserror::Error;

/// Errors that can occur during signature verification
#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Invalid wallet address format: {0}")]
    InvalidAddressFormat(String),

    #[error("Invalid signature format: {0}")]
    InvalidSignatureFormat(String),

    #[error("Invalid recovery id: {0}")]
    InvalidRecoveryId(u8),

    #[error("Could not recover signer from signature")]
    RecoveryFailed,

    #[error("Signature was made by {recovered}, not the claimed wallet")]
    SignerMismatch { recovered: String },
}

/// Check that `address` is `0x` followed by 40 hex digits (any case)
pub fn is_valid_address(address: &str) -> bool {
    address
        .strip_prefix("0x")
        .is_some_and(|hex| hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Hash a message the way `personal_sign` does:
/// `keccak256("\x19Ethereum Signed Message:\n" + len + message)`
pub fn eip191_hash(message: &str) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(format!("\x19Ethereum Signed Message:\n{}", message.len()).as_bytes());
    hasher.update(message.as_bytes());
    hasher.finalize().into()
}

/// Derive the lowercase `0x` address of a secp256k1 public key
pub fn address_from_key(key: &VerifyingKey) -> String {
    let point = key.to_encoded_point(false);
    // Skip the 0x04 uncompressed-point tag
    let hash = Keccak256::digest(&point.as_bytes()[1..]);
    format!("0x{}", hex::encode(&hash[12..]))
}

/// Recover the address that signed `message`
///
/// # Arguments
/// * `message` - The exact text that was signed
/// * `signature_hex` - 65-byte `r || s || v` signature, hex with optional `0x`
pub fn recover_address(message: &str, signature_hex: &str) -> Result<String, CryptoError> {
    let raw = signature_hex.trim();
    let raw = raw.strip_prefix("0x").unwrap_or(raw);
    let bytes =
        hex::decode(raw).map_err(|e| CryptoError::InvalidSignatureFormat(e.to_string()))?;

    if bytes.len() != 65 {
        return Err(CryptoError::InvalidSignatureFormat(format!(
            "Expected 65 bytes, got {}",
            bytes.len()
        )));
    }

    let v = bytes[64];
    let recovery_byte = match v {
        0 | 1 => v,
        27 | 28 => v - 27,
        _ => return Err(CryptoError::InvalidRecoveryId(v)),
    };

    let mut signature = Signature::from_slice(&bytes[..64])
        .map_err(|e| CryptoError::InvalidSignatureFormat(e.to_string()))?;
    let mut recovery_id =
        RecoveryId::from_byte(recovery_byte).ok_or(CryptoError::InvalidRecoveryId(v))?;

    // Recovery only accepts low-S; flipping S also flips the parity of R.y
    if let Some(normalized) = signature.normalize_s() {
        signature = normalized;
        recovery_id = RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced());
    }

    let key = VerifyingKey::recover_from_prehash(&eip191_hash(message), &signature, recovery_id)
        .map_err(|_| CryptoError::RecoveryFailed)?;

    Ok(address_from_key(&key))
}

/// Verify that `wallet_address` signed `message`
pub fn verify_wallet_signature(
    wallet_address: &str,
    message: &str,
    signature_hex: &str,
) -> Result<(), CryptoError> {
    if !is_valid_address(wallet_address) {
        return Err(CryptoError::InvalidAddressFormat(wallet_address.to_string()));
    }

    let recovered = recover_address(message, signature_hex)?;
    if recovered.eq_ignore_ascii_case(wallet_address) {
        Ok(())
    } else {
        Err(CryptoError::SignerMismatch { recovered })
    }
}

/// Sign `message` the way a wallet's `personal_sign` does, returning the
/// `0x`-prefixed hex signature with `v` in {27, 28}.
pub fn sign_personal_message(key: &SigningKey, message: &str) -> Result<String, CryptoError> {
    let (signature, recovery_id) = key
        .sign_prehash_recoverable(&eip191_hash(message))
        .map_err(|e| CryptoError::InvalidSignatureFormat(e.to_string()))?;

    let mut bytes = signature.to_bytes().to_vec();
    bytes.push(recovery_id.to_byte() + 27);

    Ok(format!("0x{}", hex::encode(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(byte: u8) -> SigningKey {
        SigningKey::from_slice(&[byte; 32]).unwrap()
    }

    #[test]
    fn test_known_address_for_private_key_one() {
        let mut secret = [0u8; 32];
        secret[31] = 1;
        let key = SigningKey::from_slice(&secret).unwrap();

        assert_eq!(
            address_from_key(key.verifying_key()),
            "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf"
        );
    }

    #[test]
    fn test_recovers_signer() {
        let key = key(7);
        let address = address_from_key(key.verifying_key());
        let signature = sign_personal_message(&key, "hello").unwrap();

        assert_eq!(recover_address("hello", &signature).unwrap(), address);
        assert!(verify_wallet_signature(&address.to_uppercase().replace("0X", "0x"), "hello", &signature).is_ok());
    }

    #[test]
    fn test_accepts_zero_based_recovery_byte() {
        let key = key(9);
        let signature = sign_personal_message(&key, "msg").unwrap();
        let mut bytes = hex::decode(&signature[2..]).unwrap();
        bytes[64] -= 27;

        let recovered = recover_address("msg", &hex::encode(bytes)).unwrap();
        assert_eq!(recovered, address_from_key(key.verifying_key()));
    }

    #[test]
    fn test_different_message_recovers_other_address() {
        let key = key(3);
        let address = address_from_key(key.verifying_key());
        let signature = sign_personal_message(&key, "Nonce: 1").unwrap();

        let result = verify_wallet_signature(&address, "Nonce: 2", &signature);
        assert!(matches!(result, Err(CryptoError::SignerMismatch { .. })));
    }

    #[test]
    fn test_wrong_signer_rejected() {
        let signer = key(4);
        let claimed = address_from_key(key(5).verifying_key());
        let signature = sign_personal_message(&signer, "hi").unwrap();

        assert!(verify_wallet_signature(&claimed, "hi", &signature).is_err());
    }

    #[test]
    fn test_malformed_signatures() {
        assert!(matches!(
            recover_address("m", "0xzz"),
            Err(CryptoError::InvalidSignatureFormat(_))
        ));
        assert!(matches!(
            recover_address("m", &format!("0x{}", "11".repeat(64))),
            Err(CryptoError::InvalidSignatureFormat(_))
        ));

        let mut bytes = vec![0x11u8; 64];
        bytes.push(5);
        assert!(matches!(
            recover_address("m", &hex::encode(bytes)),
            Err(CryptoError::InvalidRecoveryId(5))
        ));
    }

    #[test]
    fn test_address_validation() {
        assert!(is_valid_address("0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf"));
        assert!(!is_valid_address("7E5F4552091A69125d5DfCb7b8C2659029395Bdf"));
        assert!(!is_valid_address("0x7E5F"));
        assert!(!is_valid_address("0xZZ5F4552091A69125d5DfCb7b8C2659029395Bdf"));
    }
}
