//! Agent API key generation, hashing, and verification.
//!
//! Keys have the form `sk_agent_<hex>` where `<hex>` is 32 bytes from the
//! OS CSPRNG, hex-encoded. At rest only the SHA-256 of the full plaintext
//! is stored: with >=128 bits of key entropy a fast hash is sufficient,
//! and a slow KDF per agent request would dominate the hot path.

use rand::RngCore;
use subtle::ConstantTimeEq;

use crate::hash::sha256_hex;

/// Prefix identifying agent API keys.
pub const API_KEY_PREFIX: &str = "sk_agent_";

/// Random bytes of entropy behind each key.
const API_KEY_BYTES: usize = 32;

/// Generate a fresh plaintext API key.
#[must_use]
pub fn generate_api_key() -> String {
    let mut bytes = [0u8; API_KEY_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    format!("{API_KEY_PREFIX}{}", hex::encode(bytes))
}

/// The at-rest form of a plaintext key.
#[must_use]
pub fn hash_api_key(plaintext: &str) -> String {
    sha256_hex(plaintext)
}

/// Check a presented plaintext key against a stored hash.
///
/// The comparison over the hex digests is constant-time so that agent
/// lookup does not leak digest prefixes.
#[must_use]
pub fn verify_api_key(plaintext: &str, stored_hash: &str) -> bool {
    let presented = hash_api_key(plaintext);
    if presented.len() != stored_hash.len() {
        return false;
    }
    presented
        .as_bytes()
        .ct_eq(stored_hash.as_bytes())
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_format() {
        let key = generate_api_key();
        assert!(key.starts_with(API_KEY_PREFIX));
        let hex_part = &key[API_KEY_PREFIX.len()..];
        assert_eq!(hex_part.len(), API_KEY_BYTES * 2);
        assert!(hex_part.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_keys_are_unique() {
        assert_ne!(generate_api_key(), generate_api_key());
    }

    #[test]
    fn test_verify_round_trip() {
        let key = generate_api_key();
        let stored = hash_api_key(&key);
        assert!(verify_api_key(&key, &stored));
        assert!(!verify_api_key("sk_agent_wrong", &stored));
    }

    #[test]
    fn test_verify_rejects_malformed_stored_hash() {
        let key = generate_api_key();
        assert!(!verify_api_key(&key, "short"));
    }
}
