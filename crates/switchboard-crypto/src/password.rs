//! Admin password hashing (bcrypt).

use thiserror::Error;

/// Errors from password hashing or verification.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// The bcrypt operation itself failed.
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

/// Hash a plaintext password with bcrypt at the default cost.
///
/// # Errors
///
/// Returns [`PasswordError::Hash`] if bcrypt fails.
pub fn hash_password(plaintext: &str) -> Result<String, PasswordError> {
    Ok(bcrypt::hash(plaintext, bcrypt::DEFAULT_COST)?)
}

/// Verify a plaintext password against a stored bcrypt hash.
///
/// # Errors
///
/// Returns [`PasswordError::Hash`] if the stored hash is malformed.
pub fn verify_password(plaintext: &str, stored_hash: &str) -> Result<bool, PasswordError> {
    Ok(bcrypt::verify(plaintext, stored_hash)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let hash = hash_password("hunter2").unwrap();
        assert!(verify_password("hunter2", &hash).unwrap());
        assert!(!verify_password("hunter3", &hash).unwrap());
    }

    #[test]
    fn test_malformed_hash_errors() {
        assert!(verify_password("pw", "not-a-bcrypt-hash").is_err());
    }
}
