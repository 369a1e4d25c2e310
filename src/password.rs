/// Password Hashing and Verification
///
/// Bcrypt with a configurable work factor (clamped to a minimum of 10 by the
/// configuration layer). `bcrypt::verify` compares digests in constant time.
/// Neither function ever logs the plaintext or the hash.

use bcrypt::{hash, verify};

use crate::error::AuthError;

/// Hash a password using bcrypt at the given cost.
///
/// # Errors
/// Returns error if bcrypt hashing fails (invalid cost, oversized input).
pub fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    hash(password, cost).map_err(|e| AuthError::Internal(format!("password hashing failed: {}", e)))
}

/// Verify a password against its stored hash.
///
/// # Errors
/// Returns error if the stored hash is not parseable as a bcrypt digest.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    verify(password, hash)
        .map_err(|e| AuthError::Internal(format!("password verification failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    // MIN_COST keeps the test suite fast; production cost comes from
    // configuration.
    const TEST_COST: u32 = 4;

    #[test]
    fn test_hash_password() {
        let password = "Passw0rd!";
        let hash = hash_password(password, TEST_COST).expect("Failed to hash password");

        assert_ne!(password, hash);
        assert!(hash.starts_with("$2"));
    }

    #[test]
    fn test_verify_password() {
        let password = "Passw0rd!";
        let hash = hash_password(password, TEST_COST).expect("Failed to hash password");

        let is_valid = verify_password(password, &hash).expect("Failed to verify password");
        assert!(is_valid);
    }

    #[test]
    fn test_verify_wrong_password() {
        let hash = hash_password("Passw0rd!", TEST_COST).expect("Failed to hash password");

        let is_valid = verify_password("WrongPassw0rd!", &hash).expect("Failed to verify password");
        assert!(!is_valid);
    }

    #[test]
    fn test_same_password_different_salts() {
        let first = hash_password("Passw0rd!", TEST_COST).expect("Failed to hash password");
        let second = hash_password("Passw0rd!", TEST_COST).expect("Failed to hash password");

        assert_ne!(first, second);
    }

    #[test]
    fn test_garbage_hash_is_an_error() {
        let result = verify_password("Passw0rd!", "not-a-bcrypt-digest");
        assert!(result.is_err());
    }
}
