/// Password hashing for administrator accounts (bcrypt).

use bcrypt::{hash, verify};

use crate::error::{AppError, ValidationError};

const MIN_PASSWORD_LENGTH: usize = 6;
// bcrypt ignores everything past 72 bytes
const MAX_PASSWORD_LENGTH: usize = 72;

/// Hash a password with bcrypt at `cost`.
///
/// # Errors
/// Validation error when the password length is out of range,
/// internal error if bcrypt fails
pub fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AppError::Validation(ValidationError::TooShort(
            "password".to_string(),
            MIN_PASSWORD_LENGTH,
        )));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(AppError::Validation(ValidationError::TooLong(
            "password".to_string(),
            MAX_PASSWORD_LENGTH,
        )));
    }

    hash(password, cost).map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Check `password` against a stored bcrypt hash.
///
/// # Errors
/// Internal error if the stored hash is not a bcrypt hash
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    verify(password, password_hash)
        .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    // bcrypt's minimum cost keeps the tests fast
    const TEST_COST: u32 = 4;

    #[test]
    fn test_hash_password() {
        let hash = hash_password("123456", TEST_COST).expect("Failed to hash password");

        assert_ne!(hash, "123456");
        assert!(hash.starts_with("$2"));
    }

    #[test]
    fn test_verify_password() {
        let hash = hash_password("123456", TEST_COST).unwrap();

        assert!(verify_password("123456", &hash).unwrap());
        assert!(!verify_password("654321", &hash).unwrap());
    }

    #[test]
    fn test_password_length_limits() {
        assert!(hash_password("12345", TEST_COST).is_err());
        assert!(hash_password(&"a".repeat(73), TEST_COST).is_err());
    }

    #[test]
    fn test_corrupt_hash() {
        assert!(verify_password("123456", "not-a-bcrypt-hash").is_err());
    }
}
