/// Password Hashing and Verification
///
/// bcrypt hashing with a configurable cost, plus the password policy.
/// Hashing is CPU-bound, so the async wrappers run it on the blocking pool.

use bcrypt::{hash, verify};

use crate::error::{AppError, ValidationError};

pub const MIN_PASSWORD_LENGTH: usize = 8;
/// bcrypt ignores everything past this many bytes.
pub const MAX_PASSWORD_BYTES: usize = 72;
pub const MIN_HASH_COST: u32 = 4;
pub const MAX_HASH_COST: u32 = 31;

/// Validate password policy: at least `MIN_PASSWORD_LENGTH` characters and
/// at most `MAX_PASSWORD_BYTES` bytes.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort(
            "password".to_string(),
            MIN_PASSWORD_LENGTH,
        ));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(ValidationError::PasswordTooLong(MAX_PASSWORD_BYTES));
    }
    Ok(())
}

/// Hash a password using bcrypt
///
/// # Errors
/// - `AppError::InvalidInput` if the password is longer than `MAX_PASSWORD_BYTES`
/// - `AppError::Internal` if bcrypt hashing fails
pub fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(ValidationError::PasswordTooLong(MAX_PASSWORD_BYTES).into());
    }
    hash(password, cost)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a password against its hash (constant-time comparison inside bcrypt)
///
/// Passwords longer than `MAX_PASSWORD_BYTES` never match, since no stored
/// hash can have been made from one. They still pay for a full verification.
///
/// # Errors
/// Returns `AppError::Internal` if the stored hash is malformed
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let matched = verify(within_bcrypt_limit(password), hash)
        .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;
    Ok(matched && password.len() <= MAX_PASSWORD_BYTES)
}

/// Longest prefix of `password` that fits in `MAX_PASSWORD_BYTES`, cut on a
/// char boundary.
fn within_bcrypt_limit(password: &str) -> &str {
    if password.len() <= MAX_PASSWORD_BYTES {
        return password;
    }
    let mut end = MAX_PASSWORD_BYTES;
    while !password.is_char_boundary(end) {
        end -= 1;
    }
    &password[..end]
}

/// [`hash_password`] on the blocking thread pool.
pub async fn hash_password_blocking(password: String, cost: u32) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash_password(&password, cost))
        .await
        .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
}

/// [`verify_password`] on the blocking thread pool.
pub async fn verify_password_blocking(password: String, hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))?
}
