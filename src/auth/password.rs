/// Password Hashing and Verification
///
/// Passwords are hashed with bcrypt at a fixed cost. The stored hash is the
/// only form a password ever takes after it leaves the request body.

use bcrypt::{hash, verify};

use crate::error::AppError;

/// bcrypt work factor. Each increment doubles the cost of a login.
pub const PASSWORD_HASH_COST: u32 = 10;

/// Hash a password using bcrypt
///
/// # Errors
/// Returns `AppError::Hashing` if bcrypt fails (salt generation or an input
/// bcrypt cannot handle).
pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, PASSWORD_HASH_COST)
        .map_err(|e| AppError::Hashing(format!("Password hashing failed: {}", e)))
}

/// Verify a password against its hash
///
/// A corrupt or unparsable hash is reported the same way as a wrong
/// password, so callers only ever see pass or fail.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match verify(password, hash) {
        Ok(valid) => valid,
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash could not be verified");
            false
        }
    }
}
