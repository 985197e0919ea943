/// Refresh Token Generation
///
/// Refresh tokens are opaque: 32 bytes from the operating system's CSPRNG,
/// hex-encoded to 64 lowercase characters. They carry no meaning of their
/// own; validity lives entirely in the refresh token store.

use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::AppError;

/// Number of random bytes in a refresh token
pub const REFRESH_TOKEN_BYTES: usize = 32;

/// Generate a new cryptographically secure refresh token
///
/// # Errors
/// Returns `AppError::Hashing` if the OS entropy source fails
pub fn generate_refresh_token() -> Result<String, AppError> {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| AppError::Hashing(format!("Entropy source failed: {}", e)))?;

    Ok(hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_refresh_token() {
        let token = generate_refresh_token().expect("Failed to generate token");

        assert_eq!(token.len(), 64);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_tokens_are_unique() {
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            let token = generate_refresh_token().expect("Failed to generate token");
            assert_eq!(token.len(), 64);
            assert!(seen.insert(token), "refresh token collision");
        }
    }
}
