/// JWT Access Token Issuance and Verification
///
/// Access tokens are HS256-signed JWTs carrying `{iss, sub, iat, exp}`.
/// They are verified purely by signature and expiry, with no store lookup,
/// which is why they are short-lived.

use chrono::Duration;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::{Claims, TOKEN_ISSUER};
use crate::error::{AppError, TokenError};

/// Issue a signed access token for `user_id` that expires after `ttl`
///
/// # Errors
/// Returns error if token encoding fails
pub fn issue_access_token(user_id: Uuid, secret: &str, ttl: Duration) -> Result<String, AppError> {
    let claims = Claims::new(user_id, ttl);

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
}

/// Verify an access token and return its subject
///
/// The signature is always checked against `secret`; a token signed with a
/// different key and a token whose payload was altered fail identically.
///
/// # Errors
/// - `SignatureInvalid` if the signature does not match
/// - `Expired` if the current time has reached `exp`
/// - `Malformed` if the token cannot be parsed or lacks the expected claims
/// - `SubjectInvalid` if `sub` is not a UUID
pub fn verify_access_token(token: &str, secret: &str) -> Result<Uuid, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_issuer(&[TOKEN_ISSUER]);
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        let kind = classify(e.kind());
        tracing::debug!(error = %e, kind = %kind, "JWT validation error");
        kind
    })?;

    // jsonwebtoken only rejects `exp < now`; a token is dead at `exp` itself.
    if claims.is_expired() {
        return Err(TokenError::Expired);
    }

    claims.user_id()
}

fn classify(kind: &ErrorKind) -> TokenError {
    match kind {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::SignatureInvalid,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidSubject => TokenError::SubjectInvalid,
        _ => TokenError::Malformed,
    }
}
