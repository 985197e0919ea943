/// Authorization Header Parsing
///
/// Extracts credentials from `Authorization: <scheme> <value>` headers.
/// The header must appear exactly once and split on a single space into
/// exactly two parts; the scheme is matched case-insensitively.

use actix_web::http::header::{HeaderMap, AUTHORIZATION};

use crate::error::AuthError;

/// Extract the token from `Authorization: Bearer <token>`
pub fn get_bearer_token(headers: &HeaderMap) -> Result<String, AuthError> {
    get_authorization(headers, "bearer")
}

/// Extract the key from `Authorization: ApiKey <key>`
pub fn get_api_key(headers: &HeaderMap) -> Result<String, AuthError> {
    get_authorization(headers, "apikey")
}

fn get_authorization(headers: &HeaderMap, scheme: &str) -> Result<String, AuthError> {
    let mut values = headers.get_all(AUTHORIZATION);
    let value = match (values.next(), values.next()) {
        (Some(value), None) => value,
        (None, _) => {
            tracing::debug!("Authorization header missing");
            return Err(AuthError::MalformedHeader);
        }
        (Some(_), Some(_)) => {
            tracing::debug!("Authorization header sent more than once");
            return Err(AuthError::MalformedHeader);
        }
    };

    let value = value.to_str().map_err(|_| AuthError::MalformedHeader)?;
    parse_authorization(value, scheme)
}

fn parse_authorization(value: &str, scheme: &str) -> Result<String, AuthError> {
    let parts: Vec<&str> = value.split(' ').collect();
    match parts.as_slice() {
        [found, token] if found.eq_ignore_ascii_case(scheme) && !token.is_empty() => {
            Ok((*token).to_string())
        }
        _ => Err(AuthError::MalformedHeader),
    }
}
