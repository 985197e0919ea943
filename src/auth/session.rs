/// Session Orchestration
///
/// Ties the password hasher, the access token codec and the refresh token
/// store together:
///
/// - `login` issues an access token and a stored refresh token
/// - `refresh` exchanges a live refresh token for a new access token
///   (the refresh token itself is reused, not rotated)
/// - `revoke` ends a refresh token's life
/// - `authorize` turns a bearer access token into an identity
///
/// Refresh tokens are the revocation boundary. Access tokens are never
/// looked up; they simply expire.

use std::sync::Arc;

use actix_web::http::header::HeaderMap;
use chrono::{Duration, Utc};
use lazy_static::lazy_static;
use uuid::Uuid;

use crate::auth::bearer::get_bearer_token;
use crate::auth::jwt::{issue_access_token, verify_access_token};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::refresh_token::generate_refresh_token;
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};
use crate::store::RefreshTokenStore;

lazy_static! {
    // Verified against when the identity is unknown, so a login for a
    // missing account costs the same bcrypt work as a wrong password.
    static ref DUMMY_HASH: String =
        hash_password("chirpy-dummy-password").unwrap_or_default();
}

/// What the identity store knows about an account
#[derive(Debug, Clone)]
pub struct Credential {
    pub identity_id: Uuid,
    pub password_hash: String,
}

/// Tokens handed out on a successful login
#[derive(Debug, Clone)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn RefreshTokenStore>,
    secret: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl SessionManager {
    pub fn new(
        store: Arc<dyn RefreshTokenStore>,
        secret: impl Into<String>,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        // Built here so no login request pays for it
        lazy_static::initialize(&DUMMY_HASH);

        Self {
            store,
            secret: secret.into(),
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn from_settings(store: Arc<dyn RefreshTokenStore>, settings: &JwtSettings) -> Self {
        Self::new(
            store,
            settings.secret.clone(),
            settings.access_ttl(),
            settings.refresh_ttl(),
        )
    }

    pub fn store(&self) -> &Arc<dyn RefreshTokenStore> {
        &self.store
    }

    /// Check a password and open a session
    ///
    /// `credential` is `None` when the identity lookup found nothing; that
    /// case and a wrong password both yield `InvalidCredentials`.
    pub async fn login(
        &self,
        credential: Option<Credential>,
        password: &str,
    ) -> Result<SessionTokens, AppError> {
        let credential = match credential {
            Some(credential) if verify_password(password, &credential.password_hash) => credential,
            Some(credential) => {
                tracing::info!(user_id = %credential.identity_id, "Login rejected: wrong password");
                return Err(AuthError::InvalidCredentials.into());
            }
            None => {
                let _ = verify_password(password, &DUMMY_HASH);
                tracing::info!("Login rejected: unknown identity");
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        let access_token = issue_access_token(credential.identity_id, &self.secret, self.access_ttl)?;

        let refresh_token = generate_refresh_token()?;
        let now = Utc::now();
        self.store
            .create(credential.identity_id, &refresh_token, now, now + self.refresh_ttl)
            .await?;

        tracing::info!(user_id = %credential.identity_id, "Session opened");

        Ok(SessionTokens {
            access_token,
            refresh_token,
        })
    }

    /// Exchange the bearer refresh token for a new access token
    pub async fn refresh(&self, headers: &HeaderMap) -> Result<String, AppError> {
        let token = get_bearer_token(headers)?;

        let record = match self.store.lookup(&token).await? {
            Some(record) => record,
            None => {
                tracing::warn!("Refresh rejected: unknown token");
                return Err(AuthError::Unauthorized.into());
            }
        };

        if record.is_revoked() {
            tracing::warn!(user_id = %record.user_id, "Refresh rejected: token revoked");
            return Err(AuthError::Unauthorized.into());
        }

        if record.is_expired_at(Utc::now()) {
            tracing::info!(user_id = %record.user_id, "Refresh rejected: token expired");
            return Err(AuthError::Unauthorized.into());
        }

        let access_token = issue_access_token(record.user_id, &self.secret, self.access_ttl)?;

        tracing::info!(user_id = %record.user_id, "Access token refreshed");
        Ok(access_token)
    }

    /// Revoke the bearer refresh token
    ///
    /// An unknown token is reported as `StoreError::NotFound`.
    pub async fn revoke(&self, headers: &HeaderMap) -> Result<(), AppError> {
        let token = get_bearer_token(headers)?;
        self.store.revoke(&token, Utc::now()).await?;

        tracing::info!("Refresh token revoked");
        Ok(())
    }

    /// Resolve the bearer access token to an identity
    pub fn authorize(&self, headers: &HeaderMap) -> Result<Uuid, AppError> {
        let token = get_bearer_token(headers)?;

        verify_access_token(&token, &self.secret).map_err(|kind| {
            tracing::warn!(reason = %kind, "Access token rejected");
            AppError::from(kind)
        })
    }
}

/// Ownership check for protected resources, separate from authentication
pub fn ensure_owner(identity: Uuid, owner: Uuid) -> Result<(), AppError> {
    if identity != owner {
        tracing::warn!(user_id = %identity, owner_id = %owner, "Access to foreign resource denied");
        return Err(AuthError::Forbidden.into());
    }
    Ok(())
}
