/// Persistence ports
///
/// The service talks to storage only through these traits. PostgreSQL
/// adapters live in [`postgres`]; [`memory`] holds process-local adapters
/// used by tests and local runs without a database.
///
/// Implementations are responsible for atomicity of each call. In particular
/// `RefreshTokenStore::revoke` must be a single atomic update, so a revoke
/// racing a refresh resolves to one winner without locks in the caller.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::StoreError;

pub mod memory;
pub mod postgres;

pub use memory::{InMemoryChirpStore, InMemoryRefreshTokenStore, InMemoryUserStore};
pub use postgres::{PostgresChirpStore, PostgresRefreshTokenStore, PostgresUserStore};

/// A registered account
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
    /// bcrypt hash, never the raw password
    pub password_hash: String,
    pub is_chirpy_red: bool,
}

/// A short post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Chirp {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub body: String,
    pub user_id: Uuid,
}

/// A stored refresh token
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct RefreshToken {
    pub token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshToken {
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Ordering of chirp listings by creation time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user. `UniqueViolation` if the email is taken.
    async fn create(&self, email: &str, password_hash: &str) -> Result<User, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Replace email and password hash. `NotFound` if the user is gone.
    async fn update_credentials(
        &self,
        id: Uuid,
        email: &str,
        password_hash: &str,
    ) -> Result<User, StoreError>;

    /// Mark the user as a Chirpy Red member. `NotFound` if no such user.
    async fn upgrade_to_chirpy_red(&self, id: Uuid) -> Result<(), StoreError>;

    /// Delete every user
    async fn reset_all(&self) -> Result<(), StoreError>;
}

#[async_trait]
pub trait ChirpStore: Send + Sync {
    async fn create(&self, user_id: Uuid, body: &str) -> Result<Chirp, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<Chirp>, StoreError>;

    /// All chirps, optionally restricted to one author, ordered by creation time
    async fn list(&self, author: Option<Uuid>, order: SortOrder) -> Result<Vec<Chirp>, StoreError>;

    /// `NotFound` if no such chirp
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;

    async fn reset_all(&self) -> Result<(), StoreError>;
}

#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Insert a token. `UniqueViolation` if the value already exists.
    async fn create(
        &self,
        user_id: Uuid,
        token: &str,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshToken, StoreError>;

    /// Fetch by exact token value
    async fn lookup(&self, token: &str) -> Result<Option<RefreshToken>, StoreError>;

    /// Set `revoked_at = at` unless already revoked. Re-revoking succeeds
    /// and keeps the original time. `NotFound` if no such token.
    async fn revoke(&self, token: &str, at: DateTime<Utc>) -> Result<(), StoreError>;

    /// Delete every refresh token. Access control is the caller's job.
    async fn reset_all(&self) -> Result<(), StoreError>;
}
