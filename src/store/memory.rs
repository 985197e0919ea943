/// In-process adapters for the persistence ports
///
/// Each store is a `Mutex`-guarded map; every trait call takes the lock once,
/// which gives the same per-call atomicity the PostgreSQL adapters get from
/// single statements.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::StoreError;
use crate::store::{
    Chirp, ChirpStore, RefreshToken, RefreshTokenStore, SortOrder, User, UserStore,
};

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    mutex
        .lock()
        .map_err(|_| StoreError::Unexpected("store lock poisoned".to_string()))
}

#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: Mutex<HashMap<Uuid, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, email: &str, password_hash: &str) -> Result<User, StoreError> {
        let mut users = lock(&self.users)?;
        if users.values().any(|u| u.email == email) {
            return Err(StoreError::UniqueViolation("users_email_key".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            is_chirpy_red: false,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = lock(&self.users)?;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let users = lock(&self.users)?;
        Ok(users.get(&id).cloned())
    }

    async fn update_credentials(
        &self,
        id: Uuid,
        email: &str,
        password_hash: &str,
    ) -> Result<User, StoreError> {
        let mut users = lock(&self.users)?;
        if users.values().any(|u| u.email == email && u.id != id) {
            return Err(StoreError::UniqueViolation("users_email_key".to_string()));
        }

        let user = users
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound("user".to_string()))?;
        user.email = email.to_string();
        user.password_hash = password_hash.to_string();
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn upgrade_to_chirpy_red(&self, id: Uuid) -> Result<(), StoreError> {
        let mut users = lock(&self.users)?;
        let user = users
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound("user".to_string()))?;
        user.is_chirpy_red = true;
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn reset_all(&self) -> Result<(), StoreError> {
        lock(&self.users)?.clear();
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryChirpStore {
    chirps: Mutex<Vec<Chirp>>,
}

impl InMemoryChirpStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChirpStore for InMemoryChirpStore {
    async fn create(&self, user_id: Uuid, body: &str) -> Result<Chirp, StoreError> {
        let now = Utc::now();
        let chirp = Chirp {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            body: body.to_string(),
            user_id,
        };
        lock(&self.chirps)?.push(chirp.clone());
        Ok(chirp)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Chirp>, StoreError> {
        let chirps = lock(&self.chirps)?;
        Ok(chirps.iter().find(|c| c.id == id).cloned())
    }

    async fn list(&self, author: Option<Uuid>, order: SortOrder) -> Result<Vec<Chirp>, StoreError> {
        let chirps = lock(&self.chirps)?;
        // Insertion order is creation order; a stable sort keeps ties in it.
        let mut listed: Vec<Chirp> = chirps
            .iter()
            .filter(|c| author.map_or(true, |a| c.user_id == a))
            .cloned()
            .collect();
        listed.sort_by_key(|c| c.created_at);
        if order == SortOrder::Desc {
            listed.reverse();
        }
        Ok(listed)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let mut chirps = lock(&self.chirps)?;
        let before = chirps.len();
        chirps.retain(|c| c.id != id);
        if chirps.len() == before {
            return Err(StoreError::NotFound("chirp".to_string()));
        }
        Ok(())
    }

    async fn reset_all(&self) -> Result<(), StoreError> {
        lock(&self.chirps)?.clear();
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryRefreshTokenStore {
    tokens: Mutex<HashMap<String, RefreshToken>>,
}

impl InMemoryRefreshTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryRefreshTokenStore {
    async fn create(
        &self,
        user_id: Uuid,
        token: &str,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshToken, StoreError> {
        let mut tokens = lock(&self.tokens)?;
        if tokens.contains_key(token) {
            return Err(StoreError::UniqueViolation("refresh_tokens_pkey".to_string()));
        }

        let record = RefreshToken {
            token: token.to_string(),
            user_id,
            created_at: issued_at,
            updated_at: issued_at,
            expires_at,
            revoked_at: None,
        };
        tokens.insert(record.token.clone(), record.clone());
        Ok(record)
    }

    async fn lookup(&self, token: &str) -> Result<Option<RefreshToken>, StoreError> {
        let tokens = lock(&self.tokens)?;
        Ok(tokens.get(token).cloned())
    }

    async fn revoke(&self, token: &str, at: DateTime<Utc>) -> Result<(), StoreError> {
        let mut tokens = lock(&self.tokens)?;
        let record = tokens
            .get_mut(token)
            .ok_or_else(|| StoreError::NotFound("refresh token".to_string()))?;
        record.revoked_at.get_or_insert(at);
        record.updated_at = at;
        Ok(())
    }

    async fn reset_all(&self) -> Result<(), StoreError> {
        lock(&self.tokens)?.clear();
        Ok(())
    }
}
