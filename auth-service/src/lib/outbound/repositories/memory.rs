use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::MutexGuard;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::errors::StoreError;
use crate::domain::session::models::RefreshToken;
use crate::domain::session::ports::RefreshTokenStore;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::CredentialStore;
use crate::user::errors::UserError;

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    mutex
        .lock()
        .map_err(|_| StoreError::Database("in-memory store lock poisoned".to_string()))
}

/// Process-local credential store.
///
/// Uniqueness checks and the insert happen under one lock.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    users: Mutex<HashMap<UserId, User>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the active flag of a stored user. Returns false for unknown ids.
    pub fn set_active(&self, id: &UserId, active: bool) -> Result<bool, StoreError> {
        let mut users = lock(&self.users)?;
        Ok(match users.get_mut(id) {
            Some(user) => {
                user.is_active = active;
                true
            }
            None => false,
        })
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn create(&self, user: User) -> Result<User, UserError> {
        let mut users = lock(&self.users)?;

        if users.values().any(|u| u.email == user.email) {
            return Err(UserError::EmailAlreadyExists(user.email.to_string()));
        }
        if users.values().any(|u| u.username == user.username) {
            return Err(UserError::UsernameAlreadyExists(user.username.to_string()));
        }

        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        Ok(lock(&self.users)?.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(lock(&self.users)?
            .values()
            .find(|u| u.email.as_str() == email)
            .cloned())
    }
}

/// Process-local refresh token store keyed by secret digest.
///
/// The conditional transition in `rotate` runs under one lock, which gives
/// the same single-winner guarantee as the database store within a process.
#[derive(Default)]
pub struct InMemoryRefreshTokenStore {
    tokens: Mutex<HashMap<String, RefreshToken>>,
}

impl InMemoryRefreshTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(lock(&self.tokens)?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(lock(&self.tokens)?.is_empty())
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryRefreshTokenStore {
    async fn insert(&self, token: RefreshToken) -> Result<(), StoreError> {
        let mut tokens = lock(&self.tokens)?;
        if tokens.contains_key(&token.token_hash) {
            return Err(StoreError::Database(
                "duplicate refresh token hash".to_string(),
            ));
        }
        tokens.insert(token.token_hash.clone(), token);
        Ok(())
    }

    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<RefreshToken>, StoreError> {
        Ok(lock(&self.tokens)?.get(token_hash).cloned())
    }

    async fn rotate(
        &self,
        old_hash: &str,
        replacement: RefreshToken,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut tokens = lock(&self.tokens)?;

        if tokens.contains_key(&replacement.token_hash) {
            return Err(StoreError::Database(
                "duplicate refresh token hash".to_string(),
            ));
        }

        match tokens.get_mut(old_hash) {
            Some(old) if old.user_id == replacement.user_id && old.is_active(now) => {
                old.revoked = true;
                old.updated_at = now;
            }
            _ => return Ok(false),
        }

        tokens.insert(replacement.token_hash.clone(), replacement);
        Ok(true)
    }

    async fn revoke(&self, token_hash: &str, now: DateTime<Utc>) -> Result<bool, StoreError> {
        let mut tokens = lock(&self.tokens)?;
        Ok(match tokens.get_mut(token_hash) {
            Some(token) => {
                token.revoked = true;
                token.updated_at = now;
                true
            }
            None => false,
        })
    }

    async fn delete_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut tokens = lock(&self.tokens)?;
        let before = tokens.len();
        tokens.retain(|_, token| token.expires_at > cutoff);
        Ok((before - tokens.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use chrono::TimeZone;

    use super::*;
    use crate::domain::user::models::EmailAddress;
    use crate::domain::user::models::Username;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn user(username: &str, email: &str) -> User {
        User {
            id: UserId::new(),
            username: Username::new(username.to_string()).unwrap(),
            email: EmailAddress::new(email.to_string()).unwrap(),
            password_hash: "$argon2id$stub".to_string(),
            full_name: None,
            avatar_url: None,
            is_active: true,
            created_at: now(),
            updated_at: now(),
        }
    }

    #[tokio::test]
    async fn test_create_enforces_unique_email_and_username() {
        let store = InMemoryCredentialStore::new();
        store.create(user("alice", "alice@x.com")).await.unwrap();

        let email = store.create(user("alice2", "alice@x.com")).await;
        assert!(matches!(email, Err(UserError::EmailAlreadyExists(_))));

        let username = store.create(user("alice", "other@x.com")).await;
        assert!(matches!(username, Err(UserError::UsernameAlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_find_by_email() {
        let store = InMemoryCredentialStore::new();
        let created = store.create(user("alice", "alice@x.com")).await.unwrap();

        let by_email = store.find_by_email("alice@x.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, created.id);

        assert!(store.find_by_email("bob@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_active() {
        let store = InMemoryCredentialStore::new();
        let created = store.create(user("alice", "alice@x.com")).await.unwrap();

        assert!(store.set_active(&created.id, false).unwrap());
        assert!(!store.find_by_id(&created.id).await.unwrap().unwrap().is_active);
        assert!(!store.set_active(&UserId::new(), false).unwrap());
    }

    #[tokio::test]
    async fn test_rotate_requires_matching_user_and_active_state() {
        let store = InMemoryRefreshTokenStore::new();
        let owner = UserId::new();
        let old = RefreshToken::new(owner, "old".to_string(), now(), Duration::days(1));
        store.insert(old).await.unwrap();

        let foreign = RefreshToken::new(UserId::new(), "foreign".to_string(), now(), Duration::days(1));
        assert!(!store.rotate("old", foreign, now()).await.unwrap());

        let late = RefreshToken::new(owner, "late".to_string(), now(), Duration::days(1));
        assert!(!store.rotate("old", late, now() + Duration::days(1)).await.unwrap());

        let next = RefreshToken::new(owner, "next".to_string(), now(), Duration::days(1));
        assert!(store.rotate("old", next, now()).await.unwrap());
        assert!(store.find_by_hash("old").await.unwrap().unwrap().revoked);

        let again = RefreshToken::new(owner, "again".to_string(), now(), Duration::days(1));
        assert!(!store.rotate("old", again, now()).await.unwrap());
        assert_eq!(store.len().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_delete_expired_uses_cutoff() {
        let store = InMemoryRefreshTokenStore::new();
        store
            .insert(RefreshToken::new(UserId::new(), "a".to_string(), now(), Duration::hours(1)))
            .await
            .unwrap();
        store
            .insert(RefreshToken::new(UserId::new(), "b".to_string(), now(), Duration::hours(3)))
            .await
            .unwrap();

        assert_eq!(store.delete_expired(now() + Duration::hours(1)).await.unwrap(), 1);
        assert_eq!(store.delete_expired(now() + Duration::hours(1)).await.unwrap(), 0);
        assert!(!store.is_empty().unwrap());
    }
}
