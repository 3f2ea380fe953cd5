//! Token-based user registry guarded by a shared key.

use crate::error::{PracticeError, Result};
use async_trait::async_trait;
use rand::distr::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tokio::sync::RwLock;
use tracing::info;

const TOKEN_LENGTH: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: i64,
    pub token: String,
    /// Subscribed to the word of the day.
    pub wotd: bool,
}

/// Backing storage for user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find(&self, user_id: i64) -> Result<Option<UserRecord>>;
    /// Stores `record` unless the user already exists, atomically. Returns
    /// the record that ends up stored.
    async fn insert_if_absent(&self, record: UserRecord) -> Result<UserRecord>;
    /// Returns `false` when no such user exists.
    async fn set_subscription(&self, user_id: i64, subscribed: bool) -> Result<bool>;
    async fn subscribers(&self) -> Result<Vec<i64>>;
}

/// Process-local store.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<BTreeMap<i64, UserRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find(&self, user_id: i64) -> Result<Option<UserRecord>> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }

    async fn insert_if_absent(&self, record: UserRecord) -> Result<UserRecord> {
        let mut users = self.users.write().await;
        Ok(users.entry(record.user_id).or_insert(record).clone())
    }

    async fn set_subscription(&self, user_id: i64, subscribed: bool) -> Result<bool> {
        let mut users = self.users.write().await;
        match users.get_mut(&user_id) {
            Some(user) => {
                user.wotd = subscribed;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn subscribers(&self) -> Result<Vec<i64>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .filter(|u| u.wotd)
            .map(|u| u.user_id)
            .collect())
    }
}

pub fn generate_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

fn secrets_match(expected: &str, given: &str) -> bool {
    expected.as_bytes().ct_eq(given.as_bytes()).into()
}

/// Every operation first checks the caller's key against the shared secret.
#[derive(Clone)]
pub struct UserRegistry {
    key: String,
    store: Arc<dyn UserStore>,
}

impl UserRegistry {
    pub fn new(key: impl Into<String>, store: Arc<dyn UserStore>) -> Self {
        Self {
            key: key.into(),
            store,
        }
    }

    fn authenticate(&self, key: &str) -> Result<()> {
        if secrets_match(&self.key, key) {
            Ok(())
        } else {
            Err(PracticeError::Unauthorized)
        }
    }

    async fn token_of(&self, user_id: i64) -> Result<String> {
        self.store
            .find(user_id)
            .await?
            .map(|u| u.token)
            .ok_or(PracticeError::UnknownUser(user_id))
    }

    /// Token of `user_id`, registering the user first when needed.
    pub async fn new_user(&self, key: &str, user_id: i64) -> Result<String> {
        self.authenticate(key)?;
        if let Some(user) = self.store.find(user_id).await? {
            return Ok(user.token);
        }

        let stored = self
            .store
            .insert_if_absent(UserRecord {
                user_id,
                token: generate_token(),
                wotd: false,
            })
            .await?;
        info!("Registered user {}", user_id);
        Ok(stored.token)
    }

    pub async fn check_token(&self, key: &str, user_id: i64, token: &str) -> Result<bool> {
        self.authenticate(key)?;
        let expected = self.token_of(user_id).await?;
        Ok(secrets_match(&expected, token))
    }

    pub async fn subscribe(&self, key: &str, user_id: i64) -> Result<bool> {
        self.set_subscription(key, user_id, true).await
    }

    pub async fn unsubscribe(&self, key: &str, user_id: i64) -> Result<bool> {
        self.set_subscription(key, user_id, false).await
    }

    /// Returns the new subscription state.
    async fn set_subscription(&self, key: &str, user_id: i64, subscribed: bool) -> Result<bool> {
        self.authenticate(key)?;
        if !self.store.set_subscription(user_id, subscribed).await? {
            return Err(PracticeError::UnknownUser(user_id));
        }
        info!(
            "User {} {}",
            user_id,
            if subscribed { "subscribed" } else { "unsubscribed" }
        );
        Ok(subscribed)
    }

    pub async fn subscribers(&self, key: &str) -> Result<Vec<i64>> {
        self.authenticate(key)?;
        self.store.subscribers().await
    }

    /// Subscribers without a key check, for in-process callers such as the broadcast.
    pub(crate) async fn subscribers_unchecked(&self) -> Result<Vec<i64>> {
        self.store.subscribers().await
    }
}
