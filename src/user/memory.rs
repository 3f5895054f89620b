use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{User, UserRepository};
use crate::error::AppError;

/// Map-backed store for tests and local runs without Postgres.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let users = users
            .into_iter()
            .map(|user| (user.username.clone(), user))
            .collect();
        Self {
            users: RwLock::new(users),
        }
    }

    pub async fn insert(&self, user: User) {
        self.users.write().await.insert(user.username.clone(), user);
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.read().await.get(username).cloned())
    }
}
