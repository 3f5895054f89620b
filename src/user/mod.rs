/// Administrator accounts, looked up by the login flow and the JWT guard.

mod memory;
mod postgres;

pub use memory::InMemoryUserRepository;
pub use postgres::PgUserRepository;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub password_hash: String,
    pub name: String,
    pub enabled: bool,
}

/// What the API is allowed to show about a user.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: i32,
    pub username: String,
    pub name: String,
    pub enabled: bool,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            name: user.name.clone(),
            enabled: user.enabled,
        }
    }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
}
