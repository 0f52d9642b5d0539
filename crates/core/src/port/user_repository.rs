// User Repository Port (Interface)

use crate::domain::{UpsertUser, User, UserRole};
use crate::error::Result;
use async_trait::async_trait;

/// Repository interface for User persistence
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert or update by primary key; returns the resulting row
    async fn upsert_user(&self, data: &UpsertUser) -> Result<User>;

    /// Find user by ID
    async fn get_user(&self, id: &str) -> Result<Option<User>>;

    /// All users holding a role
    async fn get_users_by_role(&self, role: UserRole) -> Result<Vec<User>>;

    /// Overwrite the role (NotFound if the user does not exist)
    async fn update_user_role(&self, id: &str, role: UserRole) -> Result<User>;

    /// Hard delete; returns whether a row was removed
    async fn delete_user(&self, id: &str) -> Result<bool>;
}
