// User Service - sync from the identity provider and role management

use crate::domain::{UpsertUser, User, UserRole};
use crate::error::{AppError, Result};
use crate::port::UserRepository;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Identity-provider user object, as handed over after sign-in
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalIdentity {
    pub id: String,
    #[serde(default)]
    pub primary_email: Option<String>,
    #[serde(default)]
    pub email_addresses: Vec<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub metadata: IdentityMetadata,
}

/// Sign-up form values the identity provider keeps as user metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentityMetadata {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub role: Option<UserRole>,
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Map an identity into the upsert shape.
///
/// Names fall back to metadata. The role stays unset unless metadata carries
/// one, so inserts default to `customer` and updates keep the stored role.
pub fn map_identity(identity: &ExternalIdentity) -> Result<UpsertUser> {
    if identity.id.trim().is_empty() {
        return Err(AppError::Validation("Identity has no id".to_string()));
    }

    let email = non_blank(&identity.primary_email)
        .or_else(|| {
            identity
                .email_addresses
                .iter()
                .map(|e| e.trim())
                .find(|e| !e.is_empty())
                .map(str::to_string)
        })
        .ok_or_else(|| {
            AppError::Validation(format!("Identity {} has no email address", identity.id))
        })?;

    Ok(UpsertUser {
        id: identity.id.clone(),
        email: Some(email),
        first_name: non_blank(&identity.first_name)
            .or_else(|| non_blank(&identity.metadata.first_name)),
        last_name: non_blank(&identity.last_name)
            .or_else(|| non_blank(&identity.metadata.last_name)),
        role: identity.metadata.role,
    })
}

pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn sync_user_to_database(&self, identity: &ExternalIdentity) -> Result<User> {
        let data = map_identity(identity)?;
        let user = self.users.upsert_user(&data).await?;
        info!(user_id = %user.id, role = %user.role, "User synced");
        Ok(user)
    }

    pub async fn update_user_role_in_database(&self, user_id: &str, role: UserRole) -> Result<User> {
        let user = self.users.update_user_role(user_id, role).await?;
        info!(user_id = %user.id, role = %user.role, "User role updated");
        Ok(user)
    }

    pub async fn get_user_from_database(&self, user_id: &str) -> Result<Option<User>> {
        self.users.get_user(user_id).await
    }

    /// Riders a dealer can assign
    pub async fn get_riders(&self) -> Result<Vec<User>> {
        self.users.get_users_by_role(UserRole::Rider).await
    }
}
