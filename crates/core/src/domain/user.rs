// User Domain Model

use crate::domain::error::{DomainError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// User ID (issued by the identity provider)
pub type UserId = String;

/// Marketplace role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Customer,
    Dealer,
    Rider,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Customer => "customer",
            UserRole::Dealer => "dealer",
            UserRole::Rider => "rider",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "customer" => Ok(UserRole::Customer),
            "dealer" => Ok(UserRole::Dealer),
            "rider" => Ok(UserRole::Rider),
            other => Err(DomainError::UnknownRole(other.to_string())),
        }
    }
}

/// User Entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: UserRole,
    pub created_at: i64, // epoch ms
    pub updated_at: i64,
}

impl User {
    /// "First Last", falling back to the email address
    pub fn display_name(&self) -> String {
        let name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if name.is_empty() {
            self.email.clone()
        } else {
            name
        }
    }
}

/// Insert-or-update shape for users.
///
/// `None` fields leave the stored value untouched on update. A `None` role
/// on insert lands as `customer`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpsertUser {
    pub id: UserId,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<UserRole>,
}

/// The acting user for a service call.
///
/// Passed explicitly into every mutating use case; nothing reads the current
/// user from ambient state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub role: UserRole,
}

impl Actor {
    pub fn new(user_id: impl Into<String>, role: UserRole) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    pub fn customer(user_id: impl Into<String>) -> Self {
        Self::new(user_id, UserRole::Customer)
    }

    pub fn dealer(user_id: impl Into<String>) -> Self {
        Self::new(user_id, UserRole::Dealer)
    }

    pub fn rider(user_id: impl Into<String>) -> Self {
        Self::new(user_id, UserRole::Rider)
    }

    pub fn require_role(&self, required: UserRole) -> Result<()> {
        if self.role != required {
            return Err(DomainError::RoleRequired {
                required: required.to_string(),
                actual: self.role.to_string(),
            });
        }
        Ok(())
    }

    pub fn is(&self, user_id: Option<&str>) -> bool {
        user_id == Some(self.user_id.as_str())
    }
}
