//! User entity model.

use chrono::{DateTime, Utc};
use comply_core::types::UserId;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::role::UserRole;

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Human-readable code such as `PIC-042`.
    pub user_code: String,
    pub employee_name: String,
    /// Login email, unique across accounts.
    pub email: String,
    pub branch: Option<String>,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    /// Inactive accounts cannot log in.
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Check if this user has compliance admin privileges.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Lightweight projection embedded in other responses.
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            user_code: self.user_code.clone(),
            employee_name: self.employee_name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Identity fields of a user embedded in assignment and audit responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UserSummary {
    pub id: UserId,
    pub user_code: String,
    pub employee_name: String,
    pub email: String,
}

/// Data required to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub user_code: String,
    pub employee_name: String,
    pub email: String,
    pub branch: Option<String>,
    /// Pre-hashed password.
    pub password_hash: String,
    pub role: UserRole,
    pub is_active: bool,
}

/// Profile fields an administrator or the owner may change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    pub employee_name: Option<String>,
    pub email: Option<String>,
    pub branch: Option<Option<String>>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}
