//! Request DTOs with validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use comply_core::types::{RequirementId, UserId};
use comply_database::repositories::AuditLogFilter;
use comply_entity::user::UserRole;
use comply_service::user::AdminCreateUser;

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "The email must be a valid email address."))]
    pub email: String,
    #[validate(length(min = 1, message = "The password field is required."))]
    pub password: String,
}

/// Token refresh request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "The refresh token field is required."))]
    pub refresh_token: String,
}

/// Own password change.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "The current password field is required."))]
    pub current_password: String,
    #[validate(length(min = 8, message = "The password must be at least 8 characters."))]
    pub password: String,
    #[serde(default)]
    pub password_confirmation: String,
}

/// Password set by a super admin for another user.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 8, message = "The password must be at least 8 characters."))]
    pub password: String,
    #[serde(default)]
    pub password_confirmation: String,
}

/// Account creation by a super admin.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(
        max = 255,
        message = "The employee name may not be greater than 255 characters."
    ))]
    pub employee_name: String,
    #[validate(email(message = "The email must be a valid email address."))]
    pub email: String,
    pub branch: Option<String>,
    pub role: UserRole,
    #[validate(length(min = 8, message = "The password must be at least 8 characters."))]
    pub password: String,
    #[serde(default)]
    pub password_confirmation: String,
    pub is_active: Option<bool>,
}

impl From<CreateUserRequest> for AdminCreateUser {
    fn from(req: CreateUserRequest) -> Self {
        Self {
            employee_name: req.employee_name,
            email: req.email,
            branch: req.branch,
            role: req.role,
            password: req.password,
            is_active: req.is_active.unwrap_or(true),
        }
    }
}

/// Filters of the user list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserListQuery {
    pub search: Option<String>,
    pub role: Option<UserRole>,
}

/// Agency creation.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAgencyRequest {
    #[validate(length(max = 50, message = "The agency id may not be greater than 50 characters."))]
    pub code: String,
    #[validate(length(max = 255, message = "The name may not be greater than 255 characters."))]
    pub name: String,
}

/// Agency rename; the code is immutable.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateAgencyRequest {
    #[validate(length(max = 255, message = "The name may not be greater than 255 characters."))]
    pub name: String,
}

/// Create or rename a position or branch/unit/department.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NameRequest {
    #[validate(length(max = 255, message = "The name may not be greater than 255 characters."))]
    pub name: String,
}

/// Approve or reject an upload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewRequest {
    pub remarks: Option<String>,
}

/// Filters of the upload list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadListQuery {
    pub requirement_id: Option<RequirementId>,
}

/// `?inline=1` on download and signed-url requests.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InlineQuery {
    pub inline: Option<String>,
}

impl InlineQuery {
    /// Accepts `1`, `true`, `yes` and `on`.
    pub fn is_inline(&self) -> bool {
        self.inline
            .as_deref()
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false)
    }
}

/// Token of a signed download link.
#[derive(Debug, Clone, Deserialize)]
pub struct SignedDownloadQuery {
    #[serde(default)]
    pub token: String,
}

/// Filters of the audit trail.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditLogQuery {
    pub actor_user_id: Option<UserId>,
    pub action: Option<String>,
    pub entity_type: Option<String>,
    pub entity_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl From<AuditLogQuery> for AuditLogFilter {
    fn from(query: AuditLogQuery) -> Self {
        Self {
            actor_user_id: query.actor_user_id,
            action: query.action.map(|a| a.trim().to_uppercase()),
            entity_type: query.entity_type,
            entity_id: query.entity_id,
            from: query.from,
            to: query.to,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_flag_parsing() {
        let on = InlineQuery {
            inline: Some("1".to_string()),
        };
        let off = InlineQuery {
            inline: Some("0".to_string()),
        };
        assert!(on.is_inline());
        assert!(!off.is_inline());
        assert!(!InlineQuery::default().is_inline());
    }

    #[test]
    fn test_login_request_validation() {
        let bad = LoginRequest {
            email: "not-an-email".to_string(),
            password: String::new(),
        };
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn test_audit_query_normalizes_action() {
        let filter: AuditLogFilter = AuditLogQuery {
            action: Some(" approved ".to_string()),
            ..AuditLogQuery::default()
        }
        .into();
        assert_eq!(filter.action.as_deref(), Some("APPROVED"));
    }
}
