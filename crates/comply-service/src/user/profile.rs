//! User self-service operations: profile and password changes.

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use comply_auth::password::{PasswordHasher, PasswordValidator};
use comply_core::error::AppError;
use comply_core::result::AppResult;
use comply_database::repositories::UserRepository;
use comply_entity::audit::{AuditAction, EntityType};
use comply_entity::user::{UpdateUser, User, UserRole};

use crate::audit::{AuditRecorder, snapshot};
use crate::context::RequestContext;

/// Fields a user may change on their own profile.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub employee_name: Option<String>,
    pub email: Option<String>,
    pub branch: Option<String>,
    /// Ignored unless the caller is a super admin.
    pub role: Option<UserRole>,
}

/// Handles the caller's own account.
#[derive(Debug, Clone)]
pub struct ProfileService {
    user_repo: Arc<UserRepository>,
    hasher: Arc<PasswordHasher>,
    validator: Arc<PasswordValidator>,
    audit: Arc<AuditRecorder>,
}

impl ProfileService {
    pub fn new(
        user_repo: Arc<UserRepository>,
        hasher: Arc<PasswordHasher>,
        validator: Arc<PasswordValidator>,
        audit: Arc<AuditRecorder>,
    ) -> Self {
        Self {
            user_repo,
            hasher,
            validator,
            audit,
        }
    }

    /// Gets the current user's full profile.
    pub async fn get_profile(&self, ctx: &RequestContext) -> AppResult<User> {
        self.user_repo
            .find_by_id(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Updates the current user's profile fields.
    pub async fn update_profile(
        &self,
        ctx: &RequestContext,
        req: UpdateProfileRequest,
    ) -> AppResult<User> {
        let before = self.get_profile(ctx).await?;
        let mut update = UpdateUser::default();

        if let Some(name) = req.employee_name {
            let name = name.trim();
            if name.is_empty() {
                return Err(AppError::validation("The employee name field is required."));
            }
            update.employee_name = Some(name.to_string());
        }

        if let Some(email) = req.email {
            let email = email.trim().to_lowercase();
            if !email.contains('@') {
                return Err(AppError::validation("The email must be a valid email address."));
            }
            if let Some(existing) = self.user_repo.find_by_email(&email).await? {
                if existing.id != ctx.user_id {
                    return Err(AppError::conflict("The email has already been taken."));
                }
            }
            update.email = Some(email);
        }

        if let Some(branch) = req.branch {
            let branch = branch.trim().to_string();
            update.branch = Some((!branch.is_empty()).then_some(branch));
        }

        // Only super admins may change their own role.
        if before.role.is_super_admin() {
            update.role = req.role;
        }

        let user = self.user_repo.update(ctx.user_id, &update).await?;
        self.audit
            .record(
                Some(ctx),
                AuditAction::Updated,
                EntityType::User,
                Some(user.id.into_uuid()),
                snapshot(&before),
                snapshot(&user),
            )
            .await;

        info!(user_id = %ctx.user_id, "Profile updated");
        Ok(user)
    }

    /// Changes the current user's password.
    pub async fn change_password(
        &self,
        ctx: &RequestContext,
        current_password: &str,
        new_password: &str,
        confirmation: &str,
    ) -> AppResult<()> {
        let user = self.get_profile(ctx).await?;

        if !self
            .hasher
            .verify_password(current_password, &user.password_hash)?
        {
            return Err(AppError::validation("The password is incorrect."));
        }
        self.validator.validate(new_password, confirmation)?;

        let hash = self.hasher.hash_password(new_password)?;
        self.user_repo.update_password(user.id, &hash).await?;

        self.audit
            .record(
                Some(ctx),
                AuditAction::ResetPassword,
                EntityType::User,
                Some(user.id.into_uuid()),
                None,
                Some(serde_json::json!({ "description": "User reset password" })),
            )
            .await;

        info!(user_id = %ctx.user_id, "Password changed");
        Ok(())
    }
}
