//! Account administration (super admin only).

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use comply_auth::password::{PasswordHasher, PasswordValidator};
use comply_core::error::AppError;
use comply_core::result::AppResult;
use comply_core::types::UserId;
use comply_core::types::pagination::{PageRequest, PageResponse};
use comply_database::repositories::UserRepository;
use comply_entity::audit::{AuditAction, EntityType};
use comply_entity::user::{CreateUser, UpdateUser, User, UserRole};

use super::code::allocate_user_code;
use crate::audit::{AuditRecorder, snapshot};
use crate::context::RequestContext;

/// Request for creating an account.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminCreateUser {
    pub employee_name: String,
    pub email: String,
    pub branch: Option<String>,
    pub role: UserRole,
    pub password: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Request for changing an account.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminUpdateUser {
    pub employee_name: Option<String>,
    pub email: Option<String>,
    pub branch: Option<String>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

/// Manages accounts on behalf of a super admin.
#[derive(Debug, Clone)]
pub struct UserAdminService {
    user_repo: Arc<UserRepository>,
    hasher: Arc<PasswordHasher>,
    validator: Arc<PasswordValidator>,
    audit: Arc<AuditRecorder>,
}

impl UserAdminService {
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

    /// Lists users, optionally filtered.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        search: Option<&str>,
        role: Option<UserRole>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<User>> {
        ctx.require_super_admin()?;
        self.user_repo.search(search, role, page).await
    }

    /// Every user, for pickers and the CLI.
    pub async fn all(&self) -> AppResult<Vec<User>> {
        self.user_repo.find_all().await
    }

    /// Load one user.
    pub async fn get(&self, ctx: &RequestContext, id: UserId) -> AppResult<User> {
        ctx.require_super_admin()?;
        self.find(id).await
    }

    async fn find(&self, id: UserId) -> AppResult<User> {
        self.user_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Creates a new account with a generated user code.
    pub async fn create(&self, ctx: Option<&RequestContext>, req: AdminCreateUser) -> AppResult<User> {
        if let Some(ctx) = ctx {
            ctx.require_super_admin()?;
        }

        let employee_name = req.employee_name.trim().to_string();
        if employee_name.is_empty() {
            return Err(AppError::validation("The employee name field is required."));
        }
        let email = req.email.trim().to_lowercase();
        if !email.contains('@') {
            return Err(AppError::validation("The email must be a valid email address."));
        }
        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("The email has already been taken."));
        }
        self.validator.validate(&req.password, &req.password)?;

        let user = self
            .user_repo
            .create(&CreateUser {
                user_code: allocate_user_code(&self.user_repo, Some(req.role)).await?,
                employee_name,
                email,
                branch: req.branch.map(|b| b.trim().to_string()).filter(|b| !b.is_empty()),
                password_hash: self.hasher.hash_password(&req.password)?,
                role: req.role,
                is_active: req.is_active,
            })
            .await?;

        self.audit
            .record(
                ctx,
                AuditAction::Created,
                EntityType::User,
                Some(user.id.into_uuid()),
                None,
                snapshot(&user),
            )
            .await;

        info!(user_id = %user.id, user_code = %user.user_code, role = %user.role, "User created");
        Ok(user)
    }

    /// Updates an account's profile, role, or active flag.
    pub async fn update(
        &self,
        ctx: Option<&RequestContext>,
        id: UserId,
        req: AdminUpdateUser,
    ) -> AppResult<User> {
        if let Some(ctx) = ctx {
            ctx.require_super_admin()?;
        }
        let before = self.find(id).await?;

        let mut update = UpdateUser {
            role: req.role,
            is_active: req.is_active,
            ..UpdateUser::default()
        };
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
                if existing.id != id {
                    return Err(AppError::conflict("The email has already been taken."));
                }
            }
            update.email = Some(email);
        }
        if let Some(branch) = req.branch {
            let branch = branch.trim().to_string();
            update.branch = Some((!branch.is_empty()).then_some(branch));
        }

        let user = self.user_repo.update(id, &update).await?;
        self.audit
            .record(
                ctx,
                AuditAction::Updated,
                EntityType::User,
                Some(user.id.into_uuid()),
                snapshot(&before),
                snapshot(&user),
            )
            .await;

        info!(user_id = %id, is_active = user.is_active, "User updated");
        Ok(user)
    }

    /// Set a new password for another user.
    pub async fn reset_password(
        &self,
        ctx: &RequestContext,
        id: UserId,
        password: &str,
        confirmation: &str,
    ) -> AppResult<()> {
        ctx.require_super_admin()?;
        let user = self.find(id).await?;
        self.validator.validate(password, confirmation)?;

        let hash = self.hasher.hash_password(password)?;
        self.user_repo.update_password(user.id, &hash).await?;

        self.audit
            .record(
                Some(ctx),
                AuditAction::ResetPasswordAdmin,
                EntityType::User,
                Some(user.id.into_uuid()),
                None,
                Some(serde_json::json!({ "description": "Admin reset user password" })),
            )
            .await;

        info!(actor_id = %ctx.user_id, user_id = %id, "Password reset by admin");
        Ok(())
    }
}
