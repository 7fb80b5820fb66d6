//! Login, token refresh, and logout.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use comply_auth::jwt::{JwtDecoder, JwtEncoder, TokenPair};
use comply_auth::password::PasswordHasher;
use comply_core::error::AppError;
use comply_core::result::AppResult;
use comply_core::types::SessionId;
use comply_database::repositories::UserRepository;
use comply_entity::audit::{AuditAction, EntityType};
use comply_entity::user::User;

use crate::audit::AuditRecorder;
use crate::context::RequestContext;

const INVALID_CREDENTIALS: &str = "The provided credentials do not match our records.";
const INACTIVE_ACCOUNT: &str = "This account is inactive. Please contact your administrator.";

/// Tokens plus the user they were issued to.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    #[serde(flatten)]
    pub tokens: TokenPair,
    pub user: User,
}

/// Issues and renews bearer tokens.
#[derive(Debug, Clone)]
pub struct AuthService {
    user_repo: Arc<UserRepository>,
    hasher: Arc<PasswordHasher>,
    encoder: Arc<JwtEncoder>,
    decoder: Arc<JwtDecoder>,
    audit: Arc<AuditRecorder>,
}

impl AuthService {
    pub fn new(
        user_repo: Arc<UserRepository>,
        hasher: Arc<PasswordHasher>,
        encoder: Arc<JwtEncoder>,
        decoder: Arc<JwtDecoder>,
        audit: Arc<AuditRecorder>,
    ) -> Self {
        Self {
            user_repo,
            hasher,
            encoder,
            decoder,
            audit,
        }
    }

    /// Authenticate by email and password.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> AppResult<LoginResult> {
        let email = email.trim();
        let Some(user) = self.user_repo.find_by_email(email).await? else {
            warn!(email = %email, "Login failed: unknown email");
            return Err(AppError::authentication(INVALID_CREDENTIALS));
        };

        if !self.hasher.verify_password(password, &user.password_hash)? {
            warn!(email = %email, "Login failed: wrong password");
            return Err(AppError::authentication(INVALID_CREDENTIALS));
        }
        if !user.is_active {
            warn!(user_id = %user.id, "Login refused: account inactive");
            return Err(AppError::authorization(INACTIVE_ACCOUNT));
        }

        let session_id = SessionId::new();
        let tokens = self
            .encoder
            .generate_token_pair(user.id, session_id, user.role, &user.email)?;
        self.user_repo.touch_last_login(user.id).await?;

        let ctx = RequestContext::new(
            user.id,
            session_id,
            user.role,
            user.email.clone(),
            ip_address,
            user_agent,
        );
        self.audit
            .record(
                Some(&ctx),
                AuditAction::Login,
                EntityType::User,
                Some(user.id.into_uuid()),
                None,
                Some(serde_json::json!({ "description": "User logged in" })),
            )
            .await;

        info!(user_id = %user.id, session_id = %session_id, "User logged in");
        Ok(LoginResult { tokens, user })
    }

    /// Exchange a refresh token for a new pair within the same session.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<TokenPair> {
        let claims = self.decoder.decode_refresh_token(refresh_token)?;
        let user = self
            .user_repo
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| AppError::authentication("User no longer exists"))?;
        if !user.is_active {
            return Err(AppError::authorization(INACTIVE_ACCOUNT));
        }
        self.encoder
            .generate_token_pair(user.id, claims.sid, user.role, &user.email)
    }

    /// Record the end of a session. Tokens expire on their own.
    pub async fn logout(&self, ctx: &RequestContext) {
        self.audit
            .record(
                Some(ctx),
                AuditAction::Logout,
                EntityType::User,
                Some(ctx.user_id.into_uuid()),
                None,
                Some(serde_json::json!({ "description": "User logged out" })),
            )
            .await;
        info!(user_id = %ctx.user_id, session_id = %ctx.session_id, "User logged out");
    }

    /// The authenticated user's record.
    pub async fn me(&self, ctx: &RequestContext) -> AppResult<User> {
        self.user_repo
            .find_by_id(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }
}
