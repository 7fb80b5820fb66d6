//! JWT token creation with configurable signing and TTL.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use comply_core::config::AuthConfig;
use comply_core::error::AppError;
use comply_core::types::{SessionId, UploadId, UserId};
use comply_entity::user::UserRole;

use super::claims::{Claims, DOWNLOAD_PURPOSE, DownloadClaims, TokenType};

/// Creates signed JWT access, refresh and download tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    encoding_key: EncodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
    download_ttl: Duration,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("download_ttl", &self.download_ttl)
            .finish()
    }
}

/// Result of a successful token pair generation.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_ttl: Duration::minutes(config.access_ttl_minutes as i64),
            refresh_ttl: Duration::hours(config.refresh_ttl_hours as i64),
            download_ttl: Duration::seconds(config.signed_url_ttl_seconds as i64),
        }
    }

    fn claims(
        &self,
        user_id: UserId,
        session_id: SessionId,
        role: UserRole,
        email: &str,
        token_type: TokenType,
        now: DateTime<Utc>,
    ) -> Claims {
        let ttl = match token_type {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
        };
        Claims {
            sub: user_id,
            sid: session_id,
            role,
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Uuid::new_v4(),
            token_type,
        }
    }

    /// Generates a new access + refresh token pair for the given user.
    pub fn generate_token_pair(
        &self,
        user_id: UserId,
        session_id: SessionId,
        role: UserRole,
        email: &str,
    ) -> Result<TokenPair, AppError> {
        let now = Utc::now();
        let access = self.claims(user_id, session_id, role, email, TokenType::Access, now);
        let refresh = self.claims(user_id, session_id, role, email, TokenType::Refresh, now);

        let access_token = encode(&Header::default(), &access, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode access token: {e}")))?;
        let refresh_token = encode(&Header::default(), &refresh, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode refresh token: {e}")))?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            access_expires_at: access.expires_at(),
            refresh_expires_at: refresh.expires_at(),
        })
    }

    /// Signs a short-lived link to one upload.
    pub fn sign_download(
        &self,
        upload_id: UploadId,
        requested_by: UserId,
        inline: bool,
    ) -> Result<(String, DateTime<Utc>), AppError> {
        let now = Utc::now();
        let expires_at = now + self.download_ttl;
        let claims = DownloadClaims {
            sub: upload_id,
            uid: requested_by,
            inline,
            purpose: DOWNLOAD_PURPOSE.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign download link: {e}")))?;
        Ok((token, expires_at))
    }
}
