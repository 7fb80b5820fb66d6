//! JWT claims for API tokens and signed download links.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use comply_core::types::{SessionId, UploadId, UserId};
use comply_entity::user::UserRole;

/// JWT claims payload embedded in every access and refresh token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user ID.
    pub sub: UserId,
    /// Login session this token belongs to; shared by a token pair.
    pub sid: SessionId,
    /// User role at the time of token issuance.
    pub role: UserRole,
    /// Login email for log correlation.
    pub email: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    pub jti: Uuid,
    pub token_type: TokenType,
}

/// Distinguishes access tokens from refresh tokens.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Short-lived access token for API requests.
    Access,
    /// Long-lived refresh token for obtaining new access tokens.
    Refresh,
}

impl Claims {
    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}

/// Purpose marker carried by download tokens.
pub const DOWNLOAD_PURPOSE: &str = "download";

/// Claims of a signed, short-lived link to one uploaded document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadClaims {
    /// The upload the link grants access to.
    pub sub: UploadId,
    /// Who requested the link.
    pub uid: UserId,
    /// Serve with `Content-Disposition: inline`.
    pub inline: bool,
    pub purpose: String,
    pub iat: i64,
    pub exp: i64,
}
