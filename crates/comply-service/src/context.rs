//! Request context carrying the authenticated user and request origin.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use comply_core::types::{SessionId, UserId};
use comply_entity::user::UserRole;

/// Context for the current authenticated request.
///
/// Extracted from the bearer token and passed into service methods so that
/// every operation knows *who* is acting and from *where*.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: UserId,
    /// The login session the token belongs to.
    pub session_id: SessionId,
    /// The user's role at the time the JWT was issued.
    pub role: UserRole,
    /// Login email (convenience field from JWT claims).
    pub email: String,
    /// IP address of the request origin.
    pub ip_address: Option<String>,
    /// User-Agent header value.
    pub user_agent: Option<String>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(
        user_id: UserId,
        session_id: SessionId,
        role: UserRole,
        email: String,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> Self {
        Self {
            user_id,
            session_id,
            role,
            email,
            ip_address,
            user_agent,
            request_time: Utc::now(),
        }
    }

    /// Whether the caller is a super admin or admin specialist.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Whether the caller is a super admin.
    pub fn is_super_admin(&self) -> bool {
        self.role.is_super_admin()
    }

    /// Fail with 403 unless the caller is an admin.
    pub fn require_admin(&self) -> Result<(), comply_core::AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(comply_core::AppError::authorization("Forbidden"))
        }
    }

    /// Fail with 403 unless the caller is a super admin.
    pub fn require_super_admin(&self) -> Result<(), comply_core::AppError> {
        if self.is_super_admin() {
            Ok(())
        } else {
            Err(comply_core::AppError::authorization("Forbidden"))
        }
    }
}
