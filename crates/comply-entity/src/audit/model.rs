//! Audit log entry entity model.

use chrono::{DateTime, Utc};
use comply_core::types::{AuditLogId, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::action::{AuditAction, EntityType};

/// An immutable audit log entry recording a state change.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditLogEntry {
    pub id: AuditLogId,
    /// The user who performed the action.
    pub actor_user_id: Option<UserId>,
    /// Action name, e.g. `"CREATED"` or `"RESET_PASSWORD_ADMIN"`.
    pub action: String,
    /// Entity type, e.g. `"requirement"`.
    pub entity_type: String,
    pub entity_id: Option<Uuid>,
    /// Snapshot before the change. Never contains password material.
    pub before_json: Option<serde_json::Value>,
    /// Snapshot after the change. Never contains password material.
    pub after_json: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An audit entry joined with its actor's name for activity feeds.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditLogWithActor {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub entry: AuditLogEntry,
    pub actor_name: Option<String>,
    pub actor_email: Option<String>,
}

/// Data required to create a new audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAuditLogEntry {
    pub actor_user_id: UserId,
    pub action: AuditAction,
    pub entity_type: EntityType,
    pub entity_id: Option<Uuid>,
    pub before_json: Option<serde_json::Value>,
    pub after_json: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}
