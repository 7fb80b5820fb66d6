//! Explicit audit writes at use-case boundaries.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use comply_database::repositories::AuditLogRepository;
use comply_entity::audit::{AuditAction, CreateAuditLogEntry, EntityType};

use crate::context::RequestContext;

/// Keys never written into before/after snapshots.
const REDACTED_KEYS: &[&str] = &[
    "password",
    "password_hash",
    "password_confirmation",
    "current_password",
    "new_password",
    "remember_token",
];

/// Serialize a value for an audit snapshot with password material removed.
pub fn snapshot<T: Serialize>(value: &T) -> Option<Value> {
    let mut json = serde_json::to_value(value).ok()?;
    scrub(&mut json);
    Some(json)
}

fn scrub(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|key, _| !REDACTED_KEYS.contains(&key.as_str()));
            map.values_mut().for_each(scrub);
        }
        Value::Array(items) => items.iter_mut().for_each(scrub),
        _ => {}
    }
}

/// Writes audit entries on behalf of the acting user.
///
/// Recording is best effort: the use case has already committed when it
/// is called, so a failed write is logged rather than returned.
#[derive(Debug, Clone)]
pub struct AuditRecorder {
    audit_repo: Arc<AuditLogRepository>,
}

impl AuditRecorder {
    pub fn new(audit_repo: Arc<AuditLogRepository>) -> Self {
        Self { audit_repo }
    }

    /// Record an action performed by the request's user.
    pub async fn record(
        &self,
        ctx: Option<&RequestContext>,
        action: AuditAction,
        entity_type: EntityType,
        entity_id: Option<Uuid>,
        before: Option<Value>,
        after: Option<Value>,
    ) {
        // Anonymous actions are not audited.
        let Some(ctx) = ctx else {
            return;
        };

        let entry = CreateAuditLogEntry {
            actor_user_id: ctx.user_id,
            action,
            entity_type,
            entity_id,
            before_json: before.map(|mut v| {
                scrub(&mut v);
                v
            }),
            after_json: after.map(|mut v| {
                scrub(&mut v);
                v
            }),
            ip_address: ctx.ip_address.clone(),
            user_agent: ctx.user_agent.clone(),
        };

        if let Err(e) = self.audit_repo.create(&entry).await {
            warn!(
                actor_id = %ctx.user_id,
                action = %action,
                entity_type = %entity_type,
                error = %e,
                "Failed to write audit log entry"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_snapshot_strips_password_material() {
        let value = json!({
            "email": "pic@example.com",
            "password_hash": "$argon2id$...",
            "nested": { "password": "secret", "keep": 1 },
            "list": [{ "new_password": "x", "name": "n" }]
        });
        let cleaned = snapshot(&value).unwrap();
        assert_eq!(
            cleaned,
            json!({
                "email": "pic@example.com",
                "nested": { "keep": 1 },
                "list": [{ "name": "n" }]
            })
        );
    }
}
