//! Audit log queries (super admin only).

use std::sync::Arc;

use comply_core::result::AppResult;
use comply_core::types::pagination::{PageRequest, PageResponse};
use comply_database::repositories::{AuditLogFilter, AuditLogRepository};
use comply_entity::audit::AuditLogWithActor;

use crate::context::RequestContext;

/// Read access to the audit trail.
#[derive(Debug, Clone)]
pub struct AuditService {
    audit_repo: Arc<AuditLogRepository>,
}

impl AuditService {
    pub fn new(audit_repo: Arc<AuditLogRepository>) -> Self {
        Self { audit_repo }
    }

    /// Searches the audit log.
    pub async fn search(
        &self,
        ctx: &RequestContext,
        filter: &AuditLogFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditLogWithActor>> {
        ctx.require_super_admin()?;
        self.audit_repo.search(filter, page).await
    }

    /// Latest entries for the dashboard activity feed.
    pub async fn recent(&self, limit: i64) -> AppResult<Vec<AuditLogWithActor>> {
        self.audit_repo.recent(limit).await
    }
}
