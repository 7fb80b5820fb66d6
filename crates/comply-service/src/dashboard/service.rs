//! Dashboard queries.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use comply_core::result::AppResult;
use comply_core::types::RequirementId;
use comply_database::repositories::{
    AgencyRepository, AssignmentRepository, AssignmentWithUser, AuditLogRepository,
    RequirementRepository, RequirementRow, UploadRepository,
};
use comply_entity::audit::AuditLogWithActor;

use super::aggregate::{self, AgencyStats, CalendarEntry, DashboardStats};
use crate::context::RequestContext;
use crate::requirement::view::group_assignments;

/// Entries shown in the activity feed.
const ACTIVITY_LIMIT: i64 = 10;

/// Read-only aggregates for the landing page.
#[derive(Debug, Clone)]
pub struct DashboardService {
    agency_repo: Arc<AgencyRepository>,
    requirement_repo: Arc<RequirementRepository>,
    assignment_repo: Arc<AssignmentRepository>,
    upload_repo: Arc<UploadRepository>,
    audit_repo: Arc<AuditLogRepository>,
}

impl DashboardService {
    pub fn new(
        agency_repo: Arc<AgencyRepository>,
        requirement_repo: Arc<RequirementRepository>,
        assignment_repo: Arc<AssignmentRepository>,
        upload_repo: Arc<UploadRepository>,
        audit_repo: Arc<AuditLogRepository>,
    ) -> Self {
        Self {
            agency_repo,
            requirement_repo,
            assignment_repo,
            upload_repo,
            audit_repo,
        }
    }

    /// Requirements in scope for the caller with their assignments grouped.
    async fn load(
        &self,
        ctx: Option<&RequestContext>,
    ) -> AppResult<(Vec<RequirementRow>, HashMap<RequirementId, Vec<AssignmentWithUser>>)> {
        let scope = ctx.filter(|c| !c.is_admin()).map(|c| c.user_id);
        let rows = self.requirement_repo.all_rows(scope).await?;
        let ids: Vec<RequirementId> = rows.iter().map(|r| r.requirement.id).collect();
        let assignments = group_assignments(
            self.assignment_repo
                .with_users_for_requirements(&ids)
                .await?,
        );
        Ok((rows, assignments))
    }

    /// Organisation-wide headline counters.
    pub async fn stats(&self) -> AppResult<DashboardStats> {
        let (rows, assignments) = self.load(None).await?;
        let total_agencies = self.agency_repo.count().await?;
        let for_approval = self.upload_repo.count_pending().await?;
        Ok(aggregate::compute_stats(
            &rows,
            &assignments,
            total_agencies,
            for_approval,
        ))
    }

    pub async fn activity(&self) -> AppResult<Vec<AuditLogWithActor>> {
        self.audit_repo.recent(ACTIVITY_LIMIT).await
    }

    /// Bucket counts per agency; PICs only count requirements assigned to them.
    pub async fn agency_stats(&self, ctx: &RequestContext) -> AppResult<Vec<AgencyStats>> {
        let (rows, assignments) = self.load(Some(ctx)).await?;
        Ok(aggregate::agency_stats(&rows, &assignments))
    }

    /// Deadline calendar; PICs see their own requirements and statuses.
    pub async fn calendar(
        &self,
        ctx: &RequestContext,
    ) -> AppResult<BTreeMap<String, Vec<CalendarEntry>>> {
        let (rows, assignments) = self.load(Some(ctx)).await?;
        let pending = self.upload_repo.pending_cycles().await?;
        let viewer = (!ctx.is_admin()).then_some(ctx.user_id);
        Ok(aggregate::calendar(&rows, &assignments, &pending, viewer))
    }
}
