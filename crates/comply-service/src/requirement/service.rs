//! Requirement CRUD with assignment synchronisation.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use comply_core::error::{AppError, ErrorKind};
use comply_core::result::AppResult;
use comply_core::traits::StorageProvider;
use comply_core::types::{
    AgencyId, AssignmentId, BranchUnitId, PageRequest, PageResponse, PositionId, RequirementId,
    SortDirection, UserId,
};
use comply_database::PgTx;
use comply_database::repositories::{
    AgencyRepository, AssignmentRepository, AssignmentWithUser, ReferenceRepository,
    RequirementFilter, RequirementRepository, RequirementRow, RequirementSort,
    RequirementStatusFilter, UploadRepository, UserRepository,
};
use comply_entity::agency::Agency;
use comply_entity::assignment::ComplianceStatus;
use comply_entity::audit::{AuditAction, EntityType};
use comply_entity::requirement::{CreateRequirement, UpdateRequirement, next_requirement_code};

use super::export::{CsvExport, export_file_name, render_export};
use super::view::{
    AssignmentDetail, MyRequirement, RequirementDetail, RequirementListItem, group_assignments,
    group_links, overall_status,
};
use crate::audit::{AuditRecorder, snapshot};
use crate::compliance::AssignmentProgress;
use crate::context::RequestContext;
use crate::notification::{ComplianceNotifier, NoticeContext};

const PAST_DEADLINE: &str = "The deadline must be a date after or equal to today.";

/// Query parameters of the requirement list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequirementQuery {
    pub agency_id: Option<AgencyId>,
    pub category: Option<String>,
    /// `na`, `compliant`/`complied`, `overdue` or `pending`.
    pub status: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_dir: Option<String>,
}

impl RequirementQuery {
    fn filter(&self) -> RequirementFilter {
        RequirementFilter {
            agency_id: self.agency_id,
            category: self.category.clone(),
            status: self
                .status
                .as_deref()
                .and_then(RequirementStatusFilter::parse),
            search: self.search.clone(),
            assigned_to: None,
        }
    }
}

/// A validated requirement ready to be written.
#[derive(Debug, Clone)]
pub(crate) struct NewRequirement {
    pub agency: Agency,
    pub category: String,
    pub title: String,
    pub description: Option<String>,
    pub frequency: String,
    pub schedule: Option<String>,
    pub deadline: Option<NaiveDate>,
    pub position_ids: Vec<PositionId>,
    pub branch_unit_ids: Vec<BranchUnitId>,
    pub pic_ids: Vec<UserId>,
}

/// Requirement use cases. Reads are open to every authenticated user;
/// writes require an admin.
#[derive(Debug, Clone)]
pub struct RequirementService {
    requirement_repo: Arc<RequirementRepository>,
    assignment_repo: Arc<AssignmentRepository>,
    upload_repo: Arc<UploadRepository>,
    agency_repo: Arc<AgencyRepository>,
    user_repo: Arc<UserRepository>,
    positions: Arc<ReferenceRepository>,
    branch_units: Arc<ReferenceRepository>,
    notifier: Arc<ComplianceNotifier>,
    audit: Arc<AuditRecorder>,
    storage: Arc<dyn StorageProvider>,
}

impl RequirementService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        requirement_repo: Arc<RequirementRepository>,
        assignment_repo: Arc<AssignmentRepository>,
        upload_repo: Arc<UploadRepository>,
        agency_repo: Arc<AgencyRepository>,
        user_repo: Arc<UserRepository>,
        positions: Arc<ReferenceRepository>,
        branch_units: Arc<ReferenceRepository>,
        notifier: Arc<ComplianceNotifier>,
        audit: Arc<AuditRecorder>,
        storage: Arc<dyn StorageProvider>,
    ) -> Self {
        Self {
            requirement_repo,
            assignment_repo,
            upload_repo,
            agency_repo,
            user_repo,
            positions,
            branch_units,
            notifier,
            audit,
            storage,
        }
    }

    pub(crate) fn positions(&self) -> &ReferenceRepository {
        &self.positions
    }

    pub(crate) fn branch_units(&self) -> &ReferenceRepository {
        &self.branch_units
    }

    /// Filtered, sorted page of requirements with their aggregate status.
    pub async fn list(
        &self,
        query: &RequirementQuery,
        page: &PageRequest,
    ) -> AppResult<PageResponse<RequirementListItem>> {
        let sort = RequirementSort::parse(query.sort_by.as_deref());
        let direction = SortDirection::parse_lenient(query.sort_dir.as_deref());
        let rows = self
            .requirement_repo
            .search(&query.filter(), sort, direction, page)
            .await?;

        let ids: Vec<RequirementId> = rows.items.iter().map(|r| r.requirement.id).collect();
        let mut positions = group_links(self.requirement_repo.position_links(&ids).await?);
        let mut branch_units = group_links(self.requirement_repo.branch_unit_links(&ids).await?);
        let mut assignments = group_assignments(
            self.assignment_repo
                .with_users_for_requirements(&ids)
                .await?,
        );

        let today = Utc::now().date_naive();
        Ok(rows.map(|row| {
            let id = row.requirement.id;
            let assignments = assignments.remove(&id).unwrap_or_default();
            RequirementListItem {
                compliance_status: overall_status(&row, &assignments, today),
                positions: positions.remove(&id).unwrap_or_default(),
                branch_unit_departments: branch_units.remove(&id).unwrap_or_default(),
                assignments,
                requirement: row,
            }
        }))
    }

    /// Requirements assigned to the caller, each with the caller's own status.
    pub async fn my(&self, ctx: &RequestContext) -> AppResult<Vec<MyRequirement>> {
        let rows = self.requirement_repo.assigned_to(ctx.user_id).await?;
        let mut own: HashMap<RequirementId, _> = self
            .assignment_repo
            .for_user(ctx.user_id)
            .await?
            .into_iter()
            .map(|a| (a.requirement_id, a))
            .collect();

        Ok(rows
            .into_iter()
            .map(|row| {
                let assignment = own.remove(&row.requirement.id);
                MyRequirement {
                    compliance_status: assignment
                        .as_ref()
                        .map(|a| a.compliance_status)
                        .unwrap_or(ComplianceStatus::Pending),
                    assignment,
                    requirement: row,
                }
            })
            .collect())
    }

    async fn find_row(&self, id: RequirementId) -> AppResult<RequirementRow> {
        self.requirement_repo
            .find_row(id)
            .await?
            .ok_or_else(|| AppError::not_found("Requirement not found"))
    }

    /// A requirement with its links, assignments, and each PIC's uploads.
    pub async fn show(&self, id: RequirementId) -> AppResult<RequirementDetail> {
        let row = self.find_row(id).await?;
        let ids = [id];
        let positions = group_links(self.requirement_repo.position_links(&ids).await?)
            .remove(&id)
            .unwrap_or_default();
        let branch_units = group_links(self.requirement_repo.branch_unit_links(&ids).await?)
            .remove(&id)
            .unwrap_or_default();
        let assignments = self.assignment_repo.with_users_for_requirement(id).await?;
        let uploads = self.upload_repo.for_requirements(&ids).await?;

        let compliance_status = overall_status(&row, &assignments, Utc::now().date_naive());
        let assignments = assignments
            .into_iter()
            .map(|assignment| {
                let user_id = assignment.assignment.user_id;
                AssignmentDetail {
                    uploads: uploads
                        .iter()
                        .filter(|u| u.upload.uploader_id == user_id)
                        .cloned()
                        .collect(),
                    assignment,
                }
            })
            .collect();

        Ok(RequirementDetail {
            requirement: row,
            positions,
            branch_unit_departments: branch_units,
            assignments,
            compliance_status,
        })
    }

    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: CreateRequirement,
    ) -> AppResult<RequirementDetail> {
        ctx.require_admin()?;

        let agency = self
            .agency_repo
            .find_by_id(input.agency_id)
            .await?
            .ok_or_else(|| AppError::validation("The selected agency id is invalid."))?;
        if let Some(deadline) = input.deadline {
            ensure_not_past(deadline)?;
        }

        let new = NewRequirement {
            agency,
            category: required(&input.category, "category")?,
            title: required(&input.title, "requirement")?,
            description: optional(input.description.as_deref()),
            frequency: required(&input.frequency, "frequency")?,
            schedule: optional(input.schedule.as_deref()),
            deadline: input.deadline,
            position_ids: self.checked_positions(&input.position_ids).await?,
            branch_unit_ids: self.checked_branch_units(&input.branch_unit_ids).await?,
            pic_ids: self.checked_pics(&input.pic_ids).await?,
        };

        let row = self.persist(new).await?;
        let detail = self.show(row.requirement.id).await?;

        self.audit
            .record(
                Some(ctx),
                AuditAction::Created,
                EntityType::Requirement,
                Some(row.requirement.id.into_uuid()),
                None,
                snapshot(&detail),
            )
            .await;
        info!(
            actor_id = %ctx.user_id,
            req_code = %row.requirement.req_code,
            pics = detail.assignments.len(),
            "Requirement created"
        );
        Ok(detail)
    }

    /// Write a validated requirement with its links and PENDING assignments,
    /// then tell the new assignees.
    pub(crate) async fn persist(&self, new: NewRequirement) -> AppResult<RequirementRow> {
        let mut tx = self.requirement_repo.begin().await?;

        let latest = self
            .requirement_repo
            .lock_latest_code(&mut tx, new.agency.id)
            .await?;
        let code = next_requirement_code(&new.agency.code, latest.as_deref());

        let requirement = self
            .requirement_repo
            .insert(
                &mut tx,
                &code,
                new.agency.id,
                &new.category,
                &new.title,
                new.description.as_deref(),
                &new.frequency,
                new.schedule.as_deref(),
                new.deadline,
            )
            .await?;
        self.requirement_repo
            .set_positions(&mut tx, requirement.id, &new.position_ids)
            .await?;
        self.requirement_repo
            .set_branch_units(&mut tx, requirement.id, &new.branch_unit_ids)
            .await?;
        for user_id in &new.pic_ids {
            self.assignment_repo
                .insert(&mut tx, requirement.id, *user_id, new.deadline)
                .await?;
        }
        commit(tx).await?;

        let row = self.find_row(requirement.id).await?;
        let assignments = self
            .assignment_repo
            .with_users_for_requirement(requirement.id)
            .await?;
        self.notifier
            .notify_assignments(&row, &assignments, NoticeContext::Assigned)
            .await;
        Ok(row)
    }

    /// Apply a partial update and keep the assignment set in step with the PIC list.
    ///
    /// Removed PICs lose their assignment, added PICs get a PENDING one. A
    /// moved deadline resets every assignment of the requirement and
    /// notifies all of them; otherwise only new assignees are notified.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: RequirementId,
        input: UpdateRequirement,
    ) -> AppResult<RequirementDetail> {
        ctx.require_admin()?;
        let before = self.show(id).await?;
        let original_deadline = before.requirement.requirement.deadline;
        let mut requirement = before.requirement.requirement.clone();

        if let Some(agency_id) = input.agency_id {
            self.agency_repo
                .find_by_id(agency_id)
                .await?
                .ok_or_else(|| AppError::validation("The selected agency id is invalid."))?;
            requirement.agency_id = agency_id;
        }
        if let Some(category) = &input.category {
            requirement.category = required(category, "category")?;
        }
        if let Some(title) = &input.title {
            requirement.title = required(title, "requirement")?;
        }
        if let Some(frequency) = &input.frequency {
            requirement.frequency = required(frequency, "frequency")?;
        }
        if let Some(description) = &input.description {
            requirement.description = optional(description.as_deref());
        }
        if let Some(schedule) = &input.schedule {
            requirement.schedule = optional(schedule.as_deref());
        }
        if let Some(deadline) = input.deadline {
            if let Some(date) = deadline.filter(|d| Some(*d) != original_deadline) {
                ensure_not_past(date)?;
            }
            requirement.deadline = deadline;
        }
        let deadline_changed = matches!(
            input.deadline,
            Some(Some(date)) if Some(date) != original_deadline
        );

        let position_ids = match &input.position_ids {
            Some(ids) => Some(self.checked_positions(ids).await?),
            None => None,
        };
        let branch_unit_ids = match &input.branch_unit_ids {
            Some(ids) => Some(self.checked_branch_units(ids).await?),
            None => None,
        };
        let pic_ids = match &input.pic_ids {
            Some(ids) => Some(self.checked_pics(ids).await?),
            None => None,
        };

        let mut tx = self.requirement_repo.begin().await?;
        self.requirement_repo.save(&mut tx, &requirement).await?;
        if let Some(ids) = &position_ids {
            self.requirement_repo.set_positions(&mut tx, id, ids).await?;
        }
        if let Some(ids) = &branch_unit_ids {
            self.requirement_repo
                .set_branch_units(&mut tx, id, ids)
                .await?;
        }

        let mut added: Vec<AssignmentId> = Vec::new();
        if let Some(wanted) = &pic_ids {
            // The requirement row is locked by `save`; diff against the
            // assignments as they stand inside this transaction.
            let current: Vec<UserId> = self
                .assignment_repo
                .lock_for_requirement(&mut tx, id)
                .await?
                .iter()
                .map(|a| a.user_id)
                .collect();
            let (removed, fresh) = pic_diff(&current, wanted);

            self.assignment_repo
                .delete_users(&mut tx, id, &removed)
                .await?;
            for user_id in fresh {
                let assignment = self
                    .assignment_repo
                    .insert(&mut tx, id, user_id, requirement.deadline)
                    .await?;
                added.push(assignment.id);
            }
        }

        if input.deadline.is_some() {
            self.assignment_repo
                .sync_deadline(&mut tx, id, requirement.deadline)
                .await?;
        }
        if deadline_changed {
            for assignment in self.assignment_repo.lock_for_requirement(&mut tx, id).await? {
                let progress = AssignmentProgress::of(&assignment).on_deadline_changed();
                self.save_progress(&mut tx, assignment.id, progress).await?;
            }
        }
        commit(tx).await?;

        let after = self.show(id).await?;
        let assignments: Vec<AssignmentWithUser> = after
            .assignments
            .iter()
            .map(|a| a.assignment.clone())
            .collect();
        if deadline_changed {
            self.notifier
                .notify_assignments(&after.requirement, &assignments, NoticeContext::Updated)
                .await;
        } else if !added.is_empty() {
            let fresh: Vec<AssignmentWithUser> = assignments
                .into_iter()
                .filter(|a| added.contains(&a.assignment.id))
                .collect();
            self.notifier
                .notify_assignments(&after.requirement, &fresh, NoticeContext::Assigned)
                .await;
        }

        self.audit
            .record(
                Some(ctx),
                AuditAction::Updated,
                EntityType::Requirement,
                Some(id.into_uuid()),
                snapshot(&before),
                snapshot(&after),
            )
            .await;
        info!(
            actor_id = %ctx.user_id,
            req_code = %requirement.req_code,
            deadline_changed,
            added = added.len(),
            "Requirement updated"
        );
        Ok(after)
    }

    /// Delete a requirement; its assignments and uploads cascade and the
    /// stored files are removed best-effort.
    pub async fn delete(&self, ctx: &RequestContext, id: RequirementId) -> AppResult<()> {
        ctx.require_admin()?;
        let before = self.show(id).await?;
        let uploads = self.upload_repo.for_requirements(&[id]).await?;

        if !self.requirement_repo.delete(id).await? {
            return Err(AppError::not_found("Requirement not found"));
        }
        for upload in &uploads {
            if let Err(e) = self.storage.delete(&upload.upload.file_path).await {
                warn!(
                    upload_id = %upload.upload.id,
                    path = %upload.upload.file_path,
                    error = %e,
                    "Failed to delete stored file of removed requirement"
                );
            }
        }

        self.audit
            .record(
                Some(ctx),
                AuditAction::Deleted,
                EntityType::Requirement,
                Some(id.into_uuid()),
                snapshot(&before),
                None,
            )
            .await;
        info!(
            actor_id = %ctx.user_id,
            req_code = %before.requirement.requirement.req_code,
            files = uploads.len(),
            "Requirement deleted"
        );
        Ok(())
    }

    /// CSV of every requirement matching the filters, newest update first.
    pub async fn export(&self, query: &RequirementQuery) -> AppResult<CsvExport> {
        let filter = RequirementFilter {
            status: None,
            ..query.filter()
        };
        let rows = self.requirement_repo.export_rows(&filter).await?;
        let ids: Vec<RequirementId> = rows.iter().map(|r| r.requirement.id).collect();
        let assignments = group_assignments(
            self.assignment_repo
                .with_users_for_requirements(&ids)
                .await?,
        );

        let today = Utc::now().date_naive();
        let content = render_export(&rows, &assignments, today);
        Ok(CsvExport {
            file_name: export_file_name(today),
            content,
        })
    }

    async fn save_progress(
        &self,
        tx: &mut PgTx<'_>,
        id: AssignmentId,
        progress: AssignmentProgress,
    ) -> AppResult<()> {
        self.assignment_repo
            .save_progress(
                tx,
                id,
                progress.status,
                progress.last_submitted_at,
                progress.last_approved_at,
            )
            .await?;
        Ok(())
    }

    async fn checked_positions(&self, ids: &[PositionId]) -> AppResult<Vec<PositionId>> {
        let known = known_ids(&self.positions).await?;
        let ids = dedup(ids);
        if ids.iter().any(|id| !known.contains(id.as_uuid())) {
            return Err(AppError::validation("The selected position ids is invalid."));
        }
        Ok(ids)
    }

    async fn checked_branch_units(&self, ids: &[BranchUnitId]) -> AppResult<Vec<BranchUnitId>> {
        let known = known_ids(&self.branch_units).await?;
        let ids = dedup(ids);
        if ids.iter().any(|id| !known.contains(id.as_uuid())) {
            return Err(AppError::validation(
                "The selected branch unit department ids is invalid.",
            ));
        }
        Ok(ids)
    }

    async fn checked_pics(&self, ids: &[UserId]) -> AppResult<Vec<UserId>> {
        let ids = dedup(ids);
        if ids.is_empty() {
            return Ok(ids);
        }
        let found = self.user_repo.find_by_ids(&ids).await?;
        if found.len() != ids.len() {
            return Err(AppError::validation(
                "The selected person in charge ids is invalid.",
            ));
        }
        Ok(ids)
    }
}

async fn known_ids(repo: &ReferenceRepository) -> AppResult<HashSet<Uuid>> {
    Ok(repo.name_index().await?.into_iter().map(|(id, _)| id).collect())
}

/// Remove duplicates, keeping first-seen order.
fn dedup<T: Copy + Eq + std::hash::Hash>(ids: &[T]) -> Vec<T> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

fn required(value: &str, field: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::validation(format!("The {field} field is required.")));
    }
    Ok(value.to_string())
}

fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Users to unassign and users to newly assign, in `wanted` order.
fn pic_diff(current: &[UserId], wanted: &[UserId]) -> (Vec<UserId>, Vec<UserId>) {
    let current_set: HashSet<UserId> = current.iter().copied().collect();
    let wanted_set: HashSet<UserId> = wanted.iter().copied().collect();
    let removed = current
        .iter()
        .filter(|u| !wanted_set.contains(u))
        .copied()
        .collect();
    let fresh = wanted
        .iter()
        .filter(|u| !current_set.contains(u))
        .copied()
        .collect();
    (removed, fresh)
}

fn ensure_not_past(deadline: NaiveDate) -> AppResult<()> {
    if deadline < Utc::now().date_naive() {
        return Err(AppError::validation(PAST_DEADLINE));
    }
    Ok(())
}

pub(crate) async fn commit(tx: PgTx<'_>) -> AppResult<()> {
    tx.commit()
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_dedup_keeps_first_seen_order() {
        let a = UserId::new();
        let b = UserId::new();
        assert_eq!(dedup(&[a, b, a]), vec![a, b]);
    }

    #[test]
    fn test_pic_diff_splits_removed_and_fresh() {
        let (a, b, c) = (UserId::new(), UserId::new(), UserId::new());
        let (removed, fresh) = pic_diff(&[a, b], &[b, c]);
        assert_eq!(removed, vec![a]);
        assert_eq!(fresh, vec![c]);
    }

    #[test]
    fn test_pic_diff_same_set_is_a_no_op() {
        let (a, b) = (UserId::new(), UserId::new());
        let (removed, fresh) = pic_diff(&[a, b], &[b, a]);
        assert!(removed.is_empty());
        assert!(fresh.is_empty());
    }

    #[test]
    fn test_required_trims() {
        assert_eq!(required("  Permits ", "category").unwrap(), "Permits");
        let err = required("   ", "frequency").unwrap_err();
        assert_eq!(err.message, "The frequency field is required.");
    }

    #[test]
    fn test_optional_drops_blank() {
        assert_eq!(optional(Some("  ")), None);
        assert_eq!(optional(Some(" Q1 ")), Some("Q1".to_string()));
        assert_eq!(optional(None), None);
    }

    #[test]
    fn test_past_deadline_rejected() {
        let today = Utc::now().date_naive();
        assert!(ensure_not_past(today).is_ok());
        let err = ensure_not_past(today - Duration::days(1)).unwrap_err();
        assert!(err.is(ErrorKind::Validation));
        assert_eq!(err.message, PAST_DEADLINE);
    }

    #[test]
    fn test_query_filter_parses_status() {
        let query = RequirementQuery {
            status: Some("compliant".to_string()),
            ..RequirementQuery::default()
        };
        assert_eq!(query.filter().status, Some(RequirementStatusFilter::Complied));
    }
}
