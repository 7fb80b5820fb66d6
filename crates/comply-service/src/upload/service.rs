//! Upload storage and review.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{Datelike, NaiveDate, Utc};
use tracing::{info, warn};

use comply_core::config::StorageConfig;
use comply_core::error::AppError;
use comply_core::result::AppResult;
use comply_core::traits::StorageProvider;
use comply_core::types::{PageRequest, PageResponse, RequirementId, UploadId};
use comply_database::PgTx;
use comply_database::repositories::{
    AssignmentRepository, RequirementRepository, UploadRepository, UploadRow,
    UserRepository,
};
use comply_entity::assignment::RequirementAssignment;
use comply_entity::audit::{AuditAction, EntityType};
use comply_entity::upload::{ApprovalStatus, CreateUpload, Upload, generate_upload_code};

use super::admission::{APPROVED_EXISTS, check_document, effective_deadline};
use crate::audit::{AuditRecorder, snapshot};
use crate::compliance::AssignmentProgress;
use crate::context::RequestContext;
use crate::notification::ComplianceNotifier;
use crate::requirement::service::commit;

/// Directory under the storage root that holds compliance documents.
const DOCUMENT_DIR: &str = "compliance_docs";

/// A document submitted through the upload form.
#[derive(Debug, Clone)]
pub struct NewUpload {
    pub requirement_id: RequirementId,
    pub file_name: String,
    pub bytes: Bytes,
    pub comments: Option<String>,
    /// Honoured for admins only.
    pub deadline_at_upload: Option<NaiveDate>,
    /// Honoured for admins only; defaults to PENDING.
    pub approval_status: Option<ApprovalStatus>,
    /// Honoured for admins only.
    pub admin_remarks: Option<String>,
}

/// Stores uploads under admission control and applies review decisions.
#[derive(Debug, Clone)]
pub struct UploadService {
    upload_repo: Arc<UploadRepository>,
    assignment_repo: Arc<AssignmentRepository>,
    requirement_repo: Arc<RequirementRepository>,
    user_repo: Arc<UserRepository>,
    storage: Arc<dyn StorageProvider>,
    notifier: Arc<ComplianceNotifier>,
    audit: Arc<AuditRecorder>,
    config: StorageConfig,
}

impl UploadService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        upload_repo: Arc<UploadRepository>,
        assignment_repo: Arc<AssignmentRepository>,
        requirement_repo: Arc<RequirementRepository>,
        user_repo: Arc<UserRepository>,
        storage: Arc<dyn StorageProvider>,
        notifier: Arc<ComplianceNotifier>,
        audit: Arc<AuditRecorder>,
        config: StorageConfig,
    ) -> Self {
        Self {
            upload_repo,
            assignment_repo,
            requirement_repo,
            user_repo,
            storage,
            notifier,
            audit,
            config,
        }
    }

    /// Store a document and advance the uploader's assignment.
    ///
    /// The assignment row stays locked from the admission check until the
    /// upload row and the status change commit, so two concurrent uploads
    /// for the same cycle cannot both pass the approved-upload check.
    pub async fn store(&self, ctx: &RequestContext, input: NewUpload) -> AppResult<Upload> {
        check_document(&self.config, &input.file_name, &input.bytes)?;
        let requirement = self
            .requirement_repo
            .find_row(input.requirement_id)
            .await?
            .ok_or_else(|| AppError::validation("The selected requirement id is invalid."))?;
        let is_admin = ctx.is_admin();

        let mut tx = self.upload_repo.begin().await?;
        let assignment = self
            .assignment_repo
            .lock_for(&mut tx, input.requirement_id, ctx.user_id)
            .await?;
        let deadline = effective_deadline(
            is_admin,
            assignment.as_ref(),
            requirement.requirement.deadline,
        )?;

        if let Some(deadline) = deadline.filter(|_| !is_admin) {
            let approved = self
                .upload_repo
                .approved_exists(&mut tx, input.requirement_id, ctx.user_id, deadline)
                .await?;
            if approved {
                return Err(AppError::validation(APPROVED_EXISTS));
            }
        }

        let (approval_status, admin_remarks, deadline_at_upload) = if is_admin {
            (
                input.approval_status.unwrap_or(ApprovalStatus::Pending),
                input.admin_remarks.clone(),
                input.deadline_at_upload.or(deadline),
            )
        } else {
            (ApprovalStatus::Pending, None, deadline)
        };

        let now = Utc::now();
        let path = format!("{DOCUMENT_DIR}/{}.pdf", UploadId::new());
        let size_bytes = input.bytes.len() as i64;
        self.storage.write(&path, input.bytes.clone()).await?;

        let data = CreateUpload {
            upload_code: generate_upload_code(),
            requirement_id: input.requirement_id,
            assignment_id: assignment.as_ref().map(|a| a.id),
            uploader_id: ctx.user_id,
            uploader_email: Some(ctx.email.clone()),
            file_path: path.clone(),
            original_name: input.file_name.trim().to_string(),
            size_bytes,
            comments: input
                .comments
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
            upload_year: now.year(),
            upload_date: now,
            deadline_at_upload,
            approval_status,
            status_change_on: approval_status.is_reviewed().then_some(now),
            admin_remarks,
        };

        let upload = match self.record(tx, &data, assignment.as_ref()).await {
            Ok(upload) => upload,
            Err(e) => {
                self.discard_file(&path).await;
                return Err(e);
            }
        };

        if approval_status == ApprovalStatus::Pending {
            let admins = self.user_repo.find_active_admins().await?;
            let uploader_name = self.uploader_name(&upload).await;
            self.notifier
                .notify_submitted(&admins, &requirement, &upload, &uploader_name)
                .await;
        }

        self.audit
            .record(
                Some(ctx),
                AuditAction::Created,
                EntityType::Upload,
                Some(upload.id.into_uuid()),
                None,
                snapshot(&upload),
            )
            .await;
        info!(
            actor_id = %ctx.user_id,
            upload = %upload.upload_code,
            req_code = %requirement.requirement.req_code,
            status = %upload.approval_status,
            size_bytes,
            "Upload stored"
        );
        Ok(upload)
    }

    async fn record(
        &self,
        mut tx: PgTx<'static>,
        data: &CreateUpload,
        assignment: Option<&RequirementAssignment>,
    ) -> AppResult<Upload> {
        let upload = self.upload_repo.insert(&mut tx, data).await?;
        if let Some(assignment) = assignment {
            let progress =
                AssignmentProgress::of(assignment).on_upload(upload.approval_status, upload.upload_date);
            self.save_progress(&mut tx, assignment, progress).await?;
        }
        commit(tx).await?;
        Ok(upload)
    }

    /// Admins see every upload, everyone else only their own.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        requirement_id: Option<RequirementId>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<UploadRow>> {
        let uploader = (!ctx.is_admin()).then_some(ctx.user_id);
        self.upload_repo.search(uploader, requirement_id, page).await
    }

    async fn find_row(&self, id: UploadId) -> AppResult<UploadRow> {
        self.upload_repo
            .find_row(id)
            .await?
            .ok_or_else(|| AppError::not_found("Upload not found"))
    }

    /// An upload visible to admins, its uploader, and the assignee it belongs to.
    pub async fn show(&self, ctx: &RequestContext, id: UploadId) -> AppResult<UploadRow> {
        let row = self.find_row(id).await?;
        if ctx.is_admin() || row.upload.uploader_id == ctx.user_id {
            return Ok(row);
        }
        let assigned = match row.upload.assignment_id {
            Some(assignment_id) => self
                .assignment_repo
                .find_by_id(assignment_id)
                .await?
                .is_some_and(|a| a.user_id == ctx.user_id),
            None => false,
        };
        if !assigned {
            return Err(AppError::authorization("Unauthorized"));
        }
        Ok(row)
    }

    /// Remove an upload and its stored file. Admins or the uploader only.
    pub async fn delete(&self, ctx: &RequestContext, id: UploadId) -> AppResult<()> {
        let row = self.find_row(id).await?;
        if !ctx.is_admin() && row.upload.uploader_id != ctx.user_id {
            return Err(AppError::authorization("Unauthorized"));
        }
        self.upload_repo.delete(id).await?;
        self.discard_file(&row.upload.file_path).await;

        self.audit
            .record(
                Some(ctx),
                AuditAction::Deleted,
                EntityType::Upload,
                Some(id.into_uuid()),
                snapshot(&row),
                None,
            )
            .await;
        info!(actor_id = %ctx.user_id, upload = %row.upload.upload_code, "Upload deleted");
        Ok(())
    }

    /// Approve an upload; its assignment becomes APPROVED.
    pub async fn approve(
        &self,
        ctx: &RequestContext,
        id: UploadId,
        remarks: Option<String>,
    ) -> AppResult<Upload> {
        ctx.require_admin()?;
        let remarks = remarks
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);
        self.review(ctx, id, ApprovalStatus::Approved, remarks).await
    }

    /// Reject an upload with remarks; its assignment returns to PENDING.
    pub async fn reject(
        &self,
        ctx: &RequestContext,
        id: UploadId,
        remarks: Option<String>,
    ) -> AppResult<Upload> {
        ctx.require_admin()?;
        let remarks = remarks
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
            .ok_or_else(|| AppError::validation("The remarks field is required."))?;
        self.review(ctx, id, ApprovalStatus::Rejected, Some(remarks))
            .await
    }

    async fn review(
        &self,
        ctx: &RequestContext,
        id: UploadId,
        decision: ApprovalStatus,
        remarks: Option<String>,
    ) -> AppResult<Upload> {
        let now = Utc::now();
        let mut tx = self.upload_repo.begin().await?;
        let before = self
            .upload_repo
            .lock_by_id(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::not_found("Upload not found"))?;

        let upload = self
            .upload_repo
            .set_review(&mut tx, id, decision, remarks.as_deref(), now)
            .await?;

        // Only the assignment the upload was filed against moves.
        let assignment = match before.assignment_id {
            Some(assignment_id) => {
                self.assignment_repo
                    .lock_by_id(&mut tx, assignment_id)
                    .await?
            }
            None => None,
        };
        if let Some(assignment) = &assignment {
            let progress = AssignmentProgress::of(assignment);
            let progress = match decision {
                ApprovalStatus::Approved => progress.on_approved(now),
                _ => progress.on_rejected(),
            };
            self.save_progress(&mut tx, assignment, progress).await?;
        }
        commit(tx).await?;

        if let Some(requirement) = self.requirement_repo.find_row(upload.requirement_id).await? {
            let uploader_name = self.uploader_name(&upload).await;
            self.notifier
                .notify_reviewed(&requirement, &upload, &uploader_name)
                .await;
        }

        let action = match decision {
            ApprovalStatus::Approved => AuditAction::Approved,
            _ => AuditAction::Rejected,
        };
        self.audit
            .record(
                Some(ctx),
                action,
                EntityType::Upload,
                Some(id.into_uuid()),
                snapshot(&before),
                snapshot(&upload),
            )
            .await;
        info!(
            actor_id = %ctx.user_id,
            upload = %upload.upload_code,
            decision = %decision,
            assignment_updated = assignment.is_some(),
            "Upload reviewed"
        );
        Ok(upload)
    }

    async fn save_progress(
        &self,
        tx: &mut PgTx<'_>,
        assignment: &RequirementAssignment,
        progress: AssignmentProgress,
    ) -> AppResult<()> {
        if progress == AssignmentProgress::of(assignment) {
            return Ok(());
        }
        self.assignment_repo
            .save_progress(
                tx,
                assignment.id,
                progress.status,
                progress.last_submitted_at,
                progress.last_approved_at,
            )
            .await?;
        Ok(())
    }

    async fn uploader_name(&self, upload: &Upload) -> String {
        match self.user_repo.find_by_id(upload.uploader_id).await {
            Ok(Some(user)) => user.employee_name,
            _ => upload
                .uploader_email
                .clone()
                .unwrap_or_else(|| "A user".to_string()),
        }
    }

    async fn discard_file(&self, path: &str) {
        if let Err(e) = self.storage.delete(path).await {
            warn!(path = %path, error = %e, "Failed to delete stored document");
        }
    }
}
