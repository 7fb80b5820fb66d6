//! Upload repository implementation.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use comply_core::error::{AppError, ErrorKind};
use comply_core::result::AppResult;
use comply_core::types::pagination::{PageRequest, PageResponse};
use comply_core::types::{RequirementId, UploadId, UserId};
use comply_entity::upload::{ApprovalStatus, CreateUpload, Upload};

use crate::connection::PgTx;

/// An upload joined with its requirement and uploader for listings.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UploadRow {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub upload: Upload,
    pub req_code: String,
    pub requirement_title: String,
    pub uploader_name: Option<String>,
}

const ROW_SELECT: &str = "SELECT up.*, r.req_code, r.title AS requirement_title, \
                          u.employee_name AS uploader_name \
                          FROM uploads up \
                          JOIN requirements r ON r.id = up.requirement_id \
                          LEFT JOIN users u ON u.id = up.uploader_id";

/// Repository for uploaded document rows.
#[derive(Debug, Clone)]
pub struct UploadRepository {
    pool: PgPool,
}

impl UploadRepository {
    /// Create a new upload repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Begin a transaction on the repository's pool.
    pub async fn begin(&self) -> AppResult<PgTx<'static>> {
        self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })
    }

    /// Find an upload by primary key.
    pub async fn find_by_id(&self, id: UploadId) -> AppResult<Option<Upload>> {
        sqlx::query_as::<_, Upload>("SELECT * FROM uploads WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find upload", e))
    }

    /// Find an upload with its requirement and uploader.
    pub async fn find_row(&self, id: UploadId) -> AppResult<Option<UploadRow>> {
        sqlx::query_as::<_, UploadRow>(&format!("{ROW_SELECT} WHERE up.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find upload", e))
    }

    /// Lock an upload row for review.
    pub async fn lock_by_id(&self, tx: &mut PgTx<'_>, id: UploadId) -> AppResult<Option<Upload>> {
        sqlx::query_as::<_, Upload>("SELECT * FROM uploads WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock upload", e))
    }

    /// Page through uploads, newest first, optionally only one uploader's.
    pub async fn search(
        &self,
        uploader_id: Option<UserId>,
        requirement_id: Option<RequirementId>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<UploadRow>> {
        let filter = "($1::uuid IS NULL OR up.uploader_id = $1) AND ($2::uuid IS NULL OR up.requirement_id = $2)";

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM uploads up WHERE {filter}"
        ))
        .bind(uploader_id)
        .bind(requirement_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count uploads", e))?;

        let rows = sqlx::query_as::<_, UploadRow>(&format!(
            "{ROW_SELECT} WHERE {filter} ORDER BY up.upload_date DESC LIMIT $3 OFFSET $4"
        ))
        .bind(uploader_id)
        .bind(requirement_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list uploads", e))?;

        Ok(PageResponse::new(rows, page.page, page.page_size, total as u64))
    }

    /// Uploads of several requirements, newest first.
    pub async fn for_requirements(&self, ids: &[RequirementId]) -> AppResult<Vec<UploadRow>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, UploadRow>(&format!(
            "{ROW_SELECT} WHERE up.requirement_id = ANY($1) ORDER BY up.upload_date DESC"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load requirement uploads", e)
        })
    }

    /// Whether an APPROVED upload exists for the same submission cycle.
    pub async fn approved_exists(
        &self,
        tx: &mut PgTx<'_>,
        requirement_id: RequirementId,
        uploader_id: UserId,
        deadline_at_upload: NaiveDate,
    ) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"SELECT EXISTS(
                SELECT 1 FROM uploads
                WHERE requirement_id = $1 AND uploader_id = $2
                  AND deadline_at_upload = $3 AND approval_status = 'APPROVED')"#,
        )
        .bind(requirement_id)
        .bind(uploader_id)
        .bind(deadline_at_upload)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to check approved uploads", e)
        })
    }

    /// Insert an upload row.
    pub async fn insert(&self, tx: &mut PgTx<'_>, data: &CreateUpload) -> AppResult<Upload> {
        sqlx::query_as::<_, Upload>(
            r#"INSERT INTO uploads
                (id, upload_code, requirement_id, assignment_id, uploader_id, uploader_email,
                 file_path, original_name, size_bytes, comments, upload_year, upload_date,
                 deadline_at_upload, approval_status, status_change_on, admin_remarks)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
               RETURNING *"#,
        )
        .bind(UploadId::new())
        .bind(&data.upload_code)
        .bind(data.requirement_id)
        .bind(data.assignment_id)
        .bind(data.uploader_id)
        .bind(&data.uploader_email)
        .bind(&data.file_path)
        .bind(&data.original_name)
        .bind(data.size_bytes)
        .bind(&data.comments)
        .bind(data.upload_year)
        .bind(data.upload_date)
        .bind(data.deadline_at_upload)
        .bind(data.approval_status)
        .bind(data.status_change_on)
        .bind(&data.admin_remarks)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create upload", e))
    }

    /// Record a review decision.
    pub async fn set_review(
        &self,
        tx: &mut PgTx<'_>,
        id: UploadId,
        status: ApprovalStatus,
        remarks: Option<&str>,
        at: DateTime<Utc>,
    ) -> AppResult<Upload> {
        sqlx::query_as::<_, Upload>(
            r#"UPDATE uploads SET approval_status = $2, admin_remarks = $3,
                status_change_on = $4, updated_at = NOW()
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(status)
        .bind(remarks)
        .bind(at)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to review upload", e))?
        .ok_or_else(|| AppError::not_found("Upload not found"))
    }

    /// Delete an upload row.
    pub async fn delete(&self, id: UploadId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM uploads WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete upload", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Number of uploads awaiting review.
    pub async fn count_pending(&self) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM uploads WHERE approval_status = 'PENDING'")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count pending uploads", e)
            })
    }

    /// `(requirement, uploader, deadline snapshot)` of every upload awaiting review.
    pub async fn pending_cycles(
        &self,
    ) -> AppResult<Vec<(RequirementId, UserId, Option<NaiveDate>)>> {
        sqlx::query_as::<_, (RequirementId, UserId, Option<NaiveDate>)>(
            "SELECT requirement_id, uploader_id, deadline_at_upload FROM uploads \
             WHERE approval_status = 'PENDING'",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load pending uploads", e)
        })
    }
}
