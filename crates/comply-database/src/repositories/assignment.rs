//! Requirement assignment repository implementation.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use comply_core::error::{AppError, ErrorKind};
use comply_core::result::AppResult;
use comply_core::types::{AssignmentId, RequirementId, UserId};
use comply_entity::assignment::{ComplianceStatus, RequirementAssignment, generate_assignment_code};

use crate::connection::PgTx;

/// An assignment joined with its PIC's identity.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AssignmentWithUser {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub assignment: RequirementAssignment,
    pub user_code: Option<String>,
    pub employee_name: Option<String>,
    pub email: Option<String>,
}

/// An assignment due on a reminder date, with what the email needs.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReminderCandidate {
    pub assignment_id: AssignmentId,
    pub assignment_code: String,
    pub compliance_status: ComplianceStatus,
    pub deadline: NaiveDate,
    pub user_id: Option<UserId>,
    pub employee_name: Option<String>,
    pub email: Option<String>,
    pub req_code: String,
    pub title: String,
    pub agency_name: String,
}

const WITH_USER_SELECT: &str = "SELECT x.*, u.user_code, u.employee_name, u.email \
                                FROM requirement_assignments x LEFT JOIN users u ON u.id = x.user_id";

/// Repository for assignment rows and their status columns.
#[derive(Debug, Clone)]
pub struct AssignmentRepository {
    pool: PgPool,
}

impl AssignmentRepository {
    /// Create a new assignment repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an assignment by primary key.
    pub async fn find_by_id(&self, id: AssignmentId) -> AppResult<Option<RequirementAssignment>> {
        sqlx::query_as::<_, RequirementAssignment>(
            "SELECT * FROM requirement_assignments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find assignment", e))
    }

    /// The assignment of a user to a requirement, if any.
    pub async fn find_for(
        &self,
        requirement_id: RequirementId,
        user_id: UserId,
    ) -> AppResult<Option<RequirementAssignment>> {
        sqlx::query_as::<_, RequirementAssignment>(
            "SELECT * FROM requirement_assignments WHERE requirement_id = $1 AND user_id = $2",
        )
        .bind(requirement_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find assignment", e))
    }

    /// Lock and return the assignment of a user to a requirement.
    pub async fn lock_for(
        &self,
        tx: &mut PgTx<'_>,
        requirement_id: RequirementId,
        user_id: UserId,
    ) -> AppResult<Option<RequirementAssignment>> {
        sqlx::query_as::<_, RequirementAssignment>(
            "SELECT * FROM requirement_assignments WHERE requirement_id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(requirement_id)
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock assignment", e))
    }

    /// Lock and return an assignment by id.
    pub async fn lock_by_id(
        &self,
        tx: &mut PgTx<'_>,
        id: AssignmentId,
    ) -> AppResult<Option<RequirementAssignment>> {
        sqlx::query_as::<_, RequirementAssignment>(
            "SELECT * FROM requirement_assignments WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock assignment", e))
    }

    /// All assignments of a requirement inside a transaction, locked.
    pub async fn lock_for_requirement(
        &self,
        tx: &mut PgTx<'_>,
        requirement_id: RequirementId,
    ) -> AppResult<Vec<RequirementAssignment>> {
        sqlx::query_as::<_, RequirementAssignment>(
            "SELECT * FROM requirement_assignments WHERE requirement_id = $1 ORDER BY created_at FOR UPDATE",
        )
        .bind(requirement_id)
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load assignments", e)
        })
    }

    /// Assignments of a requirement with their PICs.
    pub async fn with_users_for_requirement(
        &self,
        requirement_id: RequirementId,
    ) -> AppResult<Vec<AssignmentWithUser>> {
        sqlx::query_as::<_, AssignmentWithUser>(&format!(
            "{WITH_USER_SELECT} WHERE x.requirement_id = $1 ORDER BY u.employee_name"
        ))
        .bind(requirement_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load assignments", e)
        })
    }

    /// Assignments with PICs for several requirements at once.
    pub async fn with_users_for_requirements(
        &self,
        requirement_ids: &[RequirementId],
    ) -> AppResult<Vec<AssignmentWithUser>> {
        if requirement_ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, AssignmentWithUser>(&format!(
            "{WITH_USER_SELECT} WHERE x.requirement_id = ANY($1) ORDER BY u.employee_name"
        ))
        .bind(requirement_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load assignments", e)
        })
    }

    /// Every assignment held by one user.
    pub async fn for_user(&self, user_id: UserId) -> AppResult<Vec<RequirementAssignment>> {
        sqlx::query_as::<_, RequirementAssignment>(
            "SELECT * FROM requirement_assignments WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load user assignments", e)
        })
    }

    /// Create a PENDING assignment.
    pub async fn insert(
        &self,
        tx: &mut PgTx<'_>,
        requirement_id: RequirementId,
        user_id: UserId,
        deadline: Option<NaiveDate>,
    ) -> AppResult<RequirementAssignment> {
        sqlx::query_as::<_, RequirementAssignment>(
            r#"INSERT INTO requirement_assignments
                (id, assignment_code, requirement_id, user_id, deadline, compliance_status)
               VALUES ($1, $2, $3, $4, $5, 'PENDING')
               RETURNING *"#,
        )
        .bind(AssignmentId::new())
        .bind(generate_assignment_code())
        .bind(requirement_id)
        .bind(user_id)
        .bind(deadline)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| {
            super::write_error(
                e,
                "Failed to create assignment",
                "The person-in-charge is already assigned to this requirement.",
            )
        })
    }

    /// Remove the given PICs from a requirement.
    pub async fn delete_users(
        &self,
        tx: &mut PgTx<'_>,
        requirement_id: RequirementId,
        user_ids: &[UserId],
    ) -> AppResult<u64> {
        if user_ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            "DELETE FROM requirement_assignments WHERE requirement_id = $1 AND user_id = ANY($2)",
        )
        .bind(requirement_id)
        .bind(user_ids)
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to remove assignments", e)
        })?;
        Ok(result.rows_affected())
    }

    /// Set the deadline of every assignment of a requirement.
    pub async fn sync_deadline(
        &self,
        tx: &mut PgTx<'_>,
        requirement_id: RequirementId,
        deadline: Option<NaiveDate>,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE requirement_assignments SET deadline = $2, updated_at = NOW() WHERE requirement_id = $1",
        )
        .bind(requirement_id)
        .bind(deadline)
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to sync assignment deadlines", e)
        })?;
        Ok(result.rows_affected())
    }

    /// Persist the status columns of one assignment.
    pub async fn save_progress(
        &self,
        tx: &mut PgTx<'_>,
        id: AssignmentId,
        status: ComplianceStatus,
        last_submitted_at: Option<DateTime<Utc>>,
        last_approved_at: Option<DateTime<Utc>>,
    ) -> AppResult<RequirementAssignment> {
        sqlx::query_as::<_, RequirementAssignment>(
            r#"UPDATE requirement_assignments SET
                compliance_status = $2, last_submitted_at = $3, last_approved_at = $4, updated_at = NOW()
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(status)
        .bind(last_submitted_at)
        .bind(last_approved_at)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update assignment status", e)
        })?
        .ok_or_else(|| AppError::not_found("Assignment not found"))
    }

    /// Non-approved assignments whose deadline is exactly `date`.
    pub async fn due_on(&self, date: NaiveDate) -> AppResult<Vec<ReminderCandidate>> {
        sqlx::query_as::<_, ReminderCandidate>(
            r#"SELECT x.id AS assignment_id, x.assignment_code, x.compliance_status, x.deadline,
                      u.id AS user_id, u.employee_name, u.email,
                      r.req_code, r.title, a.name AS agency_name
               FROM requirement_assignments x
               JOIN requirements r ON r.id = x.requirement_id
               JOIN agencies a ON a.id = r.agency_id
               LEFT JOIN users u ON u.id = x.user_id
               WHERE x.deadline = $1 AND x.compliance_status <> 'APPROVED'
               ORDER BY x.created_at"#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load due assignments", e)
        })
    }

    /// Move PENDING and REJECTED assignments past their deadline to OVERDUE.
    pub async fn mark_overdue(&self, today: NaiveDate) -> AppResult<Vec<AssignmentId>> {
        sqlx::query_scalar::<_, AssignmentId>(
            r#"UPDATE requirement_assignments SET compliance_status = 'OVERDUE', updated_at = NOW()
               WHERE deadline < $1 AND compliance_status IN ('PENDING', 'REJECTED')
               RETURNING id"#,
        )
        .bind(today)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to mark overdue assignments", e)
        })
    }
}
