//! Sent-reminder markers used when reminder deduplication is enabled.

use chrono::NaiveDate;
use sqlx::PgPool;

use comply_core::error::{AppError, ErrorKind};
use comply_core::result::AppResult;
use comply_core::types::AssignmentId;

/// Repository for the `reminder_log` table.
#[derive(Debug, Clone)]
pub struct ReminderLogRepository {
    pool: PgPool,
}

impl ReminderLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Whether a reminder for this assignment and offset went out on `sent_on`.
    pub async fn was_sent(
        &self,
        assignment_id: AssignmentId,
        offset_days: i64,
        sent_on: NaiveDate,
    ) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM reminder_log \
             WHERE assignment_id = $1 AND offset_days = $2 AND sent_on = $3)",
        )
        .bind(assignment_id)
        .bind(offset_days as i32)
        .bind(sent_on)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to read reminder log", e))
    }

    /// Mark a reminder as sent; repeated marks are ignored.
    pub async fn record(
        &self,
        assignment_id: AssignmentId,
        offset_days: i64,
        sent_on: NaiveDate,
    ) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO reminder_log (assignment_id, offset_days, sent_on) VALUES ($1, $2, $3) \
             ON CONFLICT DO NOTHING",
        )
        .bind(assignment_id)
        .bind(offset_days as i32)
        .bind(sent_on)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to write reminder log", e))?;
        Ok(())
    }
}
