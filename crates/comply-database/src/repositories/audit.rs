//! Audit log repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use comply_core::error::{AppError, ErrorKind};
use comply_core::result::AppResult;
use comply_core::types::pagination::{PageRequest, PageResponse};
use comply_core::types::{AuditLogId, UserId};
use comply_entity::audit::{AuditLogEntry, AuditLogWithActor, CreateAuditLogEntry};

/// Search criteria for the audit trail.
#[derive(Debug, Clone, Default)]
pub struct AuditLogFilter {
    pub actor_user_id: Option<UserId>,
    pub action: Option<String>,
    pub entity_type: Option<String>,
    pub entity_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

const WITH_ACTOR_SELECT: &str = "SELECT l.*, u.employee_name AS actor_name, u.email AS actor_email \
                                 FROM audit_logs l LEFT JOIN users u ON u.id = l.actor_user_id";

/// Append-only repository for the audit trail.
#[derive(Debug, Clone)]
pub struct AuditLogRepository {
    pool: PgPool,
}

impl AuditLogRepository {
    /// Create a new audit log repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append an entry.
    pub async fn create(&self, data: &CreateAuditLogEntry) -> AppResult<AuditLogEntry> {
        sqlx::query_as::<_, AuditLogEntry>(
            r#"INSERT INTO audit_logs
                (id, actor_user_id, action, entity_type, entity_id, before_json, after_json, ip_address, user_agent)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
               RETURNING *"#,
        )
        .bind(AuditLogId::new())
        .bind(data.actor_user_id)
        .bind(data.action.as_str())
        .bind(data.entity_type.as_str())
        .bind(data.entity_id)
        .bind(&data.before_json)
        .bind(&data.after_json)
        .bind(&data.ip_address)
        .bind(&data.user_agent)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to write audit log", e))
    }

    /// The most recent entries with their actors.
    pub async fn recent(&self, limit: i64) -> AppResult<Vec<AuditLogWithActor>> {
        sqlx::query_as::<_, AuditLogWithActor>(&format!(
            "{WITH_ACTOR_SELECT} ORDER BY l.created_at DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load recent activity", e)
        })
    }

    /// Search the audit trail with optional filters.
    pub async fn search(
        &self,
        filter: &AuditLogFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditLogWithActor>> {
        let mut conditions = Vec::new();
        let mut param_idx = 1u32;

        if filter.actor_user_id.is_some() {
            conditions.push(format!("l.actor_user_id = ${param_idx}"));
            param_idx += 1;
        }
        if filter.action.is_some() {
            conditions.push(format!("l.action = ${param_idx}"));
            param_idx += 1;
        }
        if filter.entity_type.is_some() {
            conditions.push(format!("l.entity_type = ${param_idx}"));
            param_idx += 1;
        }
        if filter.entity_id.is_some() {
            conditions.push(format!("l.entity_id = ${param_idx}"));
            param_idx += 1;
        }
        if filter.from.is_some() {
            conditions.push(format!("l.created_at >= ${param_idx}"));
            param_idx += 1;
        }
        if filter.to.is_some() {
            conditions.push(format!("l.created_at <= ${param_idx}"));
            param_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_sql = format!("SELECT COUNT(*) FROM audit_logs l {where_clause}");
        let select_sql = format!(
            "{WITH_ACTOR_SELECT} {where_clause} ORDER BY l.created_at DESC LIMIT ${param_idx} OFFSET ${}",
            param_idx + 1
        );

        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        let mut select_query = sqlx::query_as::<_, AuditLogWithActor>(&select_sql);

        if let Some(actor) = filter.actor_user_id {
            count_query = count_query.bind(actor);
            select_query = select_query.bind(actor);
        }
        if let Some(action) = &filter.action {
            count_query = count_query.bind(action.to_uppercase());
            select_query = select_query.bind(action.to_uppercase());
        }
        if let Some(entity_type) = &filter.entity_type {
            count_query = count_query.bind(entity_type.clone());
            select_query = select_query.bind(entity_type.clone());
        }
        if let Some(entity_id) = filter.entity_id {
            count_query = count_query.bind(entity_id);
            select_query = select_query.bind(entity_id);
        }
        if let Some(from) = filter.from {
            count_query = count_query.bind(from);
            select_query = select_query.bind(from);
        }
        if let Some(to) = filter.to {
            count_query = count_query.bind(to);
            select_query = select_query.bind(to);
        }

        let total = count_query.fetch_one(&self.pool).await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count audit entries", e)
        })?;

        let entries = select_query
            .bind(page.limit() as i64)
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to search audit log", e)
            })?;

        Ok(PageResponse::new(entries, page.page, page.page_size, total as u64))
    }
}
