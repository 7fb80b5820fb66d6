//! Agency repository implementation.

use sqlx::PgPool;

use comply_core::error::{AppError, ErrorKind};
use comply_core::result::AppResult;
use comply_core::types::AgencyId;
use comply_entity::agency::{Agency, CreateAgency, UpdateAgency, normalize_agency_code};

use super::write_error;

/// Repository for agency CRUD.
#[derive(Debug, Clone)]
pub struct AgencyRepository {
    pool: PgPool,
}

impl AgencyRepository {
    /// Create a new agency repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All agencies ordered by code.
    pub async fn list(&self) -> AppResult<Vec<Agency>> {
        sqlx::query_as::<_, Agency>("SELECT * FROM agencies ORDER BY code ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list agencies", e))
    }

    /// Find an agency by primary key.
    pub async fn find_by_id(&self, id: AgencyId) -> AppResult<Option<Agency>> {
        sqlx::query_as::<_, Agency>("SELECT * FROM agencies WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find agency", e))
    }

    /// Find an agency by code, case-insensitively.
    pub async fn find_by_code(&self, code: &str) -> AppResult<Option<Agency>> {
        sqlx::query_as::<_, Agency>("SELECT * FROM agencies WHERE code = $1")
            .bind(normalize_agency_code(code))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find agency by code", e)
            })
    }

    /// Insert a new agency with its code normalized.
    pub async fn create(&self, data: &CreateAgency) -> AppResult<Agency> {
        sqlx::query_as::<_, Agency>(
            "INSERT INTO agencies (id, code, name) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(AgencyId::new())
        .bind(normalize_agency_code(&data.code))
        .bind(data.name.trim())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            write_error(e, "Failed to create agency", "The agency code has already been taken.")
        })
    }

    /// Rename an agency.
    pub async fn update(&self, id: AgencyId, data: &UpdateAgency) -> AppResult<Agency> {
        sqlx::query_as::<_, Agency>(
            "UPDATE agencies SET name = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(data.name.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update agency", e))?
        .ok_or_else(|| AppError::not_found("Agency not found"))
    }

    /// Delete an agency. Its requirements cascade.
    pub async fn delete(&self, id: AgencyId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM agencies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete agency", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Count all agencies.
    pub async fn count(&self) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM agencies")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count agencies", e))
    }
}
