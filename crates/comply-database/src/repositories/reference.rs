//! Repository shared by the name-only reference tables.

use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use comply_core::error::{AppError, ErrorKind};
use comply_core::result::AppResult;
use comply_entity::reference::ReferenceKind;

use super::write_error;

/// CRUD over `positions` or `branch_unit_departments`, chosen by [`ReferenceKind`].
#[derive(Debug, Clone)]
pub struct ReferenceRepository {
    pool: PgPool,
    kind: ReferenceKind,
}

impl ReferenceRepository {
    /// Create a repository for one reference table.
    pub fn new(pool: PgPool, kind: ReferenceKind) -> Self {
        Self { pool, kind }
    }

    /// Which table this repository serves.
    pub fn kind(&self) -> ReferenceKind {
        self.kind
    }

    /// All rows ordered by name.
    pub async fn list<T>(&self) -> AppResult<Vec<T>>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let sql = format!("SELECT * FROM {} ORDER BY name ASC", self.kind.table());
        sqlx::query_as::<_, T>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to list {}", self.kind.table()),
                    e,
                )
            })
    }

    /// Find one row by id.
    pub async fn find_by_id<T>(&self, id: Uuid) -> AppResult<Option<T>>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let sql = format!("SELECT * FROM {} WHERE id = $1", self.kind.table());
        sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to find {}", self.kind.entity_type()),
                    e,
                )
            })
    }

    /// Insert a row with a unique name.
    pub async fn create<T>(&self, name: &str) -> AppResult<T>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let sql = format!(
            "INSERT INTO {} (id, name) VALUES ($1, $2) RETURNING *",
            self.kind.table()
        );
        sqlx::query_as::<_, T>(&sql)
            .bind(Uuid::now_v7())
            .bind(name.trim())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                write_error(
                    e,
                    &format!("Failed to create {}", self.kind.entity_type()),
                    "The name has already been taken.",
                )
            })
    }

    /// Rename a row.
    pub async fn update<T>(&self, id: Uuid, name: &str) -> AppResult<Option<T>>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let sql = format!(
            "UPDATE {} SET name = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
            self.kind.table()
        );
        sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .bind(name.trim())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                write_error(
                    e,
                    &format!("Failed to update {}", self.kind.entity_type()),
                    "The name has already been taken.",
                )
            })
    }

    /// Delete a row; join rows referencing it cascade.
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let sql = format!("DELETE FROM {} WHERE id = $1", self.kind.table());
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to delete {}", self.kind.entity_type()),
                    e,
                )
            })?;
        Ok(result.rows_affected() > 0)
    }

    /// `(id, lowercase name)` pairs for bulk name resolution.
    pub async fn name_index(&self) -> AppResult<Vec<(Uuid, String)>> {
        let sql = format!("SELECT id, LOWER(name) FROM {}", self.kind.table());
        sqlx::query_as::<_, (Uuid, String)>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to index {}", self.kind.table()),
                    e,
                )
            })
    }
}
