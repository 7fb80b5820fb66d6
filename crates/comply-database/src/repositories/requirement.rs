//! Requirement repository implementation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use comply_core::error::{AppError, ErrorKind};
use comply_core::result::AppResult;
use comply_core::types::pagination::{PageRequest, PageResponse};
use comply_core::types::{AgencyId, BranchUnitId, PositionId, RequirementId, SortDirection, UserId};
use comply_entity::requirement::Requirement;

use super::like_pattern;
use crate::connection::PgTx;

/// A requirement joined with its agency's code and name.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RequirementRow {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub requirement: Requirement,
    pub agency_code: String,
    pub agency_name: String,
}

/// Bucket filter accepted by the requirement list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequirementStatusFilter {
    /// No deadline set.
    Na,
    /// Has a deadline and every assignment is approved.
    Complied,
    /// Has a deadline and an overdue assignment.
    Overdue,
    /// Has a deadline and is neither complied nor overdue.
    Pending,
}

impl RequirementStatusFilter {
    /// Parse a query value; `compliant` is accepted as `complied`. Unknown values apply no filter.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "na" | "n/a" => Some(Self::Na),
            "compliant" | "complied" => Some(Self::Complied),
            "overdue" => Some(Self::Overdue),
            "pending" => Some(Self::Pending),
            _ => None,
        }
    }
}

/// Sort key for the requirement list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequirementSort {
    Title,
    ReqCode,
    /// Creation order (time-ordered ids).
    #[default]
    Created,
}

impl RequirementSort {
    /// Parse a `sort_by` query value; unknown keys sort by creation order.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()).as_deref() {
            Some("requirement") | Some("title") => Self::Title,
            Some("req_id") | Some("req_code") => Self::ReqCode,
            _ => Self::Created,
        }
    }

    fn column(&self) -> &'static str {
        match self {
            Self::Title => "r.title",
            Self::ReqCode => "r.req_code",
            Self::Created => "r.id",
        }
    }
}

/// Filters shared by the list and export queries.
#[derive(Debug, Clone, Default)]
pub struct RequirementFilter {
    pub agency_id: Option<AgencyId>,
    pub category: Option<String>,
    pub status: Option<RequirementStatusFilter>,
    pub search: Option<String>,
    /// Restrict to requirements assigned to this user.
    pub assigned_to: Option<UserId>,
}

const ROW_SELECT: &str = "SELECT r.*, a.code AS agency_code, a.name AS agency_name \
                          FROM requirements r JOIN agencies a ON a.id = r.agency_id";

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &RequirementFilter) {
    qb.push(" WHERE TRUE");

    if let Some(agency_id) = filter.agency_id {
        qb.push(" AND r.agency_id = ").push_bind(agency_id);
    }
    if let Some(category) = filter.category.as_ref().filter(|c| !c.trim().is_empty()) {
        qb.push(" AND r.category = ").push_bind(category.trim().to_string());
    }
    if let Some(user_id) = filter.assigned_to {
        qb.push(
            " AND EXISTS (SELECT 1 FROM requirement_assignments x \
             WHERE x.requirement_id = r.id AND x.user_id = ",
        )
        .push_bind(user_id)
        .push(")");
    }

    match filter.status {
        Some(RequirementStatusFilter::Na) => {
            qb.push(" AND r.deadline IS NULL");
        }
        Some(RequirementStatusFilter::Complied) => {
            qb.push(
                " AND r.deadline IS NOT NULL \
                 AND EXISTS (SELECT 1 FROM requirement_assignments x WHERE x.requirement_id = r.id) \
                 AND NOT EXISTS (SELECT 1 FROM requirement_assignments x \
                     WHERE x.requirement_id = r.id AND x.compliance_status <> 'APPROVED')",
            );
        }
        Some(RequirementStatusFilter::Overdue) => {
            qb.push(
                " AND r.deadline IS NOT NULL \
                 AND EXISTS (SELECT 1 FROM requirement_assignments x \
                     WHERE x.requirement_id = r.id AND x.compliance_status = 'OVERDUE')",
            );
        }
        Some(RequirementStatusFilter::Pending) => {
            qb.push(
                " AND r.deadline IS NOT NULL AND ( \
                   NOT EXISTS (SELECT 1 FROM requirement_assignments x WHERE x.requirement_id = r.id) \
                   OR ( \
                     EXISTS (SELECT 1 FROM requirement_assignments x \
                         WHERE x.requirement_id = r.id AND x.compliance_status <> 'APPROVED') \
                     AND NOT EXISTS (SELECT 1 FROM requirement_assignments x \
                         WHERE x.requirement_id = r.id AND x.compliance_status = 'OVERDUE')))",
            );
        }
        None => {}
    }

    if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        let pattern = like_pattern(term);
        qb.push(" AND (");
        let columns = [
            "r.req_code",
            "r.title",
            "r.category",
            "r.frequency",
            "r.schedule",
            "r.description",
            "a.name",
            "a.code",
        ];
        for (i, column) in columns.iter().enumerate() {
            if i > 0 {
                qb.push(" OR ");
            }
            qb.push(*column).push(" ILIKE ").push_bind(pattern.clone());
        }
        qb.push(")");
    }
}

/// Repository for requirements and their position/branch-unit join tables.
#[derive(Debug, Clone)]
pub struct RequirementRepository {
    pool: PgPool,
}

impl RequirementRepository {
    /// Create a new requirement repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Begin a transaction on the repository's pool.
    pub async fn begin(&self) -> AppResult<PgTx<'static>> {
        self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })
    }

    /// Find a requirement by primary key.
    pub async fn find_by_id(&self, id: RequirementId) -> AppResult<Option<Requirement>> {
        sqlx::query_as::<_, Requirement>("SELECT * FROM requirements WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find requirement", e)
            })
    }

    /// Find a requirement joined with its agency.
    pub async fn find_row(&self, id: RequirementId) -> AppResult<Option<RequirementRow>> {
        sqlx::query_as::<_, RequirementRow>(&format!("{ROW_SELECT} WHERE r.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find requirement", e)
            })
    }

    /// Page through requirements matching the filter.
    pub async fn search(
        &self,
        filter: &RequirementFilter,
        sort: RequirementSort,
        direction: SortDirection,
        page: &PageRequest,
    ) -> AppResult<PageResponse<RequirementRow>> {
        let mut count = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM requirements r JOIN agencies a ON a.id = r.agency_id",
        );
        push_filters(&mut count, filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count requirements", e)
            })?;

        let mut select = QueryBuilder::<Postgres>::new(ROW_SELECT);
        push_filters(&mut select, filter);
        select
            .push(" ORDER BY ")
            .push(sort.column())
            .push(" ")
            .push(direction.as_sql())
            .push(", r.id ASC LIMIT ")
            .push_bind(page.limit() as i64)
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);

        let rows = select
            .build_query_as::<RequirementRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to list requirements", e)
            })?;

        Ok(PageResponse::new(rows, page.page, page.page_size, total as u64))
    }

    /// Every requirement matching the filter, most recently updated first.
    pub async fn export_rows(&self, filter: &RequirementFilter) -> AppResult<Vec<RequirementRow>> {
        let mut select = QueryBuilder::<Postgres>::new(ROW_SELECT);
        push_filters(&mut select, filter);
        select.push(" ORDER BY r.updated_at DESC, r.id DESC");
        select
            .build_query_as::<RequirementRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to export requirements", e)
            })
    }

    /// Requirements assigned to a user, joined with their agency.
    pub async fn assigned_to(&self, user_id: UserId) -> AppResult<Vec<RequirementRow>> {
        sqlx::query_as::<_, RequirementRow>(&format!(
            "{ROW_SELECT} WHERE EXISTS (SELECT 1 FROM requirement_assignments x \
             WHERE x.requirement_id = r.id AND x.user_id = $1) ORDER BY r.deadline ASC NULLS LAST, r.id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list assigned requirements", e)
        })
    }

    /// All requirements of one agency.
    pub async fn for_agency(&self, agency_id: AgencyId) -> AppResult<Vec<Requirement>> {
        sqlx::query_as::<_, Requirement>(
            "SELECT * FROM requirements WHERE agency_id = $1 ORDER BY req_code",
        )
        .bind(agency_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list agency requirements", e)
        })
    }

    /// Every requirement, optionally restricted to those assigned to a user.
    pub async fn all_rows(&self, assigned_to: Option<UserId>) -> AppResult<Vec<RequirementRow>> {
        let filter = RequirementFilter {
            assigned_to,
            ..RequirementFilter::default()
        };
        let mut select = QueryBuilder::<Postgres>::new(ROW_SELECT);
        push_filters(&mut select, &filter);
        select.push(" ORDER BY a.code, r.req_code");
        select
            .build_query_as::<RequirementRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to load requirements", e)
            })
    }

    /// Count all requirements.
    pub async fn count(&self) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM requirements")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count requirements", e)
            })
    }

    /// Latest issued code for an agency, taken under row locks.
    ///
    /// The agency row is locked first so that allocations serialize even
    /// when the agency has no requirements yet; the latest requirement row
    /// is then locked as well.
    pub async fn lock_latest_code(
        &self,
        tx: &mut PgTx<'_>,
        agency_id: AgencyId,
    ) -> AppResult<Option<String>> {
        sqlx::query("SELECT id FROM agencies WHERE id = $1 FOR UPDATE")
            .bind(agency_id)
            .execute(&mut **tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock agency", e))?;

        sqlx::query_scalar::<_, String>(
            "SELECT req_code FROM requirements WHERE agency_id = $1 \
             ORDER BY LENGTH(req_code) DESC, req_code DESC LIMIT 1 FOR UPDATE",
        )
        .bind(agency_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to read latest requirement code", e)
        })
    }

    /// Insert a requirement row inside a transaction.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert(
        &self,
        tx: &mut PgTx<'_>,
        req_code: &str,
        agency_id: AgencyId,
        category: &str,
        title: &str,
        description: Option<&str>,
        frequency: &str,
        schedule: Option<&str>,
        deadline: Option<NaiveDate>,
    ) -> AppResult<Requirement> {
        sqlx::query_as::<_, Requirement>(
            r#"INSERT INTO requirements
                (id, req_code, agency_id, category, title, description, frequency, schedule, deadline)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
               RETURNING *"#,
        )
        .bind(RequirementId::new())
        .bind(req_code)
        .bind(agency_id)
        .bind(category)
        .bind(title)
        .bind(description)
        .bind(frequency)
        .bind(schedule)
        .bind(deadline)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| {
            super::write_error(
                e,
                "Failed to create requirement",
                "The requirement code has already been taken.",
            )
        })
    }

    /// Overwrite every mutable column of a requirement inside a transaction.
    pub async fn save(&self, tx: &mut PgTx<'_>, requirement: &Requirement) -> AppResult<Requirement> {
        sqlx::query_as::<_, Requirement>(
            r#"UPDATE requirements SET
                agency_id = $2, category = $3, title = $4, description = $5,
                frequency = $6, schedule = $7, deadline = $8, updated_at = NOW()
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(requirement.id)
        .bind(requirement.agency_id)
        .bind(&requirement.category)
        .bind(&requirement.title)
        .bind(&requirement.description)
        .bind(&requirement.frequency)
        .bind(&requirement.schedule)
        .bind(requirement.deadline)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update requirement", e))?
        .ok_or_else(|| AppError::not_found("Requirement not found"))
    }

    /// Delete a requirement; assignments, uploads and join rows cascade.
    pub async fn delete(&self, id: RequirementId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM requirements WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete requirement", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    /// Replace the requirement's positions.
    pub async fn set_positions(
        &self,
        tx: &mut PgTx<'_>,
        id: RequirementId,
        position_ids: &[PositionId],
    ) -> AppResult<()> {
        sqlx::query("DELETE FROM requirement_positions WHERE requirement_id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to clear positions", e)
            })?;

        if position_ids.is_empty() {
            return Ok(());
        }
        sqlx::query(
            "INSERT INTO requirement_positions (requirement_id, position_id) \
             SELECT $1, UNNEST($2::uuid[]) ON CONFLICT DO NOTHING",
        )
        .bind(id)
        .bind(position_ids)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to link positions", e))?;
        Ok(())
    }

    /// Replace the requirement's branch/unit/departments.
    pub async fn set_branch_units(
        &self,
        tx: &mut PgTx<'_>,
        id: RequirementId,
        branch_unit_ids: &[BranchUnitId],
    ) -> AppResult<()> {
        sqlx::query("DELETE FROM requirement_branch_units WHERE requirement_id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to clear branch units", e)
            })?;

        if branch_unit_ids.is_empty() {
            return Ok(());
        }
        sqlx::query(
            "INSERT INTO requirement_branch_units (requirement_id, branch_unit_id) \
             SELECT $1, UNNEST($2::uuid[]) ON CONFLICT DO NOTHING",
        )
        .bind(id)
        .bind(branch_unit_ids)
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to link branch units", e)
        })?;
        Ok(())
    }

    /// Position ids linked to each of the given requirements.
    pub async fn position_links(
        &self,
        ids: &[RequirementId],
    ) -> AppResult<Vec<(RequirementId, PositionId, String)>> {
        sqlx::query_as::<_, (RequirementId, PositionId, String)>(
            "SELECT rp.requirement_id, p.id, p.name FROM requirement_positions rp \
             JOIN positions p ON p.id = rp.position_id \
             WHERE rp.requirement_id = ANY($1) ORDER BY p.name",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load positions", e))
    }

    /// Branch/unit/department ids linked to each of the given requirements.
    pub async fn branch_unit_links(
        &self,
        ids: &[RequirementId],
    ) -> AppResult<Vec<(RequirementId, BranchUnitId, String)>> {
        sqlx::query_as::<_, (RequirementId, BranchUnitId, String)>(
            "SELECT rb.requirement_id, b.id, b.name FROM requirement_branch_units rb \
             JOIN branch_unit_departments b ON b.id = rb.branch_unit_id \
             WHERE rb.requirement_id = ANY($1) ORDER BY b.name",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load branch units", e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_filter_parse() {
        assert_eq!(
            RequirementStatusFilter::parse("Compliant"),
            Some(RequirementStatusFilter::Complied)
        );
        assert_eq!(RequirementStatusFilter::parse("na"), Some(RequirementStatusFilter::Na));
        assert_eq!(RequirementStatusFilter::parse("late"), None);
    }

    #[test]
    fn test_sort_parse_defaults_to_created() {
        assert_eq!(RequirementSort::parse(Some("requirement")), RequirementSort::Title);
        assert_eq!(RequirementSort::parse(Some("REQ_ID")), RequirementSort::ReqCode);
        assert_eq!(RequirementSort::parse(Some("deadline")), RequirementSort::Created);
        assert_eq!(RequirementSort::parse(None), RequirementSort::Created);
    }

    #[test]
    fn test_filters_bind_search_for_every_column() {
        let filter = RequirementFilter {
            search: Some("permit".to_string()),
            status: Some(RequirementStatusFilter::Na),
            ..RequirementFilter::default()
        };
        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 FROM requirements r");
        push_filters(&mut qb, &filter);
        let sql = qb.sql();
        assert!(sql.contains("r.deadline IS NULL"));
        assert!(sql.contains("a.code ILIKE $8"));
    }
}
