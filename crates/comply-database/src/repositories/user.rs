//! User repository implementation.

use chrono::Utc;
use sqlx::PgPool;

use comply_core::error::{AppError, ErrorKind};
use comply_core::result::AppResult;
use comply_core::types::pagination::{PageRequest, PageResponse};
use comply_core::types::UserId;
use comply_entity::user::{CreateUser, UpdateUser, User, UserRole};

use super::{like_pattern, write_error};

/// Repository for user CRUD and lookup operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by primary key.
    pub async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user by id", e))
    }

    /// Find a user by email (case-insensitive).
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by email", e)
            })
    }

    /// Load several users at once, in no particular order.
    pub async fn find_by_ids(&self, ids: &[UserId]) -> AppResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load users", e))
    }

    /// Every user, for name lookups during bulk import.
    pub async fn find_all(&self) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY employee_name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load users", e))
    }

    /// Whether any user already holds the given code.
    pub async fn code_exists(&self, user_code: &str) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE user_code = $1)")
            .bind(user_code)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to check user code", e)
            })
    }

    /// List users with optional name/email/code search and role filter.
    pub async fn search(
        &self,
        search: Option<&str>,
        role: Option<UserRole>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<User>> {
        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(like_pattern);

        let filter = "($1::text IS NULL OR employee_name ILIKE $1 OR email ILIKE $1 OR user_code ILIKE $1) \
                      AND ($2::user_role IS NULL OR role = $2)";

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM users WHERE {filter}"))
            .bind(pattern.as_deref())
            .bind(role)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count users", e))?;

        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT * FROM users WHERE {filter} ORDER BY employee_name ASC LIMIT $3 OFFSET $4"
        ))
        .bind(pattern.as_deref())
        .bind(role)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list users", e))?;

        Ok(PageResponse::new(users, page.page, page.page_size, total as u64))
    }

    /// Active administrators (super admins and specialists) with their emails.
    pub async fn find_active_admins(&self) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE is_active AND role IN ('super_admin', 'admin_specialist') \
             ORDER BY employee_name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list admins", e))
    }

    /// Insert a new user.
    pub async fn create(&self, data: &CreateUser) -> AppResult<User> {
        let now = Utc::now();
        sqlx::query_as::<_, User>(
            r#"INSERT INTO users
                (id, user_code, employee_name, email, branch, password_hash, role, is_active, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
               RETURNING *"#,
        )
        .bind(UserId::new())
        .bind(&data.user_code)
        .bind(&data.employee_name)
        .bind(data.email.trim())
        .bind(&data.branch)
        .bind(&data.password_hash)
        .bind(data.role)
        .bind(data.is_active)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error(e, "Failed to create user", "The email has already been taken."))
    }

    /// Apply a partial profile update and return the new row.
    pub async fn update(&self, id: UserId, data: &UpdateUser) -> AppResult<User> {
        let (set_branch, branch) = match &data.branch {
            Some(value) => (true, value.clone()),
            None => (false, None),
        };
        sqlx::query_as::<_, User>(
            r#"UPDATE users SET
                employee_name = COALESCE($2, employee_name),
                email = COALESCE($3, email),
                branch = CASE WHEN $4 THEN $5 ELSE branch END,
                role = COALESCE($6, role),
                is_active = COALESCE($7, is_active),
                updated_at = NOW()
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(&data.employee_name)
        .bind(data.email.as_deref().map(str::trim))
        .bind(set_branch)
        .bind(branch)
        .bind(data.role)
        .bind(data.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| write_error(e, "Failed to update user", "The email has already been taken."))?
        .ok_or_else(|| AppError::not_found(format!("User {id} not found")))
    }

    /// Replace a user's password hash.
    pub async fn update_password(&self, id: UserId, password_hash: &str) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(password_hash)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to update password", e)
                })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("User {id} not found")));
        }
        Ok(())
    }

    /// Record a successful login.
    pub async fn touch_last_login(&self, id: UserId) -> AppResult<()> {
        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to record last login", e)
            })?;
        Ok(())
    }

    /// Count all users.
    pub async fn count(&self) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count users", e))
    }
}
