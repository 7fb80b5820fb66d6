//! CRUD for the name-only reference tables.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use sqlx::FromRow;
use sqlx::postgres::PgRow;
use tracing::info;
use uuid::Uuid;

use comply_core::error::AppError;
use comply_core::result::AppResult;
use comply_database::repositories::ReferenceRepository;
use comply_entity::audit::AuditAction;

use crate::audit::{AuditRecorder, snapshot};
use crate::context::RequestContext;

/// Service over one reference table whose rows deserialize to `T`.
#[derive(Debug)]
pub struct ReferenceService<T> {
    repo: Arc<ReferenceRepository>,
    audit: Arc<AuditRecorder>,
    _row: PhantomData<fn() -> T>,
}

impl<T> Clone for ReferenceService<T> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            audit: Arc::clone(&self.audit),
            _row: PhantomData,
        }
    }
}

impl<T> ReferenceService<T>
where
    T: for<'r> FromRow<'r, PgRow> + Serialize + Send + Unpin,
{
    pub fn new(repo: Arc<ReferenceRepository>, audit: Arc<AuditRecorder>) -> Self {
        Self {
            repo,
            audit,
            _row: PhantomData,
        }
    }

    fn not_found(&self) -> AppError {
        AppError::not_found(format!("{} not found", self.repo.kind().label()))
    }

    fn validated_name(name: &str) -> AppResult<&str> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("The name field is required."));
        }
        if name.chars().count() > 255 {
            return Err(AppError::validation(
                "The name may not be greater than 255 characters.",
            ));
        }
        Ok(name)
    }

    /// All rows ordered by name.
    pub async fn list(&self) -> AppResult<Vec<T>> {
        self.repo.list().await
    }

    pub async fn show(&self, id: Uuid) -> AppResult<T> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| self.not_found())
    }

    pub async fn create(&self, ctx: &RequestContext, name: &str) -> AppResult<T> {
        ctx.require_admin()?;
        let name = Self::validated_name(name)?;
        let row: T = self.repo.create(name).await?;

        let after = snapshot(&row);
        let id = after
            .as_ref()
            .and_then(|v| v.get("id"))
            .and_then(|v| v.as_str())
            .and_then(|s| Uuid::parse_str(s).ok());
        self.audit
            .record(
                Some(ctx),
                AuditAction::Created,
                self.repo.kind().entity_type(),
                id,
                None,
                after,
            )
            .await;
        info!(actor_id = %ctx.user_id, kind = self.repo.kind().label(), name = %name, "Reference row created");
        Ok(row)
    }

    pub async fn update(&self, ctx: &RequestContext, id: Uuid, name: &str) -> AppResult<T> {
        ctx.require_admin()?;
        let name = Self::validated_name(name)?;
        let before: T = self.show(id).await?;
        let row: T = self
            .repo
            .update(id, name)
            .await?
            .ok_or_else(|| self.not_found())?;

        self.audit
            .record(
                Some(ctx),
                AuditAction::Updated,
                self.repo.kind().entity_type(),
                Some(id),
                snapshot(&before),
                snapshot(&row),
            )
            .await;
        info!(actor_id = %ctx.user_id, kind = self.repo.kind().label(), %id, "Reference row updated");
        Ok(row)
    }

    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> AppResult<()> {
        ctx.require_admin()?;
        let before: T = self.show(id).await?;
        if !self.repo.delete(id).await? {
            return Err(self.not_found());
        }

        self.audit
            .record(
                Some(ctx),
                AuditAction::Deleted,
                self.repo.kind().entity_type(),
                Some(id),
                snapshot(&before),
                None,
            )
            .await;
        info!(actor_id = %ctx.user_id, kind = self.repo.kind().label(), %id, "Reference row deleted");
        Ok(())
    }
}
