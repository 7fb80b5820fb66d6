//! Agency CRUD.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use comply_core::error::AppError;
use comply_core::result::AppResult;
use comply_core::types::AgencyId;
use comply_database::repositories::{AgencyRepository, RequirementRepository};
use comply_entity::agency::{Agency, CreateAgency, UpdateAgency, normalize_agency_code};
use comply_entity::audit::{AuditAction, EntityType};
use comply_entity::requirement::Requirement;

use crate::audit::{AuditRecorder, snapshot};
use crate::context::RequestContext;

/// An agency with the requirements it imposes.
#[derive(Debug, Clone, Serialize)]
pub struct AgencyDetail {
    #[serde(flatten)]
    pub agency: Agency,
    pub requirements: Vec<Requirement>,
}

/// Reads are open to every authenticated user; writes require an admin.
#[derive(Debug, Clone)]
pub struct AgencyService {
    agency_repo: Arc<AgencyRepository>,
    requirement_repo: Arc<RequirementRepository>,
    audit: Arc<AuditRecorder>,
}

impl AgencyService {
    pub fn new(
        agency_repo: Arc<AgencyRepository>,
        requirement_repo: Arc<RequirementRepository>,
        audit: Arc<AuditRecorder>,
    ) -> Self {
        Self {
            agency_repo,
            requirement_repo,
            audit,
        }
    }

    pub async fn list(&self) -> AppResult<Vec<Agency>> {
        self.agency_repo.list().await
    }

    async fn find(&self, id: AgencyId) -> AppResult<Agency> {
        self.agency_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Agency not found"))
    }

    pub async fn show(&self, id: AgencyId) -> AppResult<AgencyDetail> {
        let agency = self.find(id).await?;
        let requirements = self.requirement_repo.for_agency(id).await?;
        Ok(AgencyDetail {
            agency,
            requirements,
        })
    }

    pub async fn create(&self, ctx: &RequestContext, code: &str, name: &str) -> AppResult<Agency> {
        ctx.require_admin()?;
        let code = normalize_agency_code(code);
        let name = name.trim();
        if code.is_empty() {
            return Err(AppError::validation("The agency id field is required."));
        }
        if name.is_empty() {
            return Err(AppError::validation("The name field is required."));
        }

        let agency = self
            .agency_repo
            .create(&CreateAgency {
                code,
                name: name.to_string(),
            })
            .await?;

        self.audit
            .record(
                Some(ctx),
                AuditAction::Created,
                EntityType::Agency,
                Some(agency.id.into_uuid()),
                None,
                snapshot(&agency),
            )
            .await;
        info!(actor_id = %ctx.user_id, agency = %agency.code, "Agency created");
        Ok(agency)
    }

    pub async fn update(&self, ctx: &RequestContext, id: AgencyId, name: &str) -> AppResult<Agency> {
        ctx.require_admin()?;
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("The name field is required."));
        }
        let before = self.find(id).await?;
        let agency = self
            .agency_repo
            .update(
                id,
                &UpdateAgency {
                    name: name.to_string(),
                },
            )
            .await?;

        self.audit
            .record(
                Some(ctx),
                AuditAction::Updated,
                EntityType::Agency,
                Some(agency.id.into_uuid()),
                snapshot(&before),
                snapshot(&agency),
            )
            .await;
        info!(actor_id = %ctx.user_id, agency = %agency.code, "Agency updated");
        Ok(agency)
    }

    /// Delete an agency and, by cascade, its requirements.
    pub async fn delete(&self, ctx: &RequestContext, id: AgencyId) -> AppResult<()> {
        ctx.require_admin()?;
        let before = self.find(id).await?;
        self.agency_repo.delete(id).await?;

        self.audit
            .record(
                Some(ctx),
                AuditAction::Deleted,
                EntityType::Agency,
                Some(before.id.into_uuid()),
                snapshot(&before),
                None,
            )
            .await;
        info!(actor_id = %ctx.user_id, agency = %before.code, "Agency deleted");
        Ok(())
    }
}
