//! Audit log handlers.

use axum::Json;
use axum::extract::{Query, State};
use serde_json::Value;

use comply_database::repositories::AuditLogFilter;

use crate::dto::request::AuditLogQuery;
use crate::error::ApiResult;
use crate::extractors::{AuthUser, PaginationParams};
use crate::handlers::ok;
use crate::state::AppState;

/// GET /api/audit-logs?actor_user_id=&action=&entity_type=&entity_id=&from=&to=
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
    Query(query): Query<AuditLogQuery>,
) -> ApiResult<Json<Value>> {
    let page = params.into_page_request();
    let filter = AuditLogFilter::from(query);
    Ok(ok(state.audit_service.search(&auth, &filter, &page).await?))
}
