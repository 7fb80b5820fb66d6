//! Agency handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde_json::Value;

use comply_core::types::AgencyId;

use crate::dto::request::{CreateAgencyRequest, UpdateAgencyRequest};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::handlers::{message, ok};
use crate::state::AppState;

/// GET /api/agencies
pub async fn list(State(state): State<AppState>, _auth: AuthUser) -> ApiResult<Json<Value>> {
    Ok(ok(state.agency_service.list().await?))
}

/// GET /api/agencies/{id}
pub async fn show(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<AgencyId>,
) -> ApiResult<Json<Value>> {
    Ok(ok(state.agency_service.show(id).await?))
}

/// POST /api/agencies
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateAgencyRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let agency = state
        .agency_service
        .create(&auth, &req.code, &req.name)
        .await?;
    Ok((StatusCode::CREATED, ok(agency)))
}

/// PUT /api/agencies/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<AgencyId>,
    ValidatedJson(req): ValidatedJson<UpdateAgencyRequest>,
) -> ApiResult<Json<Value>> {
    Ok(ok(state.agency_service.update(&auth, id, &req.name).await?))
}

/// DELETE /api/agencies/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<AgencyId>,
) -> ApiResult<Json<Value>> {
    state.agency_service.delete(&auth, id).await?;
    Ok(message("Agency deleted successfully."))
}
