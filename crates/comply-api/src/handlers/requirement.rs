//! Requirement handlers: list, my, export, import, and CRUD.

use axum::Json;
use axum::body::Body;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use serde_json::Value;

use comply_core::error::AppError;
use comply_core::types::RequirementId;
use comply_entity::requirement::{CreateRequirement, UpdateRequirement};
use comply_service::requirement::RequirementQuery;

use super::form::{file, multipart_error};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, PaginationParams};
use crate::handlers::{message, ok};
use crate::state::AppState;

/// GET /api/requirements?agency_id=&category=&status=&search=&sort_by=&sort_dir=
pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<PaginationParams>,
    Query(query): Query<RequirementQuery>,
) -> ApiResult<Json<Value>> {
    let page = params.into_page_request();
    let result = state.requirement_service.list(&query, &page).await?;
    Ok(ok(result))
}

/// GET /api/requirements/my
pub async fn my(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<Value>> {
    Ok(ok(state.requirement_service.my(&auth).await?))
}

/// GET /api/requirements/{id}
pub async fn show(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<RequirementId>,
) -> ApiResult<Json<Value>> {
    Ok(ok(state.requirement_service.show(id).await?))
}

/// POST /api/requirements
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateRequirement>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let requirement = state.requirement_service.create(&auth, req).await?;
    Ok((StatusCode::CREATED, ok(requirement)))
}

/// PUT /api/requirements/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<RequirementId>,
    Json(req): Json<UpdateRequirement>,
) -> ApiResult<Json<Value>> {
    Ok(ok(state.requirement_service.update(&auth, id, req).await?))
}

/// DELETE /api/requirements/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<RequirementId>,
) -> ApiResult<Json<Value>> {
    state.requirement_service.delete(&auth, id).await?;
    Ok(message("Requirement deleted successfully."))
}

/// GET /api/requirements/export
pub async fn export(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<RequirementQuery>,
) -> ApiResult<Response> {
    let export = state.requirement_service.export(&query).await?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/csv; charset=UTF-8")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", export.file_name),
        )
        .header(header::CONTENT_LENGTH, export.content.len())
        .body(Body::from(export.content))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))?;

    Ok(response)
}

/// POST /api/requirements/import (multipart field `file`)
pub async fn import(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> ApiResult<Json<Value>> {
    auth.require_super_admin()?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() == Some("file") {
            upload = Some(file(field).await?);
        }
    }

    let (file_name, bytes) = upload
        .filter(|(name, bytes)| !name.is_empty() && !bytes.is_empty())
        .ok_or_else(|| AppError::validation("The file field is required."))?;

    let report = state
        .import_service
        .import(&auth, &file_name, &bytes)
        .await?;
    Ok(ok(report))
}
