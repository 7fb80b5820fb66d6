//! Position and branch/unit/department handlers.
//!
//! Both tables share one set of handlers; the router picks the service
//! through the `Reference` type parameter.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use comply_entity::reference::{BranchUnitDepartment, Position};
use comply_service::reference::ReferenceService;

use crate::dto::request::NameRequest;
use crate::error::ApiResult;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::handlers::{message, ok};
use crate::state::AppState;

/// A reference table reachable from the application state.
pub trait Reference: for<'r> FromRow<'r, PgRow> + Serialize + Send + Unpin + 'static {
    fn service(state: &AppState) -> Arc<ReferenceService<Self>>;
    fn deleted_message() -> &'static str;
}

impl Reference for Position {
    fn service(state: &AppState) -> Arc<ReferenceService<Self>> {
        Arc::clone(&state.position_service)
    }

    fn deleted_message() -> &'static str {
        "Position deleted successfully."
    }
}

impl Reference for BranchUnitDepartment {
    fn service(state: &AppState) -> Arc<ReferenceService<Self>> {
        Arc::clone(&state.branch_unit_service)
    }

    fn deleted_message() -> &'static str {
        "Branch/unit/department deleted successfully."
    }
}

/// GET /api/positions, /api/branch-unit-departments
pub async fn list<T: Reference>(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> ApiResult<Json<Value>> {
    Ok(ok(T::service(&state).list().await?))
}

/// GET /api/positions/{id}, /api/branch-unit-departments/{id}
pub async fn show<T: Reference>(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    Ok(ok(T::service(&state).show(id).await?))
}

/// POST /api/positions, /api/branch-unit-departments
pub async fn create<T: Reference>(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<NameRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let row = T::service(&state).create(&auth, &req.name).await?;
    Ok((StatusCode::CREATED, ok(row)))
}

/// PUT /api/positions/{id}, /api/branch-unit-departments/{id}
pub async fn update<T: Reference>(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<NameRequest>,
) -> ApiResult<Json<Value>> {
    Ok(ok(T::service(&state).update(&auth, id, &req.name).await?))
}

/// DELETE /api/positions/{id}, /api/branch-unit-departments/{id}
pub async fn delete<T: Reference>(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    T::service(&state).delete(&auth, id).await?;
    Ok(message(T::deleted_message()))
}
