//! Account management handlers (super admin).

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde_json::Value;

use comply_core::error::AppError;
use comply_core::types::UserId;
use comply_service::user::AdminUpdateUser;

use crate::dto::request::{CreateUserRequest, ResetPasswordRequest, UserListQuery};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, PaginationParams, ValidatedJson};
use crate::handlers::{message, ok};
use crate::state::AppState;

/// GET /api/users?search=&role=
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
    Query(filter): Query<UserListQuery>,
) -> ApiResult<Json<Value>> {
    let page = params.into_page_request();
    let users = state
        .user_admin_service
        .list(&auth, filter.search.as_deref(), filter.role, &page)
        .await?;
    Ok(ok(users))
}

/// GET /api/users/{id}
pub async fn show(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<UserId>,
) -> ApiResult<Json<Value>> {
    let user = state.user_admin_service.get(&auth, id).await?;
    Ok(ok(user))
}

/// POST /api/users
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    if req.password != req.password_confirmation {
        return Err(AppError::validation("The password confirmation does not match.").into());
    }
    let user = state
        .user_admin_service
        .create(Some(&auth), req.into())
        .await?;
    Ok((StatusCode::CREATED, ok(user)))
}

/// PUT /api/users/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<UserId>,
    Json(req): Json<AdminUpdateUser>,
) -> ApiResult<Json<Value>> {
    let user = state
        .user_admin_service
        .update(Some(&auth), id, req)
        .await?;
    Ok(ok(user))
}

/// PUT /api/users/{id}/password
pub async fn reset_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<UserId>,
    ValidatedJson(req): ValidatedJson<ResetPasswordRequest>,
) -> ApiResult<Json<Value>> {
    state
        .user_admin_service
        .reset_password(&auth, id, &req.password, &req.password_confirmation)
        .await?;
    Ok(message("Password reset successfully."))
}
