//! Own-profile handlers.

use axum::Json;
use axum::extract::State;
use serde_json::Value;

use comply_service::user::UpdateProfileRequest;

use crate::dto::request::ChangePasswordRequest;
use crate::error::ApiResult;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::handlers::{message, ok};
use crate::state::AppState;

/// GET /api/profile
pub async fn show(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<Value>> {
    let user = state.profile_service.get_profile(&auth).await?;
    Ok(ok(user))
}

/// PUT /api/profile
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<Value>> {
    let user = state.profile_service.update_profile(&auth, req).await?;
    Ok(ok(user))
}

/// PUT /api/profile/password
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<ChangePasswordRequest>,
) -> ApiResult<Json<Value>> {
    state
        .profile_service
        .change_password(
            &auth,
            &req.current_password,
            &req.password,
            &req.password_confirmation,
        )
        .await?;
    Ok(message("Password updated successfully."))
}
