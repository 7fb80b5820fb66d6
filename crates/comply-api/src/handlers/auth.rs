//! Auth handlers: login, refresh, logout, me.

use axum::Json;
use axum::extract::State;
use serde_json::Value;

use crate::dto::request::{LoginRequest, RefreshRequest};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, RequestOrigin, ValidatedJson};
use crate::handlers::{message, ok};
use crate::state::AppState;

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    origin: RequestOrigin,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<Value>> {
    let result = state
        .auth_service
        .login(&req.email, &req.password, origin.ip_address, origin.user_agent)
        .await?;
    Ok(ok(result))
}

/// POST /api/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RefreshRequest>,
) -> ApiResult<Json<Value>> {
    let tokens = state.auth_service.refresh(&req.refresh_token).await?;
    Ok(ok(tokens))
}

/// POST /api/auth/logout
pub async fn logout(State(state): State<AppState>, auth: AuthUser) -> Json<Value> {
    state.auth_service.logout(&auth).await;
    message("Logged out successfully.")
}

/// GET /api/me
pub async fn me(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<Value>> {
    let user = state.auth_service.me(&auth).await?;
    Ok(ok(user))
}
