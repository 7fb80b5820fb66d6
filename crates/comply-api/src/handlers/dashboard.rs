//! Dashboard handlers.

use axum::Json;
use axum::extract::State;
use serde_json::Value;

use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::handlers::ok;
use crate::state::AppState;

/// GET /api/dashboard/stats
pub async fn stats(State(state): State<AppState>, _auth: AuthUser) -> ApiResult<Json<Value>> {
    Ok(ok(state.dashboard_service.stats().await?))
}

/// GET /api/dashboard/activity
pub async fn activity(State(state): State<AppState>, _auth: AuthUser) -> ApiResult<Json<Value>> {
    Ok(ok(state.dashboard_service.activity().await?))
}

/// GET /api/dashboard/agency-stats
pub async fn agency_stats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Value>> {
    Ok(ok(state.dashboard_service.agency_stats(&auth).await?))
}

/// GET /api/dashboard/calendar
pub async fn calendar(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<Value>> {
    Ok(ok(state.dashboard_service.calendar(&auth).await?))
}
