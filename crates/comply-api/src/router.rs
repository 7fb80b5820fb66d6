//! Route definitions for the compliance tracker HTTP API.
//!
//! All routes are grouped by resource and mounted under `/api`.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post, put},
};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use comply_entity::reference::{BranchUnitDepartment, Position};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let max_body = state.config.server.max_body_bytes;

    let api_routes = Router::new()
        .merge(health_routes())
        .merge(auth_routes())
        .merge(user_routes())
        .merge(reference_routes())
        .merge(requirement_routes())
        .merge(upload_routes())
        .merge(dashboard_routes())
        .merge(audit_routes());

    let cors = middleware::cors::build_cors_layer(&state.config.server.cors);

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(max_body))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// Login, refresh, logout, and the caller's own profile
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/me", get(handlers::auth::me))
        .route(
            "/profile",
            get(handlers::profile::show).put(handlers::profile::update),
        )
        .route(
            "/profile/password",
            put(handlers::profile::change_password),
        )
}

/// User administration
fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(handlers::user::list).post(handlers::user::create),
        )
        .route(
            "/users/{id}",
            get(handlers::user::show).put(handlers::user::update),
        )
        .route(
            "/users/{id}/password",
            put(handlers::user::reset_password),
        )
}

/// Agencies, positions, and branch/unit/departments
fn reference_routes() -> Router<AppState> {
    use handlers::reference;

    Router::new()
        .route(
            "/agencies",
            get(handlers::agency::list).post(handlers::agency::create),
        )
        .route(
            "/agencies/{id}",
            get(handlers::agency::show)
                .put(handlers::agency::update)
                .delete(handlers::agency::delete),
        )
        .route(
            "/positions",
            get(reference::list::<Position>).post(reference::create::<Position>),
        )
        .route(
            "/positions/{id}",
            get(reference::show::<Position>)
                .put(reference::update::<Position>)
                .delete(reference::delete::<Position>),
        )
        .route(
            "/branch-unit-departments",
            get(reference::list::<BranchUnitDepartment>)
                .post(reference::create::<BranchUnitDepartment>),
        )
        .route(
            "/branch-unit-departments/{id}",
            get(reference::show::<BranchUnitDepartment>)
                .put(reference::update::<BranchUnitDepartment>)
                .delete(reference::delete::<BranchUnitDepartment>),
        )
}

/// Requirement register, assignments, import and export
fn requirement_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/requirements",
            get(handlers::requirement::list).post(handlers::requirement::create),
        )
        .route("/requirements/my", get(handlers::requirement::my))
        .route("/requirements/export", get(handlers::requirement::export))
        .route("/requirements/import", post(handlers::requirement::import))
        .route(
            "/requirements/{id}",
            get(handlers::requirement::show)
                .put(handlers::requirement::update)
                .delete(handlers::requirement::delete),
        )
}

/// Document uploads, review, and downloads
fn upload_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/uploads",
            get(handlers::upload::list).post(handlers::upload::store),
        )
        .route(
            "/uploads/{id}",
            get(handlers::upload::show).delete(handlers::upload::delete),
        )
        .route("/uploads/{id}/approve", post(handlers::upload::approve))
        .route("/uploads/{id}/reject", post(handlers::upload::reject))
        .route("/uploads/{id}/download", get(handlers::upload::download))
        .route("/uploads/{id}/signed-url", get(handlers::upload::signed_url))
        .route(
            "/uploads/{id}/signed-download",
            get(handlers::upload::signed_download),
        )
}

fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard/stats", get(handlers::dashboard::stats))
        .route("/dashboard/activity", get(handlers::dashboard::activity))
        .route(
            "/dashboard/agency-stats",
            get(handlers::dashboard::agency_stats),
        )
        .route("/dashboard/calendar", get(handlers::dashboard::calendar))
}

fn audit_routes() -> Router<AppState> {
    Router::new().route("/audit-logs", get(handlers::audit::list))
}
