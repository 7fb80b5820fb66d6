//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use comply_auth::JwtDecoder;
use comply_core::config::AppConfig;
use comply_database::DatabasePool;
use comply_entity::reference::{BranchUnitDepartment, Position};
use comply_service::reference::ReferenceService;
use comply_service::{
    AgencyService, AuditService, AuthService, DashboardService, DocumentAccessService,
    ImportService, OverdueService, ProfileService, ReminderService, RequirementService,
    UploadService, UserAdminService,
};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// PostgreSQL connection pool
    pub db: DatabasePool,
    /// Bearer token validator
    pub jwt_decoder: Arc<JwtDecoder>,

    // ── Accounts ─────────────────────────────────────────────
    pub auth_service: Arc<AuthService>,
    pub profile_service: Arc<ProfileService>,
    pub user_admin_service: Arc<UserAdminService>,

    // ── Reference data ───────────────────────────────────────
    pub agency_service: Arc<AgencyService>,
    pub position_service: Arc<ReferenceService<Position>>,
    pub branch_unit_service: Arc<ReferenceService<BranchUnitDepartment>>,

    // ── Compliance ───────────────────────────────────────────
    pub requirement_service: Arc<RequirementService>,
    pub import_service: Arc<ImportService>,
    pub upload_service: Arc<UploadService>,
    pub access_service: Arc<DocumentAccessService>,
    pub dashboard_service: Arc<DashboardService>,
    pub audit_service: Arc<AuditService>,

    // ── Batch jobs ───────────────────────────────────────────
    pub reminder_service: Arc<ReminderService>,
    pub overdue_service: Arc<OverdueService>,
}
