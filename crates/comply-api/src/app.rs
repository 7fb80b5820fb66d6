//! Application builder: wires repositories, services, and the router.

use std::sync::Arc;

use axum::Router;

use comply_auth::{JwtDecoder, JwtEncoder, PasswordHasher, PasswordValidator};
use comply_core::config::AppConfig;
use comply_core::result::AppResult;
use comply_core::traits::StorageProvider;
use comply_database::DatabasePool;
use comply_database::repositories::{
    AgencyRepository, AssignmentRepository, AuditLogRepository, ReferenceRepository,
    ReminderLogRepository, RequirementRepository, UploadRepository, UserRepository,
};
use comply_entity::reference::ReferenceKind;
use comply_service::notification::build_mailer;
use comply_service::reference::ReferenceService;
use comply_service::{
    AgencyService, AuditRecorder, AuditService, AuthService, ComplianceNotifier,
    DashboardService, DocumentAccessService, ImportService, OverdueService, ProfileService,
    ReminderService, RequirementService, UploadService, UserAdminService,
};
use comply_storage::LocalStorageProvider;
use comply_worker::{JobExecutor, OverdueJobHandler, ReminderJobHandler};

use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Construct every repository and service for `config` on `db`.
pub async fn build_state(config: AppConfig, db: DatabasePool) -> AppResult<AppState> {
    let pool = db.pool().clone();

    // ── Repositories ─────────────────────────────────────────────
    let user_repo = Arc::new(UserRepository::new(pool.clone()));
    let agency_repo = Arc::new(AgencyRepository::new(pool.clone()));
    let requirement_repo = Arc::new(RequirementRepository::new(pool.clone()));
    let assignment_repo = Arc::new(AssignmentRepository::new(pool.clone()));
    let upload_repo = Arc::new(UploadRepository::new(pool.clone()));
    let audit_repo = Arc::new(AuditLogRepository::new(pool.clone()));
    let reminder_log = Arc::new(ReminderLogRepository::new(pool.clone()));
    let positions = Arc::new(ReferenceRepository::new(pool.clone(), ReferenceKind::Position));
    let branch_units = Arc::new(ReferenceRepository::new(pool, ReferenceKind::BranchUnit));

    // ── Infrastructure ───────────────────────────────────────────
    let storage: Arc<dyn StorageProvider> =
        Arc::new(LocalStorageProvider::new(&config.storage.root_path).await?);
    let mailer = build_mailer(&config.mail)?;
    let notifier = Arc::new(ComplianceNotifier::new(mailer, config.mail.app_url.clone()));

    // ── Auth ─────────────────────────────────────────────────────
    let hasher = Arc::new(PasswordHasher::new());
    let password_validator = Arc::new(PasswordValidator::new(&config.auth));
    let jwt_encoder = Arc::new(JwtEncoder::new(&config.auth));
    let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));

    let audit = Arc::new(AuditRecorder::new(Arc::clone(&audit_repo)));

    // ── Services ─────────────────────────────────────────────────
    let auth_service = Arc::new(AuthService::new(
        Arc::clone(&user_repo),
        Arc::clone(&hasher),
        Arc::clone(&jwt_encoder),
        Arc::clone(&jwt_decoder),
        Arc::clone(&audit),
    ));
    let profile_service = Arc::new(ProfileService::new(
        Arc::clone(&user_repo),
        Arc::clone(&hasher),
        Arc::clone(&password_validator),
        Arc::clone(&audit),
    ));
    let user_admin_service = Arc::new(UserAdminService::new(
        Arc::clone(&user_repo),
        Arc::clone(&hasher),
        Arc::clone(&password_validator),
        Arc::clone(&audit),
    ));
    let agency_service = Arc::new(AgencyService::new(
        Arc::clone(&agency_repo),
        Arc::clone(&requirement_repo),
        Arc::clone(&audit),
    ));
    let position_service = Arc::new(ReferenceService::new(
        Arc::clone(&positions),
        Arc::clone(&audit),
    ));
    let branch_unit_service = Arc::new(ReferenceService::new(
        Arc::clone(&branch_units),
        Arc::clone(&audit),
    ));
    let requirement_service = Arc::new(RequirementService::new(
        Arc::clone(&requirement_repo),
        Arc::clone(&assignment_repo),
        Arc::clone(&upload_repo),
        Arc::clone(&agency_repo),
        Arc::clone(&user_repo),
        positions,
        branch_units,
        Arc::clone(&notifier),
        Arc::clone(&audit),
        Arc::clone(&storage),
    ));
    let import_service = Arc::new(ImportService::new(
        Arc::clone(&requirement_service),
        Arc::clone(&agency_repo),
        Arc::clone(&user_repo),
        Arc::clone(&audit),
    ));
    let upload_service = Arc::new(UploadService::new(
        Arc::clone(&upload_repo),
        Arc::clone(&assignment_repo),
        Arc::clone(&requirement_repo),
        Arc::clone(&user_repo),
        Arc::clone(&storage),
        Arc::clone(&notifier),
        Arc::clone(&audit),
        config.storage.clone(),
    ));
    let access_service = Arc::new(DocumentAccessService::new(
        Arc::clone(&upload_repo),
        Arc::clone(&assignment_repo),
        storage,
        jwt_encoder,
        Arc::clone(&jwt_decoder),
    ));
    let dashboard_service = Arc::new(DashboardService::new(
        agency_repo,
        requirement_repo,
        Arc::clone(&assignment_repo),
        upload_repo,
        Arc::clone(&audit_repo),
    ));
    let audit_service = Arc::new(AuditService::new(audit_repo));
    let reminder_service = Arc::new(ReminderService::new(
        Arc::clone(&assignment_repo),
        reminder_log,
        notifier,
        config.reminder.clone(),
    ));
    let overdue_service = Arc::new(OverdueService::new(assignment_repo));

    Ok(AppState {
        config: Arc::new(config),
        db,
        jwt_decoder,
        auth_service,
        profile_service,
        user_admin_service,
        agency_service,
        position_service,
        branch_unit_service,
        requirement_service,
        import_service,
        upload_service,
        access_service,
        dashboard_service,
        audit_service,
        reminder_service,
        overdue_service,
    })
}

/// Job executor with the reminder and overdue handlers registered.
pub fn build_executor(state: &AppState) -> JobExecutor {
    let mut executor = JobExecutor::new();
    executor.register(Arc::new(OverdueJobHandler::new(Arc::clone(
        &state.overdue_service,
    ))));
    executor.register(Arc::new(ReminderJobHandler::new(Arc::clone(
        &state.reminder_service,
    ))));
    executor
}
