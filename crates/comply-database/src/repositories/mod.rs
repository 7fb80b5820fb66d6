//! Repository implementations for all compliance tracker entities.

pub mod agency;
pub mod assignment;
pub mod audit;
pub mod reference;
pub mod reminder;
pub mod requirement;
pub mod upload;
pub mod user;

pub use agency::AgencyRepository;
pub use assignment::{AssignmentRepository, AssignmentWithUser, ReminderCandidate};
pub use audit::{AuditLogFilter, AuditLogRepository};
pub use reference::ReferenceRepository;
pub use reminder::ReminderLogRepository;
pub use requirement::{
    RequirementFilter, RequirementRepository, RequirementRow, RequirementSort,
    RequirementStatusFilter,
};
pub use upload::{UploadRepository, UploadRow};
pub use user::UserRepository;

use comply_core::error::{AppError, ErrorKind};

/// Map a write failure, reporting unique-constraint violations as conflicts.
pub(crate) fn write_error(err: sqlx::Error, context: &str, conflict: &str) -> AppError {
    let is_unique_violation = err
        .as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == "23505");
    if is_unique_violation {
        AppError::with_source(ErrorKind::Conflict, conflict, err)
    } else {
        AppError::with_source(ErrorKind::Database, context, err)
    }
}

/// Escape `%`, `_` and `\` so user input matches literally inside `LIKE`.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("BIR"), "%BIR%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
