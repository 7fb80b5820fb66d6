//! Rules deciding whether an upload may be stored.

use chrono::NaiveDate;

use comply_core::config::StorageConfig;
use comply_core::error::AppError;
use comply_core::result::AppResult;
use comply_entity::assignment::RequirementAssignment;

pub const NOT_ASSIGNED: &str = "Unauthorized: You are not assigned to this requirement.";
pub const DEADLINE_REQUIRED: &str =
    "Uploads are disabled until a deadline is set for this requirement.";
pub const APPROVED_EXISTS: &str = "An approved upload already exists for this deadline.";

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Validate the uploaded file itself: present, accepted type, within size.
pub fn check_document(config: &StorageConfig, file_name: &str, bytes: &[u8]) -> AppResult<()> {
    if file_name.trim().is_empty() || bytes.is_empty() {
        return Err(AppError::validation("The doc file field is required."));
    }
    let types = config.allowed_extensions.join(", ");
    if !config.accepts(file_name) || !bytes.starts_with(PDF_MAGIC) {
        return Err(AppError::validation(format!(
            "The doc file field must be a file of type: {types}."
        )));
    }
    if bytes.len() as u64 > config.max_upload_bytes {
        return Err(AppError::validation(format!(
            "The doc file field must not be greater than {} kilobytes.",
            config.max_upload_bytes / 1024
        )));
    }
    Ok(())
}

/// Deadline an upload is filed against: the assignment's, else the requirement's.
///
/// Non-admins need an assignment and an effective deadline. Admins may
/// upload without either.
pub fn effective_deadline(
    is_admin: bool,
    assignment: Option<&RequirementAssignment>,
    requirement_deadline: Option<NaiveDate>,
) -> AppResult<Option<NaiveDate>> {
    if !is_admin && assignment.is_none() {
        return Err(AppError::authorization(NOT_ASSIGNED));
    }
    let deadline = assignment
        .and_then(|a| a.deadline)
        .or(requirement_deadline);
    if !is_admin && deadline.is_none() {
        return Err(AppError::validation(DEADLINE_REQUIRED));
    }
    Ok(deadline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use comply_core::error::ErrorKind;
    use comply_core::types::{AssignmentId, RequirementId, UserId};
    use comply_entity::assignment::ComplianceStatus;

    fn assignment(deadline: Option<NaiveDate>) -> RequirementAssignment {
        RequirementAssignment {
            id: AssignmentId::new(),
            assignment_code: "ASGN-0000000001".to_string(),
            requirement_id: RequirementId::new(),
            user_id: UserId::new(),
            deadline,
            compliance_status: ComplianceStatus::Pending,
            last_submitted_at: None,
            last_approved_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn day(d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2026, 6, d)
    }

    #[test]
    fn test_non_admin_without_assignment_is_forbidden() {
        let err = effective_deadline(false, None, day(1)).unwrap_err();
        assert!(err.is(ErrorKind::Authorization));
        assert_eq!(err.message, NOT_ASSIGNED);
    }

    #[test]
    fn test_assignment_deadline_wins() {
        let a = assignment(day(20));
        assert_eq!(effective_deadline(false, Some(&a), day(1)).unwrap(), day(20));
        let a = assignment(None);
        assert_eq!(effective_deadline(false, Some(&a), day(1)).unwrap(), day(1));
    }

    #[test]
    fn test_non_admin_needs_a_deadline() {
        let a = assignment(None);
        let err = effective_deadline(false, Some(&a), None).unwrap_err();
        assert!(err.is(ErrorKind::Validation));
        assert_eq!(err.message, DEADLINE_REQUIRED);
    }

    #[test]
    fn test_admin_may_upload_without_assignment_or_deadline() {
        assert_eq!(effective_deadline(true, None, None).unwrap(), None);
    }

    #[test]
    fn test_check_document() {
        let config = StorageConfig::default();
        assert!(check_document(&config, "permit.pdf", b"%PDF-1.7\n...").is_ok());

        let err = check_document(&config, "permit.docx", b"%PDF-1.7").unwrap_err();
        assert_eq!(err.message, "The doc file field must be a file of type: pdf.");
        assert!(check_document(&config, "fake.pdf", b"MZ\x90\x00").is_err());
        assert!(check_document(&config, "empty.pdf", b"").is_err());

        let small = StorageConfig {
            max_upload_bytes: 8,
            ..StorageConfig::default()
        };
        let err = check_document(&small, "big.pdf", b"%PDF-1.7 padding").unwrap_err();
        assert_eq!(err.message, "The doc file field must not be greater than 0 kilobytes.");
    }
}
