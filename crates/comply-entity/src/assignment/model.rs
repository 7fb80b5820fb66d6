//! Assignment entity model.

use chrono::{DateTime, NaiveDate, Utc};
use comply_core::types::{AssignmentId, RequirementId, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::ComplianceStatus;

/// The link between one requirement and one person-in-charge.
///
/// The pair `(requirement_id, user_id)` is unique.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RequirementAssignment {
    pub id: AssignmentId,
    /// Public code, `ASGN-` followed by ten uppercase alphanumerics.
    pub assignment_code: String,
    pub requirement_id: RequirementId,
    pub user_id: UserId,
    /// Copied from the requirement, may be overridden per assignment.
    pub deadline: Option<NaiveDate>,
    pub compliance_status: ComplianceStatus,
    pub last_submitted_at: Option<DateTime<Utc>>,
    pub last_approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate a fresh `ASGN-XXXXXXXXXX` code from random UUID bytes.
pub fn generate_assignment_code() -> String {
    let bytes = Uuid::new_v4().into_bytes();
    let suffix: String = bytes
        .iter()
        .take(10)
        .map(|b| CODE_ALPHABET[(*b as usize) % CODE_ALPHABET.len()] as char)
        .collect();
    format!("ASGN-{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignment_code_shape() {
        let code = generate_assignment_code();
        assert_eq!(code.len(), 15);
        assert!(code.starts_with("ASGN-"));
        assert!(
            code[5..]
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        );
    }
}
