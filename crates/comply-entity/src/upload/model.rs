//! Upload entity model.

use chrono::{DateTime, NaiveDate, Utc};
use comply_core::types::{AssignmentId, RequirementId, UploadId, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::ApprovalStatus;

/// A single submitted proof-of-compliance document.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Upload {
    pub id: UploadId,
    /// Public code, `UP-` followed by a unique suffix.
    pub upload_code: String,
    pub requirement_id: RequirementId,
    pub assignment_id: Option<AssignmentId>,
    pub uploader_id: UserId,
    /// Uploader's email at the time of upload, used for notifications.
    pub uploader_email: Option<String>,
    /// Path relative to the storage root.
    #[serde(skip_serializing)]
    pub file_path: String,
    pub original_name: String,
    pub size_bytes: i64,
    pub comments: Option<String>,
    pub upload_year: i32,
    pub upload_date: DateTime<Utc>,
    /// Snapshot of the deadline the upload was submitted against.
    pub deadline_at_upload: Option<NaiveDate>,
    pub approval_status: ApprovalStatus,
    pub status_change_on: Option<DateTime<Utc>>,
    pub admin_remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data required to insert an upload row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUpload {
    pub upload_code: String,
    pub requirement_id: RequirementId,
    pub assignment_id: Option<AssignmentId>,
    pub uploader_id: UserId,
    pub uploader_email: Option<String>,
    pub file_path: String,
    pub original_name: String,
    pub size_bytes: i64,
    pub comments: Option<String>,
    pub upload_year: i32,
    pub upload_date: DateTime<Utc>,
    pub deadline_at_upload: Option<NaiveDate>,
    pub approval_status: ApprovalStatus,
    pub status_change_on: Option<DateTime<Utc>>,
    pub admin_remarks: Option<String>,
}

/// Generate a fresh `UP-` code.
pub fn generate_upload_code() -> String {
    format!("UP-{}", Uuid::now_v7().simple()).to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_codes_are_unique() {
        let a = generate_upload_code();
        let b = generate_upload_code();
        assert!(a.starts_with("UP-"));
        assert_ne!(a, b);
    }
}
