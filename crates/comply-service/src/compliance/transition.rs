//! Assignment lifecycle transitions.

use chrono::{DateTime, Utc};

use comply_entity::assignment::{ComplianceStatus, RequirementAssignment};
use comply_entity::upload::ApprovalStatus;

/// The mutable status columns of an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignmentProgress {
    pub status: ComplianceStatus,
    pub last_submitted_at: Option<DateTime<Utc>>,
    pub last_approved_at: Option<DateTime<Utc>>,
}

impl AssignmentProgress {
    pub fn of(assignment: &RequirementAssignment) -> Self {
        Self {
            status: assignment.compliance_status,
            last_submitted_at: assignment.last_submitted_at,
            last_approved_at: assignment.last_approved_at,
        }
    }

    /// State after an upload is stored with the given initial approval status.
    pub fn on_upload(self, approval: ApprovalStatus, now: DateTime<Utc>) -> Self {
        match approval {
            ApprovalStatus::Pending => Self {
                status: ComplianceStatus::Submitted,
                last_submitted_at: Some(now),
                ..self
            },
            ApprovalStatus::Approved => Self {
                status: ComplianceStatus::Approved,
                last_submitted_at: Some(now),
                last_approved_at: Some(now),
            },
            ApprovalStatus::Rejected => Self {
                status: ComplianceStatus::Rejected,
                ..self
            },
        }
    }

    /// State after an upload is approved. Every approval stamps `now`.
    pub fn on_approved(self, now: DateTime<Utc>) -> Self {
        Self {
            status: ComplianceStatus::Approved,
            last_approved_at: Some(now),
            ..self
        }
    }

    /// State after an upload is rejected: back to waiting for a submission.
    pub fn on_rejected(self) -> Self {
        Self {
            status: ComplianceStatus::Pending,
            ..self
        }
    }

    /// State after the requirement deadline moves: a fresh cycle.
    pub fn on_deadline_changed(self) -> Self {
        Self {
            status: ComplianceStatus::Pending,
            last_submitted_at: None,
            last_approved_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn fresh() -> AssignmentProgress {
        AssignmentProgress {
            status: ComplianceStatus::Pending,
            last_submitted_at: None,
            last_approved_at: None,
        }
    }

    #[test]
    fn test_pending_upload_submits() {
        let now = Utc::now();
        let next = fresh().on_upload(ApprovalStatus::Pending, now);
        assert_eq!(next.status, ComplianceStatus::Submitted);
        assert_eq!(next.last_submitted_at, Some(now));
        assert_eq!(next.last_approved_at, None);
    }

    #[test]
    fn test_admin_approved_upload_sets_both_timestamps() {
        let now = Utc::now();
        let next = fresh().on_upload(ApprovalStatus::Approved, now);
        assert_eq!(next.status, ComplianceStatus::Approved);
        assert_eq!(next.last_submitted_at, Some(now));
        assert_eq!(next.last_approved_at, Some(now));
    }

    #[test]
    fn test_admin_rejected_upload_keeps_timestamps() {
        let earlier = Utc::now() - Duration::days(3);
        let start = AssignmentProgress {
            last_submitted_at: Some(earlier),
            ..fresh()
        };
        let next = start.on_upload(ApprovalStatus::Rejected, Utc::now());
        assert_eq!(next.status, ComplianceStatus::Rejected);
        assert_eq!(next.last_submitted_at, Some(earlier));
    }

    #[test]
    fn test_reapproval_stamps_latest_time() {
        let first = Utc::now() - Duration::hours(2);
        let latest = Utc::now();
        let approved = fresh().on_approved(first);
        let again = approved.on_approved(latest);
        assert_eq!(again.status, ComplianceStatus::Approved);
        assert_eq!(again.last_approved_at, Some(latest));
    }

    #[test]
    fn test_resubmission_after_rejection_restamps_approval() {
        let t1 = Utc::now() - Duration::days(5);
        let t2 = Utc::now();
        let cycle = fresh()
            .on_upload(ApprovalStatus::Pending, t1)
            .on_approved(t1)
            .on_rejected()
            .on_upload(ApprovalStatus::Pending, t2)
            .on_approved(t2);
        assert_eq!(cycle.status, ComplianceStatus::Approved);
        assert_eq!(cycle.last_submitted_at, Some(t2));
        assert_eq!(cycle.last_approved_at, Some(t2));
    }

    #[test]
    fn test_rejection_returns_to_pending() {
        let submitted = fresh().on_upload(ApprovalStatus::Pending, Utc::now());
        let rejected = submitted.on_rejected();
        assert_eq!(rejected.status, ComplianceStatus::Pending);
        assert_eq!(rejected.last_submitted_at, submitted.last_submitted_at);
    }

    #[test]
    fn test_deadline_change_clears_cycle() {
        let now = Utc::now();
        let approved = fresh().on_upload(ApprovalStatus::Approved, now);
        assert_eq!(approved.on_deadline_changed(), fresh());
    }
}
