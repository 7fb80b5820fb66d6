//! Calendar entry statuses.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use comply_entity::assignment::ComplianceStatus;

use super::status::{StatusBucket, requirement_bucket};

/// Status of one requirement on the deadline calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarStatus {
    Na,
    ForApproval,
    Pending,
    Overdue,
    Complied,
}

impl From<StatusBucket> for CalendarStatus {
    fn from(bucket: StatusBucket) -> Self {
        match bucket {
            StatusBucket::Na => Self::Na,
            StatusBucket::Pending => Self::Pending,
            StatusBucket::Overdue => Self::Overdue,
            StatusBucket::Complied => Self::Complied,
        }
    }
}

/// Administrator view: a pending upload for the current deadline puts the
/// requirement in `for_approval`, otherwise the dashboard bucket applies.
pub fn admin_calendar_status(
    deadline: Option<NaiveDate>,
    statuses: &[ComplianceStatus],
    has_pending_upload: bool,
) -> CalendarStatus {
    if deadline.is_none() {
        return CalendarStatus::Na;
    }
    if has_pending_upload {
        return CalendarStatus::ForApproval;
    }
    requirement_bucket(deadline, statuses).into()
}

/// PIC view, derived from the caller's own assignment and uploads.
pub fn user_calendar_status(
    deadline: Option<NaiveDate>,
    own_status: Option<ComplianceStatus>,
    has_own_pending_upload: bool,
) -> CalendarStatus {
    if deadline.is_none() {
        return CalendarStatus::Na;
    }
    let Some(status) = own_status else {
        return CalendarStatus::Pending;
    };
    if has_own_pending_upload {
        return CalendarStatus::ForApproval;
    }
    match status {
        ComplianceStatus::Overdue => CalendarStatus::Overdue,
        ComplianceStatus::Approved => CalendarStatus::Complied,
        ComplianceStatus::Submitted => CalendarStatus::ForApproval,
        ComplianceStatus::Pending | ComplianceStatus::Rejected => CalendarStatus::Pending,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ComplianceStatus::*;

    fn deadline() -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2026, 6, 30)
    }

    #[test]
    fn test_admin_pending_upload_wins() {
        assert_eq!(
            admin_calendar_status(deadline(), &[Overdue], true),
            CalendarStatus::ForApproval
        );
        assert_eq!(
            admin_calendar_status(deadline(), &[Overdue], false),
            CalendarStatus::Overdue
        );
        assert_eq!(admin_calendar_status(None, &[], true), CalendarStatus::Na);
    }

    #[test]
    fn test_user_status_follows_own_assignment() {
        assert_eq!(user_calendar_status(deadline(), None, false), CalendarStatus::Pending);
        assert_eq!(
            user_calendar_status(deadline(), Some(Submitted), false),
            CalendarStatus::ForApproval
        );
        assert_eq!(
            user_calendar_status(deadline(), Some(Approved), false),
            CalendarStatus::Complied
        );
        assert_eq!(
            user_calendar_status(deadline(), Some(Rejected), false),
            CalendarStatus::Pending
        );
        assert_eq!(
            user_calendar_status(deadline(), Some(Overdue), true),
            CalendarStatus::ForApproval
        );
    }
}
