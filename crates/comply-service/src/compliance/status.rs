//! Requirement-level aggregates derived from assignment statuses.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use comply_entity::assignment::ComplianceStatus;

/// Status of an assignment as of `today`. A PENDING or REJECTED assignment
/// past its deadline reads OVERDUE whether or not the overdue job has run.
pub fn effective_status(
    status: ComplianceStatus,
    deadline: Option<NaiveDate>,
    today: NaiveDate,
) -> ComplianceStatus {
    match (status, deadline) {
        (ComplianceStatus::Pending | ComplianceStatus::Rejected, Some(d)) if d < today => {
            ComplianceStatus::Overdue
        }
        _ => status,
    }
}

/// Human-readable aggregate shown on requirement lists and details.
///
/// Requirements without assignments read `No PIC assigned` here, while
/// [`requirement_bucket`] files them under `pending`.
pub fn summarize_requirement(deadline: Option<NaiveDate>, statuses: &[ComplianceStatus]) -> String {
    if deadline.is_none() {
        return "N/A".to_string();
    }
    if statuses.is_empty() {
        return "No PIC assigned".to_string();
    }

    let total = statuses.len();
    let approved = count(statuses, ComplianceStatus::Approved);
    if approved == total {
        return "Complied (100%)".to_string();
    }

    let submitted = count(statuses, ComplianceStatus::Submitted);
    let done = approved + submitted;
    if done == 0 && statuses.contains(&ComplianceStatus::Overdue) {
        return "Late (100%)".to_string();
    }

    let percent = (100.0 * done as f64 / total as f64).round() as u32;
    format!("Pending ({percent}%)")
}

/// Dashboard bucket of a requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusBucket {
    Na,
    Pending,
    Overdue,
    Complied,
}

impl StatusBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Na => "na",
            Self::Pending => "pending",
            Self::Overdue => "overdue",
            Self::Complied => "complied",
        }
    }
}

impl fmt::Display for StatusBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dashboard bucket: `overdue` wins over `complied`, and a requirement
/// with no assignments is `pending`.
pub fn requirement_bucket(deadline: Option<NaiveDate>, statuses: &[ComplianceStatus]) -> StatusBucket {
    if deadline.is_none() {
        return StatusBucket::Na;
    }
    if statuses.is_empty() {
        return StatusBucket::Pending;
    }
    if statuses.contains(&ComplianceStatus::Overdue) {
        return StatusBucket::Overdue;
    }
    if statuses.iter().all(|s| *s == ComplianceStatus::Approved) {
        return StatusBucket::Complied;
    }
    StatusBucket::Pending
}

fn count(statuses: &[ComplianceStatus], wanted: ComplianceStatus) -> usize {
    statuses.iter().filter(|s| **s == wanted).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ComplianceStatus::*;

    fn some_deadline() -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2026, 3, 31)
    }

    #[test]
    fn test_no_deadline_is_na() {
        assert_eq!(summarize_requirement(None, &[Approved]), "N/A");
        assert_eq!(requirement_bucket(None, &[Overdue]), StatusBucket::Na);
    }

    #[test]
    fn test_no_assignments_differs_between_views() {
        assert_eq!(summarize_requirement(some_deadline(), &[]), "No PIC assigned");
        assert_eq!(requirement_bucket(some_deadline(), &[]), StatusBucket::Pending);
    }

    #[test]
    fn test_all_approved() {
        let statuses = [Approved, Approved];
        assert_eq!(summarize_requirement(some_deadline(), &statuses), "Complied (100%)");
        assert_eq!(requirement_bucket(some_deadline(), &statuses), StatusBucket::Complied);
    }

    #[test]
    fn test_partial_progress_rounds() {
        assert_eq!(
            summarize_requirement(some_deadline(), &[Approved, Submitted, Pending]),
            "Pending (67%)"
        );
        assert_eq!(
            summarize_requirement(some_deadline(), &[Approved, Pending, Pending]),
            "Pending (33%)"
        );
        assert_eq!(summarize_requirement(some_deadline(), &[Pending, Rejected]), "Pending (0%)");
    }

    #[test]
    fn test_late_only_without_progress() {
        assert_eq!(summarize_requirement(some_deadline(), &[Overdue, Pending]), "Late (100%)");
        assert_eq!(
            summarize_requirement(some_deadline(), &[Overdue, Submitted]),
            "Pending (50%)"
        );
    }

    #[test]
    fn test_effective_status_past_deadline() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        let past = NaiveDate::from_ymd_opt(2020, 1, 1);
        assert_eq!(effective_status(Pending, past, today), Overdue);
        assert_eq!(effective_status(Rejected, past, today), Overdue);
        assert_eq!(effective_status(Submitted, past, today), Submitted);
        assert_eq!(effective_status(Approved, past, today), Approved);
        assert_eq!(effective_status(Pending, Some(today), today), Pending);
        assert_eq!(effective_status(Pending, None, today), Pending);
    }

    #[test]
    fn test_lone_unsubmitted_assignment_past_deadline_reads_late() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        let past = NaiveDate::from_ymd_opt(2020, 1, 1);
        let statuses = [effective_status(Pending, past, today)];
        assert_eq!(summarize_requirement(past, &statuses), "Late (100%)");
    }

    #[test]
    fn test_overdue_bucket_beats_approved() {
        assert_eq!(
            requirement_bucket(some_deadline(), &[Approved, Overdue]),
            StatusBucket::Overdue
        );
        assert_eq!(
            requirement_bucket(some_deadline(), &[Approved, Submitted]),
            StatusBucket::Pending
        );
    }
}
