//! Which deadlines are reminded on a given day.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use comply_entity::assignment::ComplianceStatus;

/// One reminder window: assignments due on `due_on` get the
/// `offset_days` reminder today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReminderTarget {
    pub offset_days: i64,
    pub due_on: NaiveDate,
}

/// Reminder windows for `today`, one per distinct non-negative offset, in
/// the configured order.
pub fn plan(today: NaiveDate, offsets: &[i64]) -> Vec<ReminderTarget> {
    let mut targets: Vec<ReminderTarget> = Vec::with_capacity(offsets.len());
    for &offset in offsets {
        if offset < 0 || targets.iter().any(|t| t.offset_days == offset) {
            continue;
        }
        if let Some(due_on) = today.checked_add_days(Days::new(offset as u64)) {
            targets.push(ReminderTarget {
                offset_days: offset,
                due_on,
            });
        }
    }
    targets
}

/// Anything not yet approved is reminded, including submissions still
/// awaiting review.
pub fn needs_reminder(status: ComplianceStatus) -> bool {
    status != ComplianceStatus::Approved
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_offsets() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let targets = plan(today, &[30, 14, 7, 1]);
        let due: Vec<_> = targets.iter().map(|t| t.due_on.to_string()).collect();
        assert_eq!(due, ["2026-01-31", "2026-01-15", "2026-01-08", "2026-01-02"]);
    }

    #[test]
    fn test_duplicate_and_negative_offsets_are_dropped() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let offsets: Vec<_> = plan(today, &[7, -1, 7, 0])
            .iter()
            .map(|t| t.offset_days)
            .collect();
        assert_eq!(offsets, [7, 0]);
    }

    #[test]
    fn test_submitted_is_still_reminded() {
        assert!(needs_reminder(ComplianceStatus::Submitted));
        assert!(needs_reminder(ComplianceStatus::Overdue));
        assert!(!needs_reminder(ComplianceStatus::Approved));
    }
}
