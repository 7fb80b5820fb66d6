//! Sending one reminder window.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, error, info};

use comply_core::result::AppResult;
use comply_core::types::AssignmentId;
use comply_database::repositories::{ReminderCandidate, ReminderLogRepository};

use super::planner::{ReminderTarget, needs_reminder};
use crate::notification::templates::{self, RequirementMailFields};
use crate::notification::{ComplianceNotifier, OutgoingMail};

/// Record of reminders already sent, used to avoid same-day resends.
#[async_trait]
pub trait ReminderLedger: Send + Sync {
    async fn was_sent(&self, assignment_id: AssignmentId, offset_days: i64, on: NaiveDate)
    -> AppResult<bool>;
    async fn record(&self, assignment_id: AssignmentId, offset_days: i64, on: NaiveDate)
    -> AppResult<()>;
}

#[async_trait]
impl ReminderLedger for ReminderLogRepository {
    async fn was_sent(
        &self,
        assignment_id: AssignmentId,
        offset_days: i64,
        on: NaiveDate,
    ) -> AppResult<bool> {
        ReminderLogRepository::was_sent(self, assignment_id, offset_days, on).await
    }

    async fn record(
        &self,
        assignment_id: AssignmentId,
        offset_days: i64,
        on: NaiveDate,
    ) -> AppResult<()> {
        ReminderLogRepository::record(self, assignment_id, offset_days, on).await
    }
}

/// Counts for one reminder run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReminderReport {
    pub sent: usize,
    /// No user or no email on file.
    pub skipped: usize,
    /// Already sent today.
    pub suppressed: usize,
    pub failed: usize,
}

impl ReminderReport {
    pub fn merge(&mut self, other: &ReminderReport) {
        self.sent += other.sent;
        self.skipped += other.skipped;
        self.suppressed += other.suppressed;
        self.failed += other.failed;
    }
}

/// Send the reminder of one window to each candidate, continuing past
/// failures.
pub async fn send_reminders(
    notifier: &ComplianceNotifier,
    ledger: Option<&dyn ReminderLedger>,
    today: NaiveDate,
    target: ReminderTarget,
    candidates: &[ReminderCandidate],
) -> ReminderReport {
    let mut report = ReminderReport::default();

    for candidate in candidates {
        if !needs_reminder(candidate.compliance_status) {
            continue;
        }
        let email = candidate
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty());
        let (Some(_), Some(email)) = (candidate.user_id, email) else {
            debug!(assignment_id = %candidate.assignment_id, "Reminder skipped: no recipient");
            report.skipped += 1;
            continue;
        };

        if let Some(ledger) = ledger {
            match ledger
                .was_sent(candidate.assignment_id, target.offset_days, today)
                .await
            {
                Ok(true) => {
                    report.suppressed += 1;
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    error!(assignment_id = %candidate.assignment_id, error = %e, "Reminder log lookup failed");
                }
            }
        }

        let fields = RequirementMailFields {
            recipient_name: candidate.employee_name.as_deref().unwrap_or("there"),
            req_code: &candidate.req_code,
            title: &candidate.title,
            agency_name: &candidate.agency_name,
            deadline: Some(candidate.deadline),
        };
        let (subject, body) = templates::reminder(
            &fields,
            target.offset_days,
            candidate.compliance_status.as_str(),
            notifier.app_url(),
        );
        let mail = OutgoingMail {
            to: email.to_string(),
            subject,
            body,
        };

        match notifier.deliver(&mail).await {
            Ok(()) => {
                report.sent += 1;
                if let Some(ledger) = ledger {
                    if let Err(e) = ledger
                        .record(candidate.assignment_id, target.offset_days, today)
                        .await
                    {
                        error!(assignment_id = %candidate.assignment_id, error = %e, "Failed to record reminder");
                    }
                }
            }
            Err(e) => {
                report.failed += 1;
                error!(
                    assignment_id = %candidate.assignment_id,
                    email = %email,
                    context = "reminder",
                    offset_days = target.offset_days,
                    error = %e,
                    "Failed to send compliance reminder"
                );
            }
        }
    }

    info!(
        offset_days = target.offset_days,
        due_on = %target.due_on,
        sent = report.sent,
        skipped = report.skipped,
        failed = report.failed,
        "Reminder window processed"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    use comply_core::types::UserId;
    use comply_entity::assignment::ComplianceStatus;

    use crate::notification::mailer::testing::RecordingMailer;

    fn candidate(email: Option<&str>, status: ComplianceStatus) -> ReminderCandidate {
        ReminderCandidate {
            assignment_id: AssignmentId::new(),
            assignment_code: "ASGN-TEST000001".to_string(),
            compliance_status: status,
            deadline: NaiveDate::from_ymd_opt(2026, 1, 8).unwrap(),
            user_id: Some(UserId::new()),
            employee_name: Some("Ana Cruz".to_string()),
            email: email.map(String::from),
            req_code: "BIR-001".to_string(),
            title: "Monthly remittance".to_string(),
            agency_name: "BIR".to_string(),
        }
    }

    fn target() -> (NaiveDate, ReminderTarget) {
        let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        (
            today,
            ReminderTarget {
                offset_days: 7,
                due_on: NaiveDate::from_ymd_opt(2026, 1, 8).unwrap(),
            },
        )
    }

    #[derive(Default)]
    struct MemoryLedger {
        rows: Mutex<HashSet<(AssignmentId, i64, NaiveDate)>>,
    }

    #[async_trait]
    impl ReminderLedger for MemoryLedger {
        async fn was_sent(&self, id: AssignmentId, offset: i64, on: NaiveDate) -> AppResult<bool> {
            Ok(self.rows.lock().unwrap().contains(&(id, offset, on)))
        }
        async fn record(&self, id: AssignmentId, offset: i64, on: NaiveDate) -> AppResult<()> {
            self.rows.lock().unwrap().insert((id, offset, on));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_submitted_assignment_is_reminded() {
        let mailer = Arc::new(RecordingMailer::default());
        let notifier = ComplianceNotifier::new(mailer.clone(), "https://app");
        let (today, target) = target();

        let report = send_reminders(
            &notifier,
            None,
            today,
            target,
            &[candidate(Some("pic@example.com"), ComplianceStatus::Submitted)],
        )
        .await;

        assert_eq!(report.sent, 1);
        assert_eq!(mailer.recipients(), ["pic@example.com"]);
        let sent = mailer.sent.lock().unwrap();
        assert!(sent[0].subject.contains("in 7 days"));
    }

    #[tokio::test]
    async fn test_missing_email_skips_and_failures_continue() {
        let mailer = Arc::new(RecordingMailer::failing_for(&["bad@example.com"]));
        let notifier = ComplianceNotifier::new(mailer.clone(), "https://app");
        let (today, target) = target();

        let mut orphan = candidate(Some("orphan@example.com"), ComplianceStatus::Pending);
        orphan.user_id = None;

        let report = send_reminders(
            &notifier,
            None,
            today,
            target,
            &[
                candidate(None, ComplianceStatus::Pending),
                orphan,
                candidate(Some("bad@example.com"), ComplianceStatus::Pending),
                candidate(Some("good@example.com"), ComplianceStatus::Overdue),
                candidate(Some("done@example.com"), ComplianceStatus::Approved),
            ],
        )
        .await;

        assert_eq!(
            report,
            ReminderReport {
                sent: 1,
                skipped: 2,
                suppressed: 0,
                failed: 1,
            }
        );
        assert_eq!(mailer.recipients(), ["good@example.com"]);
    }

    #[tokio::test]
    async fn test_ledger_suppresses_same_day_resend() {
        let mailer = Arc::new(RecordingMailer::default());
        let notifier = ComplianceNotifier::new(mailer.clone(), "https://app");
        let ledger = MemoryLedger::default();
        let (today, target) = target();
        let batch = [candidate(Some("pic@example.com"), ComplianceStatus::Pending)];

        let first = send_reminders(&notifier, Some(&ledger), today, target, &batch).await;
        let second = send_reminders(&notifier, Some(&ledger), today, target, &batch).await;

        assert_eq!(first.sent, 1);
        assert_eq!(second.sent, 0);
        assert_eq!(second.suppressed, 1);
        assert_eq!(mailer.recipients().len(), 1);
    }
}
