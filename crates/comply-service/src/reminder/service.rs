//! Daily reminder run.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use comply_core::config::ReminderConfig;
use comply_core::result::AppResult;
use comply_database::repositories::{AssignmentRepository, ReminderLogRepository};

use super::planner::plan;
use super::sender::{ReminderLedger, ReminderReport, send_reminders};
use crate::notification::ComplianceNotifier;

/// Sends the 30/14/7/1-day deadline reminders.
#[derive(Debug, Clone)]
pub struct ReminderService {
    assignment_repo: Arc<AssignmentRepository>,
    reminder_log: Arc<ReminderLogRepository>,
    notifier: Arc<ComplianceNotifier>,
    config: ReminderConfig,
}

impl ReminderService {
    pub fn new(
        assignment_repo: Arc<AssignmentRepository>,
        reminder_log: Arc<ReminderLogRepository>,
        notifier: Arc<ComplianceNotifier>,
        config: ReminderConfig,
    ) -> Self {
        Self {
            assignment_repo,
            reminder_log,
            notifier,
            config,
        }
    }

    /// Run every reminder window for `today`, sequentially.
    ///
    /// Only a failure to load candidates aborts the run; individual send
    /// failures are counted and logged.
    pub async fn run(&self, today: NaiveDate) -> AppResult<ReminderReport> {
        let ledger: Option<&dyn ReminderLedger> = if self.config.deduplicate {
            Some(self.reminder_log.as_ref())
        } else {
            None
        };

        let mut total = ReminderReport::default();
        for target in plan(today, &self.config.offsets_days) {
            let candidates = self.assignment_repo.due_on(target.due_on).await?;
            let report =
                send_reminders(&self.notifier, ledger, today, target, &candidates).await;
            total.merge(&report);
        }

        info!(
            %today,
            sent = total.sent,
            skipped = total.skipped,
            suppressed = total.suppressed,
            failed = total.failed,
            "Compliance reminders finished"
        );
        Ok(total)
    }
}
