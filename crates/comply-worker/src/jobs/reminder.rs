//! Deadline reminder job.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;

use comply_service::ReminderService;

use super::REMINDER_JOB;
use crate::executor::{JobExecutionError, JobHandler};

/// Sends the day's 30/14/7/1-day reminders.
#[derive(Debug)]
pub struct ReminderJobHandler {
    reminders: Arc<ReminderService>,
}

impl ReminderJobHandler {
    pub fn new(reminders: Arc<ReminderService>) -> Self {
        Self { reminders }
    }
}

#[async_trait]
impl JobHandler for ReminderJobHandler {
    fn job_type(&self) -> &str {
        REMINDER_JOB
    }

    async fn execute(&self, today: NaiveDate) -> Result<Value, JobExecutionError> {
        let report = self.reminders.run(today).await?;
        Ok(serde_json::json!({
            "task": REMINDER_JOB,
            "date": today,
            "sent": report.sent,
            "skipped": report.skipped,
            "suppressed": report.suppressed,
            "failed": report.failed,
        }))
    }
}
