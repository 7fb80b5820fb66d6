//! Overdue marking job.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;

use comply_service::OverdueService;

use super::OVERDUE_JOB;
use crate::executor::{JobExecutionError, JobHandler};

/// Moves assignments past their deadline to OVERDUE.
#[derive(Debug)]
pub struct OverdueJobHandler {
    overdue: Arc<OverdueService>,
}

impl OverdueJobHandler {
    pub fn new(overdue: Arc<OverdueService>) -> Self {
        Self { overdue }
    }
}

#[async_trait]
impl JobHandler for OverdueJobHandler {
    fn job_type(&self) -> &str {
        OVERDUE_JOB
    }

    async fn execute(&self, today: NaiveDate) -> Result<Value, JobExecutionError> {
        let marked = self.overdue.mark(today).await.map_err(|e| {
            JobExecutionError::Transient(format!("Overdue marking failed: {}", e))
        })?;
        Ok(serde_json::json!({
            "task": OVERDUE_JOB,
            "date": today,
            "marked": marked,
        }))
    }
}
