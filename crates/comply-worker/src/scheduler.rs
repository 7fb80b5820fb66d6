//! Cron scheduler for the daily batch jobs.

use std::sync::Arc;

use chrono::Utc;
use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing;

use comply_core::config::WorkerConfig;
use comply_core::error::AppError;

use crate::executor::JobExecutor;
use crate::jobs::{OVERDUE_JOB, REMINDER_JOB};

/// Fires registered job handlers on their cron expressions.
pub struct CronScheduler {
    scheduler: JobScheduler,
    executor: Arc<JobExecutor>,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler")
            .field("executor", &self.executor)
            .finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler
    pub async fn new(executor: Arc<JobExecutor>) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {}", e)))?;

        Ok(Self {
            scheduler,
            executor,
        })
    }

    /// Register the reminder and overdue jobs on their configured schedules
    pub async fn register_default_tasks(&self, config: &WorkerConfig) -> Result<(), AppError> {
        self.register(OVERDUE_JOB, &config.overdue_cron).await?;
        self.register(REMINDER_JOB, &config.reminder_cron).await?;

        tracing::info!("All scheduled tasks registered");
        Ok(())
    }

    /// Schedule `job_type` on a six-field cron expression.
    ///
    /// Each firing runs the handler for the current UTC date. Failures are
    /// logged and the schedule stays active.
    pub async fn register(&self, job_type: &str, cron: &str) -> Result<(), AppError> {
        if !self.executor.has_handler(job_type) {
            return Err(AppError::configuration(format!(
                "No handler registered for scheduled job '{}'",
                job_type
            )));
        }

        let executor = Arc::clone(&self.executor);
        let name = job_type.to_string();
        let job = CronJob::new_async(cron, move |_uuid, _lock| {
            let executor = Arc::clone(&executor);
            let name = name.clone();
            Box::pin(async move {
                let today = Utc::now().date_naive();
                if let Err(e) = executor.execute(&name, today).await {
                    tracing::error!("Scheduled job {} failed: {}", name, e);
                }
            })
        })
        .map_err(|e| {
            AppError::configuration(format!(
                "Invalid schedule '{}' for {}: {}",
                cron, job_type, e
            ))
        })?;

        self.scheduler.add(job).await.map_err(|e| {
            AppError::internal(format!("Failed to add {} schedule: {}", job_type, e))
        })?;

        tracing::info!("Registered: {} ({})", job_type, cron);
        Ok(())
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {}", e)))?;

        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {}", e)))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use comply_core::error::ErrorKind;

    use crate::executor::tests::RecordingJob;

    fn executor() -> Arc<JobExecutor> {
        let mut executor = JobExecutor::new();
        executor.register(Arc::new(RecordingJob::default()));
        Arc::new(executor)
    }

    #[tokio::test]
    async fn test_register_known_job() {
        let scheduler = CronScheduler::new(executor()).await.unwrap();
        scheduler.register("recording", "0 0 8 * * *").await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_unregistered_job_type() {
        let scheduler = CronScheduler::new(executor()).await.unwrap();
        let err = scheduler
            .register(REMINDER_JOB, "0 0 8 * * *")
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Configuration));
    }

    #[tokio::test]
    async fn test_rejects_invalid_cron() {
        let scheduler = CronScheduler::new(executor()).await.unwrap();
        let err = scheduler
            .register("recording", "every morning")
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Configuration));
    }
}
