//! Job executor, dispatching a run to the handler registered for a job type.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use tracing;

use comply_core::error::AppError;

/// A batch job that runs for one calendar day.
#[async_trait]
pub trait JobHandler: Send + Sync + std::fmt::Debug {
    /// Get the job type this handler processes
    fn job_type(&self) -> &str;

    /// Run the job for `today`, returning a summary of what it did
    async fn execute(&self, today: NaiveDate) -> Result<Value, JobExecutionError>;
}

/// Error from job execution
#[derive(Debug, thiserror::Error)]
pub enum JobExecutionError {
    /// Permanent failure, rerunning will not help
    #[error("Permanent job failure: {0}")]
    Permanent(String),

    /// Transient failure, the next scheduled run may succeed
    #[error("Transient job failure: {0}")]
    Transient(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] AppError),
}

/// Dispatches runs to the appropriate handler based on job type
#[derive(Debug)]
pub struct JobExecutor {
    handlers: HashMap<String, Arc<dyn JobHandler>>,
}

impl JobExecutor {
    /// Create an executor with no handlers
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a job handler, replacing any earlier one of the same type
    pub fn register(&mut self, handler: Arc<dyn JobHandler>) {
        let job_type = handler.job_type().to_string();
        tracing::info!("Registered job handler for type '{}'", job_type);
        self.handlers.insert(job_type, handler);
    }

    /// Run the handler registered for `job_type`
    pub async fn execute(
        &self,
        job_type: &str,
        today: NaiveDate,
    ) -> Result<Value, JobExecutionError> {
        let handler = self.handlers.get(job_type).ok_or_else(|| {
            JobExecutionError::Permanent(format!(
                "No handler registered for job type '{}'",
                job_type
            ))
        })?;

        tracing::info!(job_type, %today, "Executing job");
        let started = std::time::Instant::now();
        let result = handler.execute(today).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(summary) => tracing::info!(job_type, elapsed_ms, %summary, "Job completed"),
            Err(e) => tracing::error!(job_type, elapsed_ms, error = %e, "Job failed"),
        }
        result
    }

    /// Check if a handler is registered for a job type
    pub fn has_handler(&self, job_type: &str) -> bool {
        self.handlers.contains_key(job_type)
    }

    /// Registered job types, sorted
    pub fn registered_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.handlers.keys().cloned().collect();
        types.sort();
        types
    }
}

impl Default for JobExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records every day it was run for.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingJob {
        pub(crate) runs: Mutex<Vec<NaiveDate>>,
        pub(crate) fail: bool,
    }

    #[async_trait]
    impl JobHandler for RecordingJob {
        fn job_type(&self) -> &str {
            "recording"
        }

        async fn execute(&self, today: NaiveDate) -> Result<Value, JobExecutionError> {
            self.runs.lock().unwrap().push(today);
            if self.fail {
                return Err(AppError::database("connection reset").into());
            }
            Ok(serde_json::json!({ "runs": self.runs.lock().unwrap().len() }))
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, 4).unwrap()
    }

    #[tokio::test]
    async fn test_dispatches_to_registered_handler() {
        let job = Arc::new(RecordingJob::default());
        let mut executor = JobExecutor::new();
        executor.register(job.clone());

        let summary = executor.execute("recording", day()).await.unwrap();
        assert_eq!(summary["runs"], 1);
        assert_eq!(*job.runs.lock().unwrap(), vec![day()]);
        assert!(executor.has_handler("recording"));
        assert_eq!(executor.registered_types(), vec!["recording".to_string()]);
    }

    #[tokio::test]
    async fn test_unknown_job_type_is_permanent() {
        let executor = JobExecutor::default();
        let err = executor.execute("missing", day()).await.unwrap_err();
        assert!(matches!(err, JobExecutionError::Permanent(_)));
    }

    #[tokio::test]
    async fn test_handler_error_is_returned() {
        let mut executor = JobExecutor::new();
        executor.register(Arc::new(RecordingJob {
            fail: true,
            ..RecordingJob::default()
        }));
        let err = executor.execute("recording", day()).await.unwrap_err();
        assert!(matches!(err, JobExecutionError::Internal(_)));
    }
}
