//! # comply-worker
//!
//! Daily batch jobs for the compliance tracker. The [`CronScheduler`]
//! fires registered [`JobHandler`]s on their cron expressions; the same
//! handlers can be run once from the CLI through [`JobExecutor`].

pub mod executor;
pub mod jobs;
pub mod scheduler;

pub use executor::{JobExecutionError, JobExecutor, JobHandler};
pub use jobs::{OverdueJobHandler, ReminderJobHandler};
pub use scheduler::CronScheduler;
