//! Run the reminder and overdue jobs outside the scheduler.

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use comply_core::config::AppConfig;
use comply_core::error::AppError;
use comply_worker::JobExecutionError;
use comply_worker::jobs::{OVERDUE_JOB, REMINDER_JOB};

/// Arguments for the reminders command
#[derive(Debug, Args)]
pub struct RemindersArgs {
    /// Reminder subcommand
    #[command(subcommand)]
    pub command: RemindersCommand,
}

/// Reminder subcommands
#[derive(Debug, Subcommand)]
pub enum RemindersCommand {
    /// Email PICs whose deadline is 30, 14, 7 or 1 days away
    Send {
        /// Treat this day (YYYY-MM-DD) as today
        #[arg(short, long)]
        date: Option<String>,
    },
}

/// Arguments for the overdue command
#[derive(Debug, Args)]
pub struct OverdueArgs {
    /// Overdue subcommand
    #[command(subcommand)]
    pub command: OverdueCommand,
}

/// Overdue subcommands
#[derive(Debug, Subcommand)]
pub enum OverdueCommand {
    /// Flag unsubmitted assignments whose deadline has passed
    Mark {
        /// Treat this day (YYYY-MM-DD) as today
        #[arg(short, long)]
        date: Option<String>,
    },
}

/// Execute reminder commands
pub async fn reminders(
    args: &RemindersArgs,
    config: AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        RemindersCommand::Send { date } => run(REMINDER_JOB, date.as_deref(), config, format).await,
    }
}

/// Execute overdue commands
pub async fn overdue(
    args: &OverdueArgs,
    config: AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        OverdueCommand::Mark { date } => run(OVERDUE_JOB, date.as_deref(), config, format).await,
    }
}

async fn run(
    job_type: &str,
    date: Option<&str>,
    config: AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let today = super::run_date(date)?;
    let state = super::app_state(config).await?;
    let executor = comply_api::build_executor(&state);

    let summary = executor
        .execute(job_type, today)
        .await
        .map_err(|e| match e {
            JobExecutionError::Internal(err) => err,
            other => AppError::internal(other.to_string()),
        })?;

    output::print_success(&format!("Job '{}' finished for {}", job_type, today));
    output::print_summary(&summary, format);

    state.db.close().await;
    Ok(())
}
