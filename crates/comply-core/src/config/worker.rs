//! Background scheduler configuration.

use serde::{Deserialize, Serialize};

/// Cron scheduler configuration for the daily batch jobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the in-process scheduler runs with the server.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Six-field cron expression for the reminder job.
    #[serde(default = "default_reminder_cron")]
    pub reminder_cron: String,
    /// Six-field cron expression for the overdue marking job.
    #[serde(default = "default_overdue_cron")]
    pub overdue_cron: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            reminder_cron: default_reminder_cron(),
            overdue_cron: default_overdue_cron(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_reminder_cron() -> String {
    "0 0 8 * * *".to_string()
}

fn default_overdue_cron() -> String {
    "0 5 0 * * *".to_string()
}
