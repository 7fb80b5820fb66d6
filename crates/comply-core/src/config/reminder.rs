//! Deadline reminder configuration.

use serde::{Deserialize, Serialize};

/// Settings for the daily deadline reminder batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    /// Days before a deadline on which a reminder is sent.
    #[serde(default = "default_offsets")]
    pub offsets_days: Vec<i64>,
    /// Suppress a second send for the same assignment and offset on the same day.
    #[serde(default)]
    pub deduplicate: bool,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            offsets_days: default_offsets(),
            deduplicate: false,
        }
    }
}

fn default_offsets() -> Vec<i64> {
    vec![30, 14, 7, 1]
}
