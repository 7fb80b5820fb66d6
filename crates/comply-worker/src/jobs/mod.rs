//! Built-in job handler implementations.

pub mod overdue;
pub mod reminder;

pub use overdue::OverdueJobHandler;
pub use reminder::ReminderJobHandler;

/// Job type of the daily deadline reminder run.
pub const REMINDER_JOB: &str = "compliance_reminders";
/// Job type of the daily overdue marking run.
pub const OVERDUE_JOB: &str = "mark_overdue";
