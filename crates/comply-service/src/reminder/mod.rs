//! Deadline reminder batch job.

pub mod planner;
pub mod sender;
pub mod service;

pub use planner::{ReminderTarget, needs_reminder, plan};
pub use sender::{ReminderLedger, ReminderReport, send_reminders};
pub use service::ReminderService;
