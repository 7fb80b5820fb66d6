//! Compliance status engine.
//!
//! Everything in this module except [`OverdueService`] is a pure function
//! of assignment state, so the rules can be tested without a database.

pub mod calendar;
pub mod overdue;
pub mod status;
pub mod transition;

pub use calendar::{CalendarStatus, admin_calendar_status, user_calendar_status};
pub use overdue::OverdueService;
pub use status::{StatusBucket, effective_status, requirement_bucket, summarize_requirement};
pub use transition::AssignmentProgress;
