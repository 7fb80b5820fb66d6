//! Dashboard aggregates: headline stats, per-agency counts, deadline calendar.

pub mod aggregate;
pub mod service;

pub use aggregate::{AgencyStats, CalendarEntry, DashboardStats};
pub use service::DashboardService;
