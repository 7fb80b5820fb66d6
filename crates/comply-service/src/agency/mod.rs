//! Agency management.

pub mod service;

pub use service::{AgencyDetail, AgencyService};
