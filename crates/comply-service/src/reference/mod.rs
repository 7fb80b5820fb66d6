//! Position and branch/unit/department management.

pub mod service;

pub use service::ReferenceService;
