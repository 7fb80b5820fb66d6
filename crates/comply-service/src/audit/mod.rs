//! Audit trail recording and querying.

pub mod recorder;
pub mod service;

pub use recorder::{AuditRecorder, snapshot};
pub use service::AuditService;
