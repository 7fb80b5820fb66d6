//! Audit log entities.

pub mod action;
pub mod model;

pub use action::{AuditAction, EntityType};
pub use model::{AuditLogEntry, AuditLogWithActor, CreateAuditLogEntry};
