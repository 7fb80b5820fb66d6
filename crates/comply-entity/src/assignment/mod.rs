//! Requirement-to-PIC assignment entities.

pub mod model;
pub mod status;

pub use model::{RequirementAssignment, generate_assignment_code};
pub use status::ComplianceStatus;
