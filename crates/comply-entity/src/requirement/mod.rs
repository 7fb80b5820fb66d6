//! Compliance requirement entities.

pub mod code;
pub mod model;

pub use code::{next_requirement_code, parse_requirement_sequence};
pub use model::{CreateRequirement, Requirement, UpdateRequirement};
