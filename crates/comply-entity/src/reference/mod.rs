//! Organizational reference data: positions and branch/unit/departments.

pub mod model;

pub use model::{BranchUnitDepartment, Position, ReferenceKind};
