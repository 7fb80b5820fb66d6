//! Requirement management, import, and export.

pub mod export;
pub mod import;
pub mod service;
pub mod view;

pub use export::{CsvExport, EXPORT_HEADERS, render_export};
pub use import::{ImportReport, ImportRowError, ImportService};
pub use service::{RequirementQuery, RequirementService};
pub use view::{AssignmentDetail, MyRequirement, NamedRef, RequirementDetail, RequirementListItem};
