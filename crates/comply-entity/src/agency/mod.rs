//! Regulatory agency entities.

pub mod model;

pub use model::{Agency, CreateAgency, UpdateAgency, normalize_agency_code};
