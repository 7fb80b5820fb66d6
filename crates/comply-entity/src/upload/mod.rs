//! Uploaded compliance document entities.

pub mod model;
pub mod status;

pub use model::{CreateUpload, Upload, generate_upload_code};
pub use status::ApprovalStatus;
