//! Document uploads: admission, review, and access.

pub mod access;
pub mod admission;
pub mod service;

pub use access::{DocumentAccessService, DownloadResult, SignedUrl};
pub use admission::{
    APPROVED_EXISTS, DEADLINE_REQUIRED, NOT_ASSIGNED, check_document, effective_deadline,
};
pub use service::{NewUpload, UploadService};
