//! # comply-core
//!
//! Core crate for the compliance tracker. Contains configuration schemas,
//! typed identifiers, pagination/sorting types, the storage provider trait,
//! and the unified error system.
//!
//! This crate has **no** internal dependencies on other workspace crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
