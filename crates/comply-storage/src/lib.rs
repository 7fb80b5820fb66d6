//! # comply-storage
//!
//! Storage for uploaded proof-of-compliance documents. Only the local
//! filesystem provider is implemented; callers depend on the
//! [`StorageProvider`](comply_core::traits::StorageProvider) trait.

pub mod local;

pub use local::LocalStorageProvider;
