//! Request and query DTOs.

pub mod request;
