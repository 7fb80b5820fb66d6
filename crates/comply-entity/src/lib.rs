//! # comply-entity
//!
//! Domain entity models for the compliance tracker. Every struct in this
//! crate represents a database table row or a domain value object. All
//! entities derive `Debug`, `Clone`, `Serialize`, `Deserialize`, and
//! database entities additionally derive `sqlx::FromRow`.

pub mod agency;
pub mod assignment;
pub mod audit;
pub mod reference;
pub mod requirement;
pub mod upload;
pub mod user;
