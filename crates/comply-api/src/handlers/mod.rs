//! HTTP request handlers, grouped by resource.

pub mod agency;
pub mod audit;
pub mod auth;
pub mod dashboard;
mod form;
pub mod health;
pub mod profile;
pub mod reference;
pub mod requirement;
pub mod upload;
pub mod user;

use axum::Json;
use serde::Serialize;
use serde_json::{Value, json};

/// Wrap handler output in the `{ success, data }` envelope.
pub(crate) fn ok<T: Serialize>(data: T) -> Json<Value> {
    Json(json!({ "success": true, "data": data }))
}

/// `{ success, message }` for operations without a payload.
pub(crate) fn message(text: &str) -> Json<Value> {
    Json(json!({ "success": true, "message": text }))
}
