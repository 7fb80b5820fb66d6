//! # comply-api
//!
//! HTTP API layer for the compliance tracker built on Axum.
//!
//! Provides the REST endpoints under `/api`, the bearer-token extractor,
//! request logging and CORS middleware, request DTOs with validation, and
//! the mapping from domain errors to HTTP responses.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, build_executor, build_state};
pub use error::{ApiError, ApiResult};
pub use state::AppState;
