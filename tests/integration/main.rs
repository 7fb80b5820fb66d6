//! End-to-end tests against the assembled router.
//!
//! Tests marked `#[ignore]` need PostgreSQL; point `COMPLY_TEST_DATABASE_URL`
//! at a scratch database and run `cargo test -- --ignored`.

mod helpers;

mod access_test;
mod compliance_flow_test;
mod health_test;
mod validation_test;
