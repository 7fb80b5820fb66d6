//! Account services: login, self-service profile, and administration.

pub mod admin;
pub mod auth;
pub mod code;
pub mod profile;

pub use admin::{AdminCreateUser, AdminUpdateUser, UserAdminService};
pub use auth::{AuthService, LoginResult};
pub use profile::{ProfileService, UpdateProfileRequest};
