//! User domain entities.

pub mod code;
pub mod model;
pub mod role;

pub use code::{format_user_code, user_code_prefix};
pub use model::{CreateUser, UpdateUser, User, UserSummary};
pub use role::UserRole;
