//! # comply-auth
//!
//! Stateless authentication primitives for the compliance tracker.
//!
//! ## Modules
//!
//! - `jwt`: access/refresh token pairs and short-lived signed download links
//! - `password`: Argon2id hashing and password policy checks

pub mod jwt;
pub mod password;

pub use jwt::{Claims, DownloadClaims, JwtDecoder, JwtEncoder, TokenPair};
pub use password::{PasswordHasher, PasswordValidator};
