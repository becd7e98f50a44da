//! Roster Identity — the identity collaborator of the user directory.
//!
//! This crate provides:
//! - Argon2id password hashing and verification ([`password`])
//! - Username, email, profile and password policy rules ([`validation`])
//! - [`IdentityManager`], which turns create/update requests into
//!   validated records ready to be staged in a unit of work

pub mod config;
pub mod error;
pub mod manager;
pub mod password;
pub mod validation;

pub use config::IdentityConfig;
pub use error::IdentityError;
pub use manager::{IdentityManager, PreparedCreate, PreparedUpdate};
