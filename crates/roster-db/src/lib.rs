//! Roster Database — SurrealDB connection management and repository
//! implementations.
//!
//! This crate provides:
//! - Connection management ([`DbManager`], [`DbConfig`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - Repositories for the `roster-core` traits ([`repository`])
//! - Transactional writes ([`SurrealUnitOfWork`]) and the bundled
//!   [`SurrealDirectoryStore`]

mod connection;
mod error;
pub mod repository;
mod schema;
mod store;
mod unit_of_work;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use schema::run_migrations;
pub use store::SurrealDirectoryStore;
pub use unit_of_work::SurrealUnitOfWork;
