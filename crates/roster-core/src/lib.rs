//! Roster Core: domain models, repository traits and errors shared by
//! every Roster crate.

pub mod error;
pub mod hierarchy;
pub mod models;
pub mod repository;
