//! Domain models for Roster.
//!
//! Stored records (`User`, `Organization`, `Job`, `Role`, association rows)
//! live next to the request/response shapes of the directory service.

pub mod association;
pub mod directory;
pub mod job;
pub mod organization;
pub mod role;
pub mod user;
