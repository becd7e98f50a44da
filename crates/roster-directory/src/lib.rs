//! Roster Directory — user directory operations over a [`DirectoryStore`].
//!
//! - [`UserDirectoryService`]: get, create, update and list users
//! - [`PaginatedDirectoryQuery`]: the organization-aware list algorithm
//! - [`AssociationSyncer`]: replace-all staging of user associations
//! - [`OrganizationHierarchyIndex`]: subtree resolution by cascade code
//!
//! [`DirectoryStore`]: roster_core::repository::DirectoryStore

pub mod config;
pub mod context;
pub mod hierarchy;
pub mod query;
pub mod service;
pub mod sync;

pub use config::DirectoryConfig;
pub use context::{RequestContext, permissions};
pub use hierarchy::OrganizationHierarchyIndex;
pub use query::PaginatedDirectoryQuery;
pub use service::UserDirectoryService;
pub use sync::AssociationSyncer;
