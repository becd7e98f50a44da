//! User association rows.
//!
//! A user's memberships in one dimension are only ever replaced as a
//! whole; there is no incremental add/remove.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The two association dimensions a user can be linked through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssociationDimension {
    Organization,
    Job,
}

impl fmt::Display for AssociationDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Organization => f.write_str("organization"),
            Self::Job => f.write_str("job"),
        }
    }
}

/// One (tenant, user, organization) membership row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserOrganization {
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub organization_id: Uuid,
}

