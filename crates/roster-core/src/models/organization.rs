//! Organization unit model.
//!
//! Organizations form a tree inside a tenant. Each node carries a
//! cascade code (see [`crate::hierarchy`]) so that subtree membership is a
//! string-prefix test.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub parent_id: Option<Uuid>,
    /// Path code; a node's code is a prefix of all its descendants' codes.
    pub cascade_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrganization {
    pub tenant_id: Uuid,
    pub name: String,
    pub parent_id: Option<Uuid>,
    /// Explicit cascade code for imported hierarchies. When `None` the
    /// next free code under `parent_id` is assigned.
    pub cascade_id: Option<String>,
}
