//! Organization subtree resolution.

use roster_core::error::RosterResult;
use roster_core::hierarchy::covers;
use roster_core::repository::OrganizationRepository;
use uuid::Uuid;

/// Answers subtree-membership questions over a tenant's organization
/// tree.
pub struct OrganizationHierarchyIndex<'a, O: OrganizationRepository> {
    organizations: &'a O,
}

impl<'a, O: OrganizationRepository> OrganizationHierarchyIndex<'a, O> {
    pub fn new(organizations: &'a O) -> Self {
        Self { organizations }
    }

    /// Ids of `organization_id` and all its descendants, in ascending
    /// cascade order. `NotFound` if the organization is not in the tenant.
    pub async fn subtree_of(&self, tenant_id: Uuid, organization_id: Uuid) -> RosterResult<Vec<Uuid>> {
        let root = self
            .organizations
            .get_by_id(tenant_id, organization_id)
            .await?;
        let nodes = self
            .organizations
            .find_by_cascade_prefix(tenant_id, &root.cascade_id)
            .await?;

        Ok(nodes
            .into_iter()
            .filter(|node| covers(&root.cascade_id, &node.cascade_id))
            .map(|node| node.id)
            .collect())
    }
}
