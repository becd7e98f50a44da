//! The paginated user list.
//!
//! Two branches. Without an organization filter the user store counts,
//! filters, sorts and pages natively. With one, the candidate set is the
//! distinct members of the organization's subtree, paged by user id; the
//! text filter then narrows the page by username only and is not
//! reflected in the total, so `total` and `items.len()` can disagree.

use std::collections::HashMap;

use roster_core::error::RosterResult;
use roster_core::models::directory::{ListUsersInput, UserSummary};
use roster_core::models::user::User;
use roster_core::repository::{
    AssociationRepository, DirectoryStore, OrganizationRepository, PaginatedResult, Pagination,
    UserQuery, UserRepository,
};
use tracing::debug;
use uuid::Uuid;

use crate::hierarchy::OrganizationHierarchyIndex;

pub struct PaginatedDirectoryQuery<'a, S: DirectoryStore> {
    store: &'a S,
    max_page_size: u64,
}

impl<'a, S: DirectoryStore> PaginatedDirectoryQuery<'a, S> {
    pub fn new(store: &'a S, max_page_size: u64) -> Self {
        Self {
            store,
            max_page_size,
        }
    }

    pub async fn run(
        &self,
        tenant_id: Uuid,
        input: &ListUsersInput,
    ) -> RosterResult<PaginatedResult<UserSummary>> {
        let pagination = Pagination {
            offset: input.skip,
            limit: input.take.min(self.max_page_size),
        };
        let filter = input.normalized_filter();

        let (total, users) = match input.organization_id {
            None => {
                debug!(%tenant_id, "Listing users without organization filter");
                self.list_all(tenant_id, input, filter, &pagination).await?
            }
            Some(organization_id) => {
                debug!(%tenant_id, %organization_id, "Listing users in organization subtree");
                self.list_in_subtree(tenant_id, organization_id, filter.as_deref(), &pagination)
                    .await?
            }
        };

        let items = self.attach_organization_names(tenant_id, users).await?;
        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn list_all(
        &self,
        tenant_id: Uuid,
        input: &ListUsersInput,
        filter: Option<String>,
        pagination: &Pagination,
    ) -> RosterResult<(u64, Vec<User>)> {
        let users = self.store.users();
        let total = users.count(tenant_id, filter.as_deref()).await?;
        let query = UserQuery {
            filter,
            sort: input.sort.unwrap_or_default(),
            pagination: pagination.clone(),
        };
        let page = users.list(tenant_id, &query).await?;
        Ok((total, page))
    }

    async fn list_in_subtree(
        &self,
        tenant_id: Uuid,
        organization_id: Uuid,
        filter: Option<&str>,
        pagination: &Pagination,
    ) -> RosterResult<(u64, Vec<User>)> {
        let subtree = OrganizationHierarchyIndex::new(self.store.organizations())
            .subtree_of(tenant_id, organization_id)
            .await?;
        let candidates = self
            .store
            .associations()
            .member_user_ids(tenant_id, &subtree)
            .await?;
        let total = candidates.len() as u64;

        let paged: Vec<Uuid> = candidates
            .into_iter()
            .skip(usize::try_from(pagination.offset).unwrap_or(usize::MAX))
            .take(usize::try_from(pagination.limit).unwrap_or(usize::MAX))
            .collect();
        if paged.is_empty() {
            return Ok((total, Vec::new()));
        }

        let fetched = self
            .store
            .users()
            .list_by_ids(tenant_id, &paged, filter)
            .await?;
        let mut by_id: HashMap<Uuid, User> = fetched.into_iter().map(|u| (u.id, u)).collect();
        let users = paged.iter().filter_map(|id| by_id.remove(id)).collect();
        Ok((total, users))
    }

    /// Attach each user's organization names, ordered by cascade code and
    /// joined with `", "`. Two batched lookups per page.
    async fn attach_organization_names(
        &self,
        tenant_id: Uuid,
        users: Vec<User>,
    ) -> RosterResult<Vec<UserSummary>> {
        if users.is_empty() {
            return Ok(Vec::new());
        }

        let user_ids: Vec<Uuid> = users.iter().map(|u| u.id).collect();
        let memberships = self
            .store
            .associations()
            .organization_memberships(tenant_id, &user_ids)
            .await?;

        let mut organization_ids: Vec<Uuid> =
            memberships.iter().map(|m| m.organization_id).collect();
        organization_ids.sort();
        organization_ids.dedup();
        // Ordered by cascade code.
        let organizations = self
            .store
            .organizations()
            .get_many(tenant_id, &organization_ids)
            .await?;

        let mut names_by_user: HashMap<Uuid, Vec<&str>> = HashMap::new();
        for organization in &organizations {
            for membership in memberships
                .iter()
                .filter(|m| m.organization_id == organization.id)
            {
                names_by_user
                    .entry(membership.user_id)
                    .or_default()
                    .push(organization.name.as_str());
            }
        }

        Ok(users
            .into_iter()
            .map(|user| {
                let names = names_by_user
                    .get(&user.id)
                    .map(|names| names.join(", "))
                    .unwrap_or_default();
                UserSummary::new(user, names)
            })
            .collect())
    }
}
