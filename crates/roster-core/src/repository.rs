//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async and tenant-scoped: every method
//! takes the `tenant_id` explicitly and must never observe rows owned by
//! another tenant. Writes that must land together go through a
//! [`UnitOfWork`] instead of the repositories.

use uuid::Uuid;

use crate::error::RosterResult;
use crate::models::{
    association::{AssociationDimension, UserOrganization},
    directory::UserSort,
    job::{CreateJob, Job},
    organization::{CreateOrganization, Organization},
    role::{CreateRole, Role},
    user::{NewUserRecord, User, UserRecordChanges},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 10,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

/// Filter, sort and page for the user store's native list query.
#[derive(Debug, Clone, Default)]
pub struct UserQuery {
    /// Lower-cased substring matched against username, email, name,
    /// surname and phone number.
    pub filter: Option<String>,
    pub sort: UserSort,
    pub pagination: Pagination,
}

// ---------------------------------------------------------------------------
// Identity store
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    fn get_by_id(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = RosterResult<User>> + Send;

    /// Case-insensitive lookup; `Ok(None)` when nobody holds the name.
    fn find_by_username(
        &self,
        tenant_id: Uuid,
        username: &str,
    ) -> impl Future<Output = RosterResult<Option<User>>> + Send;

    /// Case-insensitive lookup; `Ok(None)` when nobody holds the address.
    fn find_by_email(
        &self,
        tenant_id: Uuid,
        email: &str,
    ) -> impl Future<Output = RosterResult<Option<User>>> + Send;

    /// Count users matching the (lower-cased) free-text filter.
    fn count(
        &self,
        tenant_id: Uuid,
        filter: Option<&str>,
    ) -> impl Future<Output = RosterResult<u64>> + Send;

    /// Filtered, sorted page of users.
    fn list(
        &self,
        tenant_id: Uuid,
        query: &UserQuery,
    ) -> impl Future<Output = RosterResult<Vec<User>>> + Send;

    /// Users among `ids` whose username contains `username_filter`
    /// (lower-cased) when one is given. Order is unspecified.
    fn list_by_ids(
        &self,
        tenant_id: Uuid,
        ids: &[Uuid],
        username_filter: Option<&str>,
    ) -> impl Future<Output = RosterResult<Vec<User>>> + Send;
}

pub trait RoleRepository: Send + Sync {
    fn create(&self, input: CreateRole) -> impl Future<Output = RosterResult<Role>> + Send;

    /// Roles whose names appear in `names` (exact match).
    fn find_by_names(
        &self,
        tenant_id: Uuid,
        names: &[String],
    ) -> impl Future<Output = RosterResult<Vec<Role>>> + Send;

    /// Names of the roles assigned to a user, sorted.
    fn get_user_role_names(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = RosterResult<Vec<String>>> + Send;
}

// ---------------------------------------------------------------------------
// Association dimensions
// ---------------------------------------------------------------------------

pub trait OrganizationRepository: Send + Sync {
    fn create(
        &self,
        input: CreateOrganization,
    ) -> impl Future<Output = RosterResult<Organization>> + Send;
    fn get_by_id(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = RosterResult<Organization>> + Send;

    /// Organizations whose cascade code starts with `prefix`, ordered by
    /// cascade code.
    fn find_by_cascade_prefix(
        &self,
        tenant_id: Uuid,
        prefix: &str,
    ) -> impl Future<Output = RosterResult<Vec<Organization>>> + Send;

    /// Organizations among `ids`, ordered by cascade code. Unknown ids
    /// are skipped.
    fn get_many(
        &self,
        tenant_id: Uuid,
        ids: &[Uuid],
    ) -> impl Future<Output = RosterResult<Vec<Organization>>> + Send;
}

pub trait JobRepository: Send + Sync {
    fn create(&self, input: CreateJob) -> impl Future<Output = RosterResult<Job>> + Send;
    fn get_by_id(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = RosterResult<Job>> + Send;

    /// Jobs among `ids`. Unknown ids are skipped.
    fn get_many(
        &self,
        tenant_id: Uuid,
        ids: &[Uuid],
    ) -> impl Future<Output = RosterResult<Vec<Job>>> + Send;
}

/// Read side of the user ↔ organization / user ↔ job join rows.
pub trait AssociationRepository: Send + Sync {
    /// Ids the user is linked to in one dimension, sorted.
    fn target_ids(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        dimension: AssociationDimension,
    ) -> impl Future<Output = RosterResult<Vec<Uuid>>> + Send;

    /// Distinct ids of users with a membership in any of
    /// `organization_ids`, sorted ascending.
    fn member_user_ids(
        &self,
        tenant_id: Uuid,
        organization_ids: &[Uuid],
    ) -> impl Future<Output = RosterResult<Vec<Uuid>>> + Send;

    /// Every organization membership held by any of `user_ids`.
    fn organization_memberships(
        &self,
        tenant_id: Uuid,
        user_ids: &[Uuid],
    ) -> impl Future<Output = RosterResult<Vec<UserOrganization>>> + Send;
}

// ---------------------------------------------------------------------------
// Unit of work
// ---------------------------------------------------------------------------

/// Staged writes that become visible together on [`UnitOfWork::commit`].
///
/// Staging never touches storage; statements run in staging order inside
/// one transaction. Dropping an uncommitted unit of work discards it.
pub trait UnitOfWork: Send {
    fn insert_user(&mut self, user: &NewUserRecord);

    /// Overwrite a user row. The commit fails with a concurrency conflict
    /// if the stored stamp no longer equals `expected_stamp`.
    fn update_user(
        &mut self,
        tenant_id: Uuid,
        user_id: Uuid,
        expected_stamp: &str,
        changes: &UserRecordChanges,
    );

    /// Replace the user's role assignments with `role_ids`.
    fn replace_user_roles(&mut self, tenant_id: Uuid, user_id: Uuid, role_ids: &[Uuid]);

    /// Remove every association row of the user in `dimension`.
    fn delete_associations(
        &mut self,
        tenant_id: Uuid,
        user_id: Uuid,
        dimension: AssociationDimension,
    );

    fn insert_association(
        &mut self,
        tenant_id: Uuid,
        user_id: Uuid,
        dimension: AssociationDimension,
        target_id: Uuid,
    );

    /// Number of statements staged so far.
    fn staged(&self) -> usize;

    fn commit(self) -> impl Future<Output = RosterResult<()>> + Send;
}

/// Everything the directory service needs from storage, bundled.
pub trait DirectoryStore: Send + Sync {
    type Users: UserRepository;
    type Roles: RoleRepository;
    type Organizations: OrganizationRepository;
    type Jobs: JobRepository;
    type Associations: AssociationRepository;
    type Work: UnitOfWork;

    fn users(&self) -> &Self::Users;
    fn roles(&self) -> &Self::Roles;
    fn organizations(&self) -> &Self::Organizations;
    fn jobs(&self) -> &Self::Jobs;
    fn associations(&self) -> &Self::Associations;

    /// Start an empty unit of work.
    fn begin(&self) -> Self::Work;
}
