//! User directory service: get, create, update and list.

use roster_core::error::{FieldError, RosterError, RosterResult};
use roster_core::models::association::AssociationDimension;
use roster_core::models::directory::{
    CreateUserInput, ListUsersInput, UpdateUserInput, UserDetail, UserSummary,
};
use roster_core::repository::{
    AssociationRepository, DirectoryStore, JobRepository, OrganizationRepository,
    PaginatedResult, RoleRepository, UnitOfWork, UserRepository,
};
use roster_identity::IdentityManager;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::DirectoryConfig;
use crate::context::{RequestContext, permissions};
use crate::query::PaginatedDirectoryQuery;
use crate::sync::AssociationSyncer;

/// Directory operations over a [`DirectoryStore`].
///
/// Generic over the store so that the service has no dependency on the
/// database crate. Every operation is scoped to the caller's tenant and
/// checks permissions before touching storage.
pub struct UserDirectoryService<S: DirectoryStore> {
    store: S,
    identity: IdentityManager,
    config: DirectoryConfig,
}

impl<S: DirectoryStore> UserDirectoryService<S> {
    pub fn new(store: S, identity: IdentityManager, config: DirectoryConfig) -> Self {
        Self {
            store,
            identity,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> RosterResult<UserDetail> {
        ctx.require(&[permissions::USERS])?;
        self.load_detail(ctx.tenant_id, id).await
    }

    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: CreateUserInput,
    ) -> RosterResult<UserDetail> {
        ctx.require(&[permissions::USERS, permissions::USERS_CREATE])?;
        let tenant_id = ctx.tenant_id;

        let prepared = self
            .identity
            .prepare_create(&self.store, tenant_id, &input)
            .await?;
        self.check_targets(tenant_id, &input.organization_ids, &input.job_ids)
            .await?;

        let user_id = prepared.record.id;
        let mut work = self.store.begin();
        work.insert_user(&prepared.record);
        work.replace_user_roles(tenant_id, user_id, &prepared.role_ids);
        AssociationSyncer::replace_associations(
            &mut work,
            tenant_id,
            user_id,
            AssociationDimension::Organization,
            &input.organization_ids,
        );
        AssociationSyncer::replace_associations(
            &mut work,
            tenant_id,
            user_id,
            AssociationDimension::Job,
            &input.job_ids,
        );
        work.commit().await?;

        info!(
            %tenant_id,
            %user_id,
            username = %prepared.record.username,
            "User created"
        );

        self.load_detail(tenant_id, user_id).await
    }

    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        input: UpdateUserInput,
    ) -> RosterResult<UserDetail> {
        ctx.require(&[permissions::USERS, permissions::USERS_UPDATE])?;
        let tenant_id = ctx.tenant_id;

        let existing = self.store.users().get_by_id(tenant_id, id).await?;
        if existing.concurrency_stamp != input.concurrency_stamp {
            warn!(%tenant_id, user_id = %id, "Rejected update with stale concurrency stamp");
            return Err(RosterError::ConcurrencyConflict {
                entity: "user".into(),
                id: id.to_string(),
            });
        }

        let prepared = self
            .identity
            .prepare_update(&self.store, &existing, &input)
            .await?;
        self.check_targets(tenant_id, &input.organization_ids, &input.job_ids)
            .await?;

        let mut work = self.store.begin();
        work.update_user(tenant_id, id, &input.concurrency_stamp, &prepared.changes);
        if let Some(role_ids) = &prepared.role_ids {
            work.replace_user_roles(tenant_id, id, role_ids);
        }
        AssociationSyncer::replace_associations(
            &mut work,
            tenant_id,
            id,
            AssociationDimension::Organization,
            &input.organization_ids,
        );
        AssociationSyncer::replace_associations(
            &mut work,
            tenant_id,
            id,
            AssociationDimension::Job,
            &input.job_ids,
        );
        work.commit().await?;

        info!(%tenant_id, user_id = %id, "User updated");

        self.load_detail(tenant_id, id).await
    }

    pub async fn list(
        &self,
        ctx: &RequestContext,
        input: ListUsersInput,
    ) -> RosterResult<PaginatedResult<UserSummary>> {
        ctx.require(&[permissions::USERS])?;
        PaginatedDirectoryQuery::new(&self.store, self.config.max_page_size)
            .run(ctx.tenant_id, &input)
            .await
    }

    async fn load_detail(&self, tenant_id: Uuid, id: Uuid) -> RosterResult<UserDetail> {
        let user = self.store.users().get_by_id(tenant_id, id).await?;
        let associations = self.store.associations();
        let job_ids = associations
            .target_ids(tenant_id, id, AssociationDimension::Job)
            .await?;
        let organization_ids = associations
            .target_ids(tenant_id, id, AssociationDimension::Organization)
            .await?;
        let role_names = self.store.roles().get_user_role_names(tenant_id, id).await?;

        Ok(UserDetail::new(user, job_ids, organization_ids, role_names))
    }

    /// Every referenced organization and job must exist in the tenant.
    async fn check_targets(
        &self,
        tenant_id: Uuid,
        organization_ids: &[Uuid],
        job_ids: &[Uuid],
    ) -> RosterResult<()> {
        let mut errors = Vec::new();

        let organizations = self
            .store
            .organizations()
            .get_many(tenant_id, organization_ids)
            .await?;
        for (i, id) in organization_ids.iter().enumerate() {
            if !organizations.iter().any(|o| o.id == *id) {
                errors.push(missing_target("organization_ids", i, "Organization", id));
            }
        }

        let jobs = self.store.jobs().get_many(tenant_id, job_ids).await?;
        for (i, id) in job_ids.iter().enumerate() {
            if !jobs.iter().any(|j| j.id == *id) {
                errors.push(missing_target("job_ids", i, "Job", id));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(RosterError::Validation { errors })
        }
    }
}

fn missing_target(field: &str, index: usize, label: &str, id: &Uuid) -> FieldError {
    FieldError::new(
        format!("{field}[{index}]"),
        "not_found",
        format!("{label} {id} does not exist"),
    )
}
