//! Shared fixtures for directory integration tests.

#![allow(dead_code)]

use roster_core::models::directory::{CreateUserInput, UpdateUserInput, UserDetail};
use roster_core::models::job::CreateJob;
use roster_core::models::organization::CreateOrganization;
use roster_core::models::role::CreateRole;
use roster_core::repository::{
    DirectoryStore, JobRepository, OrganizationRepository, RoleRepository,
};
use roster_db::SurrealDirectoryStore;
use roster_directory::{DirectoryConfig, RequestContext, UserDirectoryService, permissions};
use roster_identity::{IdentityConfig, IdentityManager};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

pub type Service = UserDirectoryService<SurrealDirectoryStore<Db>>;

/// Helper: spin up in-memory DB, run migrations, build the service.
pub async fn setup() -> Service {
    setup_with(DirectoryConfig::default()).await
}

pub async fn setup_with(config: DirectoryConfig) -> Service {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    roster_db::run_migrations(&db).await.unwrap();
    UserDirectoryService::new(
        SurrealDirectoryStore::new(db),
        IdentityManager::new(IdentityConfig::default()),
        config,
    )
}

/// A caller holding every directory permission.
pub fn admin(tenant_id: Uuid) -> RequestContext {
    RequestContext::new(
        tenant_id,
        [
            permissions::USERS,
            permissions::USERS_CREATE,
            permissions::USERS_UPDATE,
        ],
    )
}

pub async fn organization(
    service: &Service,
    tenant_id: Uuid,
    name: &str,
    parent_id: Option<Uuid>,
) -> Uuid {
    service
        .store()
        .organizations()
        .create(CreateOrganization {
            tenant_id,
            name: name.into(),
            parent_id,
            cascade_id: None,
        })
        .await
        .unwrap()
        .id
}

pub async fn job(service: &Service, tenant_id: Uuid, name: &str) -> Uuid {
    service
        .store()
        .jobs()
        .create(CreateJob {
            tenant_id,
            name: name.into(),
        })
        .await
        .unwrap()
        .id
}

pub async fn role(service: &Service, tenant_id: Uuid, name: &str) -> Uuid {
    service
        .store()
        .roles()
        .create(CreateRole {
            tenant_id,
            name: name.into(),
            description: String::new(),
        })
        .await
        .unwrap()
        .id
}

pub fn new_user(username: &str) -> CreateUserInput {
    CreateUserInput {
        username: username.into(),
        email: format!("{}@example.com", username.to_lowercase()),
        password: "Passw0rd!".into(),
        name: String::new(),
        surname: String::new(),
        phone_number: None,
        lockout_enabled: false,
        role_names: Vec::new(),
        job_ids: Vec::new(),
        organization_ids: Vec::new(),
        extra_properties: None,
    }
}

/// An update that rewrites `detail` with its current values.
pub fn unchanged(detail: &UserDetail) -> UpdateUserInput {
    UpdateUserInput {
        concurrency_stamp: detail.concurrency_stamp.clone(),
        username: detail.username.clone(),
        email: detail.email.clone(),
        password: None,
        name: detail.name.clone(),
        surname: detail.surname.clone(),
        phone_number: detail.phone_number.clone(),
        lockout_enabled: detail.lockout_enabled,
        role_names: None,
        job_ids: detail.job_ids.clone(),
        organization_ids: detail.organization_ids.clone(),
        extra_properties: None,
    }
}

pub fn sorted(mut ids: Vec<Uuid>) -> Vec<Uuid> {
    ids.sort();
    ids
}
