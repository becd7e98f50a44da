//! Integration tests for transactional writes through
//! `SurrealUnitOfWork` using in-memory SurrealDB.

use roster_core::error::RosterError;
use roster_core::models::association::AssociationDimension;
use roster_core::models::job::CreateJob;
use roster_core::models::organization::CreateOrganization;
use roster_core::models::role::CreateRole;
use roster_core::models::user::{NewUserRecord, UserRecordChanges, new_concurrency_stamp};
use roster_core::repository::{
    AssociationRepository, DirectoryStore, JobRepository, OrganizationRepository,
    RoleRepository, UnitOfWork, UserRepository,
};
use roster_db::SurrealDirectoryStore;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

/// Helper: spin up in-memory DB, run migrations, wrap it in a store.
async fn setup() -> SurrealDirectoryStore<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    roster_db::run_migrations(&db).await.unwrap();
    SurrealDirectoryStore::new(db)
}

fn record(tenant_id: Uuid, username: &str) -> NewUserRecord {
    NewUserRecord {
        id: Uuid::new_v4(),
        tenant_id,
        username: username.into(),
        email: format!("{username}@example.com"),
        name: "Test".into(),
        surname: "User".into(),
        phone_number: None,
        lockout_enabled: false,
        password_hash: "$argon2id$placeholder".into(),
        concurrency_stamp: new_concurrency_stamp(),
        extra_properties: serde_json::json!({"team": "core"}),
    }
}

fn changes_from(record: &NewUserRecord) -> UserRecordChanges {
    UserRecordChanges {
        username: record.username.clone(),
        email: record.email.clone(),
        name: record.name.clone(),
        surname: record.surname.clone(),
        phone_number: record.phone_number.clone(),
        lockout_enabled: record.lockout_enabled,
        password_hash: None,
        concurrency_stamp: new_concurrency_stamp(),
        extra_properties: record.extra_properties.clone(),
    }
}

async fn org(store: &SurrealDirectoryStore<Db>, tenant_id: Uuid, name: &str) -> Uuid {
    store
        .organizations()
        .create(CreateOrganization {
            tenant_id,
            name: name.into(),
            parent_id: None,
            cascade_id: None,
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn insert_user_with_associations_commits_together() {
    let store = setup().await;
    let tenant = Uuid::new_v4();
    let org_id = org(&store, tenant, "Root").await;
    let job_id = store
        .jobs()
        .create(CreateJob {
            tenant_id: tenant,
            name: "Engineer".into(),
        })
        .await
        .unwrap()
        .id;

    let user = record(tenant, "alice");
    let mut work = store.begin();
    work.insert_user(&user);
    work.insert_association(tenant, user.id, AssociationDimension::Organization, org_id);
    work.insert_association(tenant, user.id, AssociationDimension::Job, job_id);
    assert_eq!(work.staged(), 3);
    work.commit().await.unwrap();

    let stored = store.users().get_by_id(tenant, user.id).await.unwrap();
    assert_eq!(stored.username, "alice");
    assert_eq!(stored.phone_number, None);
    assert_eq!(stored.extra_properties["team"], "core");
    assert_eq!(stored.concurrency_stamp, user.concurrency_stamp);

    let orgs = store
        .associations()
        .target_ids(tenant, user.id, AssociationDimension::Organization)
        .await
        .unwrap();
    assert_eq!(orgs, vec![org_id]);
    let jobs = store
        .associations()
        .target_ids(tenant, user.id, AssociationDimension::Job)
        .await
        .unwrap();
    assert_eq!(jobs, vec![job_id]);
}

#[tokio::test]
async fn failed_statement_rolls_back_the_whole_unit() {
    let store = setup().await;
    let tenant = Uuid::new_v4();
    let org_id = org(&store, tenant, "Root").await;

    let user = record(tenant, "bob");
    let mut work = store.begin();
    work.insert_user(&user);
    work.insert_association(tenant, user.id, AssociationDimension::Organization, org_id);
    // Violates the unique membership index.
    work.insert_association(tenant, user.id, AssociationDimension::Organization, org_id);

    let err = work.commit().await.unwrap_err();
    assert!(matches!(err, RosterError::Database(_)));

    let err = store.users().get_by_id(tenant, user.id).await.unwrap_err();
    assert!(matches!(err, RosterError::NotFound { .. }));
    let orgs = store
        .associations()
        .target_ids(tenant, user.id, AssociationDimension::Organization)
        .await
        .unwrap();
    assert!(orgs.is_empty());
}

#[tokio::test]
async fn update_with_stale_stamp_is_a_conflict() {
    let store = setup().await;
    let tenant = Uuid::new_v4();

    let user = record(tenant, "carol");
    let mut work = store.begin();
    work.insert_user(&user);
    work.commit().await.unwrap();

    let mut changes = changes_from(&user);
    changes.name = "Caroline".into();
    let mut work = store.begin();
    work.update_user(tenant, user.id, "not-the-stamp", &changes);
    let err = work.commit().await.unwrap_err();
    assert!(matches!(err, RosterError::ConcurrencyConflict { .. }));

    let stored = store.users().get_by_id(tenant, user.id).await.unwrap();
    assert_eq!(stored.name, "Test");
    assert_eq!(stored.concurrency_stamp, user.concurrency_stamp);
}

#[tokio::test]
async fn update_with_current_stamp_rotates_it() {
    let store = setup().await;
    let tenant = Uuid::new_v4();

    let user = record(tenant, "dave");
    let mut work = store.begin();
    work.insert_user(&user);
    work.commit().await.unwrap();

    let mut changes = changes_from(&user);
    changes.phone_number = Some("+1 555 0100".into());
    changes.password_hash = Some("$argon2id$rotated".into());
    let mut work = store.begin();
    work.update_user(tenant, user.id, &user.concurrency_stamp, &changes);
    work.commit().await.unwrap();

    let stored = store.users().get_by_id(tenant, user.id).await.unwrap();
    assert_eq!(stored.phone_number.as_deref(), Some("+1 555 0100"));
    assert_eq!(stored.password_hash, "$argon2id$rotated");
    assert_eq!(stored.concurrency_stamp, changes.concurrency_stamp);
    assert_ne!(stored.concurrency_stamp, user.concurrency_stamp);
}

#[tokio::test]
async fn update_cannot_reach_another_tenant() {
    let store = setup().await;
    let tenant = Uuid::new_v4();

    let user = record(tenant, "erin");
    let mut work = store.begin();
    work.insert_user(&user);
    work.commit().await.unwrap();

    let mut changes = changes_from(&user);
    changes.name = "Hijacked".into();
    let mut work = store.begin();
    work.update_user(Uuid::new_v4(), user.id, &user.concurrency_stamp, &changes);
    let err = work.commit().await.unwrap_err();
    assert!(matches!(err, RosterError::ConcurrencyConflict { .. }));

    let stored = store.users().get_by_id(tenant, user.id).await.unwrap();
    assert_eq!(stored.name, "Test");
}

#[tokio::test]
async fn replace_user_roles_rewrites_edges() {
    let store = setup().await;
    let tenant = Uuid::new_v4();

    let mut role_ids = Vec::new();
    for name in ["admin", "auditor", "viewer"] {
        let role = store
            .roles()
            .create(CreateRole {
                tenant_id: tenant,
                name: name.into(),
                description: String::new(),
            })
            .await
            .unwrap();
        role_ids.push(role.id);
    }

    let user = record(tenant, "frank");
    let mut work = store.begin();
    work.insert_user(&user);
    work.replace_user_roles(tenant, user.id, &role_ids[..2]);
    work.commit().await.unwrap();

    let names = store.roles().get_user_role_names(tenant, user.id).await.unwrap();
    assert_eq!(names, vec!["admin", "auditor"]);

    let mut work = store.begin();
    work.replace_user_roles(tenant, user.id, &role_ids[2..]);
    work.commit().await.unwrap();

    let names = store.roles().get_user_role_names(tenant, user.id).await.unwrap();
    assert_eq!(names, vec!["viewer"]);

    let found = store
        .roles()
        .find_by_names(tenant, &["viewer".to_string(), "ghost".to_string()])
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
}

#[tokio::test]
async fn delete_associations_only_touches_one_dimension() {
    let store = setup().await;
    let tenant = Uuid::new_v4();
    let org_id = org(&store, tenant, "Root").await;
    let job_id = Uuid::new_v4();

    let user = record(tenant, "grace");
    let mut work = store.begin();
    work.insert_user(&user);
    work.insert_association(tenant, user.id, AssociationDimension::Organization, org_id);
    work.insert_association(tenant, user.id, AssociationDimension::Job, job_id);
    work.commit().await.unwrap();

    let mut work = store.begin();
    work.delete_associations(tenant, user.id, AssociationDimension::Job);
    work.commit().await.unwrap();

    let assoc = store.associations();
    assert!(
        assoc
            .target_ids(tenant, user.id, AssociationDimension::Job)
            .await
            .unwrap()
            .is_empty()
    );
    assert_eq!(
        assoc
            .target_ids(tenant, user.id, AssociationDimension::Organization)
            .await
            .unwrap(),
        vec![org_id]
    );
}
