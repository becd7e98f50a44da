//! The SurrealDB-backed [`DirectoryStore`].

use roster_core::repository::DirectoryStore;
use surrealdb::{Connection, Surreal};

use crate::repository::{
    SurrealAssociationRepository, SurrealJobRepository, SurrealOrganizationRepository,
    SurrealRoleRepository, SurrealUserRepository,
};
use crate::unit_of_work::SurrealUnitOfWork;

/// Every repository of the directory over one shared client.
#[derive(Clone)]
pub struct SurrealDirectoryStore<C: Connection> {
    db: Surreal<C>,
    users: SurrealUserRepository<C>,
    roles: SurrealRoleRepository<C>,
    organizations: SurrealOrganizationRepository<C>,
    jobs: SurrealJobRepository<C>,
    associations: SurrealAssociationRepository<C>,
}

impl<C: Connection> SurrealDirectoryStore<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self {
            users: SurrealUserRepository::new(db.clone()),
            roles: SurrealRoleRepository::new(db.clone()),
            organizations: SurrealOrganizationRepository::new(db.clone()),
            jobs: SurrealJobRepository::new(db.clone()),
            associations: SurrealAssociationRepository::new(db.clone()),
            db,
        }
    }
}

impl<C: Connection> DirectoryStore for SurrealDirectoryStore<C> {
    type Users = SurrealUserRepository<C>;
    type Roles = SurrealRoleRepository<C>;
    type Organizations = SurrealOrganizationRepository<C>;
    type Jobs = SurrealJobRepository<C>;
    type Associations = SurrealAssociationRepository<C>;
    type Work = SurrealUnitOfWork<C>;

    fn users(&self) -> &Self::Users {
        &self.users
    }

    fn roles(&self) -> &Self::Roles {
        &self.roles
    }

    fn organizations(&self) -> &Self::Organizations {
        &self.organizations
    }

    fn jobs(&self) -> &Self::Jobs {
        &self.jobs
    }

    fn associations(&self) -> &Self::Associations {
        &self.associations
    }

    fn begin(&self) -> Self::Work {
        SurrealUnitOfWork::new(self.db.clone())
    }
}
