//! SurrealDB implementation of [`OrganizationRepository`].
//!
//! Subtree lookups are prefix scans over `cascade_id`; see
//! [`roster_core::hierarchy`] for the code format.

use chrono::{DateTime, Utc};
use roster_core::error::{RosterError, RosterResult};
use roster_core::hierarchy;
use roster_core::models::organization::{CreateOrganization, Organization};
use roster_core::repository::OrganizationRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;
use uuid::Uuid;

use super::{parse_uuid, uuid_strings};
use crate::error::DbError;

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct OrganizationRowWithId {
    record_id: String,
    tenant_id: String,
    name: String,
    parent_id: Option<String>,
    cascade_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrganizationRowWithId {
    fn try_into_organization(self) -> Result<Organization, DbError> {
        let parent_id = self
            .parent_id
            .as_deref()
            .map(|p| parse_uuid(p, "parent organization"))
            .transpose()?;
        Ok(Organization {
            id: parse_uuid(&self.record_id, "organization")?,
            tenant_id: parse_uuid(&self.tenant_id, "tenant")?,
            name: self.name,
            parent_id,
            cascade_id: self.cascade_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn collect_organizations(rows: Vec<OrganizationRowWithId>) -> Result<Vec<Organization>, DbError> {
    rows.into_iter()
        .map(OrganizationRowWithId::try_into_organization)
        .collect()
}

/// SurrealDB implementation of the Organization repository.
#[derive(Clone)]
pub struct SurrealOrganizationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealOrganizationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn cascade_codes_under(&self, tenant_id: Uuid, prefix: &str) -> RosterResult<Vec<String>> {
        let mut result = self
            .db
            .query(
                "SELECT VALUE cascade_id FROM organization \
                 WHERE tenant_id = $tenant_id \
                 AND string::starts_with(cascade_id, $prefix)",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("prefix", prefix.to_string()))
            .await
            .map_err(DbError::from)?;

        let codes: Vec<String> = result.take(0).map_err(DbError::from)?;
        Ok(codes)
    }

    /// Resolve the cascade code a new organization will carry.
    ///
    /// Explicit codes are stored terminated and must sit directly under
    /// the parent's code (or under no code for a root) without covering
    /// any existing organization.
    async fn assign_cascade_code(&self, input: &CreateOrganization) -> RosterResult<String> {
        let parent_code = match input.parent_id {
            Some(parent_id) => Some(self.get_by_id(input.tenant_id, parent_id).await?.cascade_id),
            None => None,
        };

        let Some(requested) = &input.cascade_id else {
            let parent_code = parent_code.unwrap_or_default();
            let existing = self.cascade_codes_under(input.tenant_id, &parent_code).await?;
            return Ok(hierarchy::next_child_code(
                &parent_code,
                existing.iter().map(String::as_str),
            ));
        };

        let requested = requested.trim();
        if requested.is_empty() {
            return Err(RosterError::invalid(
                "cascade_id",
                "required",
                "Cascade code must not be empty",
            ));
        }
        let code = hierarchy::terminated(requested);
        let existing = self.cascade_codes_under(input.tenant_id, "").await?;

        if existing.iter().any(|c| hierarchy::terminated(c) == code) {
            return Err(RosterError::invalid(
                "cascade_id",
                "duplicate",
                format!("Cascade code '{code}' is already in use"),
            ));
        }
        if let Some(inner) = existing.iter().find(|c| hierarchy::covers(&code, c)) {
            return Err(RosterError::invalid(
                "cascade_id",
                "covers_existing",
                format!("Cascade code '{code}' would contain existing code '{inner}'"),
            ));
        }

        let ancestor = hierarchy::nearest_ancestor(&code, existing.iter().map(String::as_str));
        match (parent_code.as_deref(), ancestor) {
            (Some(parent), Some(found)) if parent == found => Ok(code),
            (None, None) => Ok(code),
            (Some(parent), _) => Err(RosterError::invalid(
                "cascade_id",
                "outside_parent",
                format!("Cascade code '{code}' is not a direct child of parent code '{parent}'"),
            )),
            (None, Some(found)) => Err(RosterError::invalid(
                "cascade_id",
                "outside_parent",
                format!("Root cascade code '{code}' falls under existing code '{found}'"),
            )),
        }
    }
}

impl<C: Connection> OrganizationRepository for SurrealOrganizationRepository<C> {
    async fn create(&self, input: CreateOrganization) -> RosterResult<Organization> {
        let cascade_id = self.assign_cascade_code(&input).await?;
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('organization', $id) SET \
                 tenant_id = $tenant_id, name = $name, \
                 parent_id = $parent_id, cascade_id = $cascade_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", input.tenant_id.to_string()))
            .bind(("name", input.name))
            .bind(("parent_id", input.parent_id.map(|p| p.to_string())))
            .bind(("cascade_id", cascade_id.clone()))
            .await
            .map_err(DbError::from)?;

        result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        info!(
            tenant_id = %input.tenant_id,
            organization_id = %id,
            cascade_id = %cascade_id,
            "Organization created"
        );

        self.get_by_id(input.tenant_id, id).await
    }

    async fn get_by_id(&self, tenant_id: Uuid, id: Uuid) -> RosterResult<Organization> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM type::record('organization', $id) \
                 WHERE tenant_id = $tenant_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrganizationRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "organization".into(),
            id: id_str,
        })?;

        Ok(row.try_into_organization()?)
    }

    async fn find_by_cascade_prefix(
        &self,
        tenant_id: Uuid,
        prefix: &str,
    ) -> RosterResult<Vec<Organization>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM organization \
                 WHERE tenant_id = $tenant_id \
                 AND string::starts_with(cascade_id, $prefix) \
                 ORDER BY cascade_id ASC",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("prefix", prefix.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrganizationRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(collect_organizations(rows)?)
    }

    async fn get_many(&self, tenant_id: Uuid, ids: &[Uuid]) -> RosterResult<Vec<Organization>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM organization \
                 WHERE tenant_id = $tenant_id AND meta::id(id) IN $ids \
                 ORDER BY cascade_id ASC",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("ids", uuid_strings(ids)))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrganizationRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(collect_organizations(rows)?)
    }
}
