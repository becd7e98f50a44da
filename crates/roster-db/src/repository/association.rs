//! SurrealDB implementation of [`AssociationRepository`].
//!
//! Join rows live in `user_organization` and `user_job`. Writes go
//! through [`crate::SurrealUnitOfWork`]; this is the read side.

use std::collections::BTreeSet;

use roster_core::error::RosterResult;
use roster_core::models::association::{AssociationDimension, UserOrganization};
use roster_core::repository::AssociationRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{parse_uuid, uuid_strings};
use crate::error::DbError;

/// Table holding the join rows of a dimension.
pub(crate) fn table(dimension: AssociationDimension) -> &'static str {
    match dimension {
        AssociationDimension::Organization => "user_organization",
        AssociationDimension::Job => "user_job",
    }
}

/// Column holding the linked id in [`table`].
pub(crate) fn target_column(dimension: AssociationDimension) -> &'static str {
    match dimension {
        AssociationDimension::Organization => "organization_id",
        AssociationDimension::Job => "job_id",
    }
}

#[derive(Debug, SurrealValue)]
struct MembershipRow {
    user_id: String,
    organization_id: String,
}

/// SurrealDB implementation of the association read side.
#[derive(Clone)]
pub struct SurrealAssociationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAssociationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> AssociationRepository for SurrealAssociationRepository<C> {
    async fn target_ids(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        dimension: AssociationDimension,
    ) -> RosterResult<Vec<Uuid>> {
        let query = format!(
            "SELECT VALUE {} FROM {} \
             WHERE tenant_id = $tenant_id AND user_id = $user_id",
            target_column(dimension),
            table(dimension),
        );

        let mut result = self
            .db
            .query(query)
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let raw: Vec<String> = result.take(0).map_err(DbError::from)?;
        let mut ids = raw
            .iter()
            .map(|id| parse_uuid(id, "association target"))
            .collect::<Result<Vec<_>, DbError>>()?;
        ids.sort();
        Ok(ids)
    }

    async fn member_user_ids(
        &self,
        tenant_id: Uuid,
        organization_ids: &[Uuid],
    ) -> RosterResult<Vec<Uuid>> {
        if organization_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut result = self
            .db
            .query(
                "SELECT VALUE user_id FROM user_organization \
                 WHERE tenant_id = $tenant_id \
                 AND organization_id IN $organization_ids",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("organization_ids", uuid_strings(organization_ids)))
            .await
            .map_err(DbError::from)?;

        let raw: Vec<String> = result.take(0).map_err(DbError::from)?;
        let distinct = raw
            .iter()
            .map(|id| parse_uuid(id, "user"))
            .collect::<Result<BTreeSet<_>, DbError>>()?;
        Ok(distinct.into_iter().collect())
    }

    async fn organization_memberships(
        &self,
        tenant_id: Uuid,
        user_ids: &[Uuid],
    ) -> RosterResult<Vec<UserOrganization>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut result = self
            .db
            .query(
                "SELECT user_id, organization_id FROM user_organization \
                 WHERE tenant_id = $tenant_id AND user_id IN $user_ids",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("user_ids", uuid_strings(user_ids)))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MembershipRow> = result.take(0).map_err(DbError::from)?;
        let memberships = rows
            .into_iter()
            .map(|row| {
                Ok(UserOrganization {
                    tenant_id,
                    user_id: parse_uuid(&row.user_id, "user")?,
                    organization_id: parse_uuid(&row.organization_id, "organization")?,
                })
            })
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(memberships)
    }
}
