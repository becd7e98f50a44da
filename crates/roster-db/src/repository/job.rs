//! SurrealDB implementation of [`JobRepository`].

use chrono::{DateTime, Utc};
use roster_core::error::RosterResult;
use roster_core::models::job::{CreateJob, Job};
use roster_core::repository::JobRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{parse_uuid, uuid_strings};
use crate::error::DbError;

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct JobRowWithId {
    record_id: String,
    tenant_id: String,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl JobRowWithId {
    fn try_into_job(self) -> Result<Job, DbError> {
        Ok(Job {
            id: parse_uuid(&self.record_id, "job")?,
            tenant_id: parse_uuid(&self.tenant_id, "tenant")?,
            name: self.name,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Job repository.
#[derive(Clone)]
pub struct SurrealJobRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealJobRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> JobRepository for SurrealJobRepository<C> {
    async fn create(&self, input: CreateJob) -> RosterResult<Job> {
        let id = Uuid::new_v4();

        let result = self
            .db
            .query(
                "CREATE type::record('job', $id) SET \
                 tenant_id = $tenant_id, name = $name",
            )
            .bind(("id", id.to_string()))
            .bind(("tenant_id", input.tenant_id.to_string()))
            .bind(("name", input.name))
            .await
            .map_err(DbError::from)?;

        result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        self.get_by_id(input.tenant_id, id).await
    }

    async fn get_by_id(&self, tenant_id: Uuid, id: Uuid) -> RosterResult<Job> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM type::record('job', $id) \
                 WHERE tenant_id = $tenant_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<JobRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "job".into(),
            id: id_str,
        })?;

        Ok(row.try_into_job()?)
    }

    async fn get_many(&self, tenant_id: Uuid, ids: &[Uuid]) -> RosterResult<Vec<Job>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM job \
                 WHERE tenant_id = $tenant_id AND meta::id(id) IN $ids",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("ids", uuid_strings(ids)))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<JobRowWithId> = result.take(0).map_err(DbError::from)?;
        let jobs = rows
            .into_iter()
            .map(JobRowWithId::try_into_job)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(jobs)
    }
}
