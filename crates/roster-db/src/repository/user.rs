//! SurrealDB implementation of [`UserRepository`].
//!
//! User rows are only written through [`crate::SurrealUnitOfWork`]; this
//! repository is the read side of the identity store.

use chrono::{DateTime, Utc};
use roster_core::error::RosterResult;
use roster_core::models::directory::{SortDirection, UserSort, UserSortField};
use roster_core::models::user::User;
use roster_core::repository::{UserQuery, UserRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, parse_uuid, uuid_strings};
use crate::error::DbError;

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct UserRowWithId {
    record_id: String,
    tenant_id: String,
    username: String,
    email: String,
    name: String,
    surname: String,
    phone_number: Option<String>,
    lockout_enabled: bool,
    password_hash: String,
    concurrency_stamp: String,
    extra_properties: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRowWithId {
    fn try_into_user(self) -> Result<User, DbError> {
        Ok(User {
            id: parse_uuid(&self.record_id, "user")?,
            tenant_id: parse_uuid(&self.tenant_id, "tenant")?,
            username: self.username,
            email: self.email,
            name: self.name,
            surname: self.surname,
            phone_number: self.phone_number,
            lockout_enabled: self.lockout_enabled,
            password_hash: self.password_hash,
            concurrency_stamp: self.concurrency_stamp,
            extra_properties: self.extra_properties,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Free-text predicate shared by `count` and `list`; binds `$filter`.
const TEXT_FILTER_CLAUSE: &str = " AND (\
     string::contains(string::lowercase(username), $filter) \
     OR string::contains(string::lowercase(email), $filter) \
     OR string::contains(string::lowercase(name), $filter) \
     OR string::contains(string::lowercase(surname), $filter) \
     OR string::contains(string::lowercase(phone_number ?? ''), $filter))";

fn order_clause(sort: &UserSort) -> String {
    let field = match sort.field {
        UserSortField::Username => "username",
        UserSortField::Email => "email",
        UserSortField::Name => "name",
        UserSortField::Surname => "surname",
        UserSortField::CreatedAt => "created_at",
    };
    let direction = match sort.direction {
        SortDirection::Ascending => "ASC",
        SortDirection::Descending => "DESC",
    };
    // record_id breaks ties so pages never overlap.
    format!("{field} {direction}, record_id ASC")
}

fn collect_users(rows: Vec<UserRowWithId>) -> Result<Vec<User>, DbError> {
    rows.into_iter().map(UserRowWithId::try_into_user).collect()
}

/// SurrealDB implementation of the User repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn find_one_by(
        &self,
        tenant_id: Uuid,
        column: &str,
        value: &str,
    ) -> RosterResult<Option<User>> {
        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM user \
             WHERE tenant_id = $tenant_id AND string::lowercase({column}) = $value"
        );

        let mut result = self
            .db
            .query(query)
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("value", value.to_lowercase()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .next()
            .map(UserRowWithId::try_into_user)
            .transpose()?)
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn get_by_id(&self, tenant_id: Uuid, id: Uuid) -> RosterResult<User> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM type::record('user', $id) \
                 WHERE tenant_id = $tenant_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.try_into_user()?)
    }

    async fn find_by_username(&self, tenant_id: Uuid, username: &str) -> RosterResult<Option<User>> {
        self.find_one_by(tenant_id, "username", username).await
    }

    async fn find_by_email(&self, tenant_id: Uuid, email: &str) -> RosterResult<Option<User>> {
        self.find_one_by(tenant_id, "email", email).await
    }

    async fn count(&self, tenant_id: Uuid, filter: Option<&str>) -> RosterResult<u64> {
        let query = format!(
            "SELECT count() AS total FROM user WHERE tenant_id = $tenant_id{} GROUP ALL",
            if filter.is_some() { TEXT_FILTER_CLAUSE } else { "" }
        );

        let mut builder = self
            .db
            .query(query)
            .bind(("tenant_id", tenant_id.to_string()));
        if let Some(filter) = filter {
            builder = builder.bind(("filter", filter.to_lowercase()));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }

    async fn list(&self, tenant_id: Uuid, query: &UserQuery) -> RosterResult<Vec<User>> {
        if query.pagination.limit == 0 {
            return Ok(Vec::new());
        }

        let statement = format!(
            "SELECT meta::id(id) AS record_id, * FROM user \
             WHERE tenant_id = $tenant_id{} \
             ORDER BY {} \
             LIMIT $limit START $offset",
            if query.filter.is_some() {
                TEXT_FILTER_CLAUSE
            } else {
                ""
            },
            order_clause(&query.sort),
        );

        let mut builder = self
            .db
            .query(statement)
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("limit", query.pagination.limit))
            .bind(("offset", query.pagination.offset));
        if let Some(filter) = &query.filter {
            builder = builder.bind(("filter", filter.to_lowercase()));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(collect_users(rows)?)
    }

    async fn list_by_ids(
        &self,
        tenant_id: Uuid,
        ids: &[Uuid],
        username_filter: Option<&str>,
    ) -> RosterResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let statement = format!(
            "SELECT meta::id(id) AS record_id, * FROM user \
             WHERE tenant_id = $tenant_id AND meta::id(id) IN $ids{}",
            if username_filter.is_some() {
                " AND string::contains(string::lowercase(username), $filter)"
            } else {
                ""
            }
        );

        let mut builder = self
            .db
            .query(statement)
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("ids", uuid_strings(ids)));
        if let Some(filter) = username_filter {
            builder = builder.bind(("filter", filter.to_lowercase()));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(collect_users(rows)?)
    }
}
