//! Transactional unit of work.
//!
//! Staged statements are concatenated into a single SurrealQL script
//! wrapped in `BEGIN TRANSACTION` / `COMMIT TRANSACTION`, so either every
//! staged write lands or none does. Values are always bound as
//! parameters (`$p0`, `$p1`, ...); only table and column names, which
//! come from fixed tables in this crate, are formatted into the script.

use roster_core::error::RosterResult;
use roster_core::models::association::AssociationDimension;
use roster_core::models::user::{NewUserRecord, UserRecordChanges};
use roster_core::repository::UnitOfWork;
use surrealdb::{Connection, Surreal};
use tracing::debug;
use uuid::Uuid;

use crate::error::{CONCURRENCY_CONFLICT_MARKER, DbError};
use crate::repository::association::{table, target_column};

/// A SurrealDB transaction under construction.
pub struct SurrealUnitOfWork<C: Connection> {
    db: Surreal<C>,
    statements: Vec<String>,
    bindings: Vec<(String, serde_json::Value)>,
    /// Set when a staged update carries a concurrency guard.
    guarded_user: Option<Uuid>,
}

impl<C: Connection> SurrealUnitOfWork<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self {
            db,
            statements: Vec::new(),
            bindings: Vec::new(),
            guarded_user: None,
        }
    }

    /// Register a bound value and return its `$name`.
    fn param(&mut self, value: impl Into<serde_json::Value>) -> String {
        let name = format!("p{}", self.bindings.len());
        self.bindings.push((name.clone(), value.into()));
        format!("${name}")
    }

    /// A bound value, or the literal `NONE` for an absent optional field.
    fn optional_param(&mut self, value: Option<&str>) -> String {
        match value {
            Some(v) => self.param(v),
            None => "NONE".to_string(),
        }
    }

    /// The full transaction script for the staged statements.
    fn script(&self) -> String {
        let mut script = String::from("BEGIN TRANSACTION;\n");
        for statement in &self.statements {
            script.push_str(statement);
            script.push_str(";\n");
        }
        script.push_str("COMMIT TRANSACTION;");
        script
    }
}

impl<C: Connection> UnitOfWork for SurrealUnitOfWork<C> {
    fn insert_user(&mut self, user: &NewUserRecord) {
        let id = self.param(user.id.to_string());
        let tenant_id = self.param(user.tenant_id.to_string());
        let username = self.param(user.username.as_str());
        let email = self.param(user.email.as_str());
        let name = self.param(user.name.as_str());
        let surname = self.param(user.surname.as_str());
        let phone_number = self.optional_param(user.phone_number.as_deref());
        let lockout_enabled = self.param(user.lockout_enabled);
        let password_hash = self.param(user.password_hash.as_str());
        let stamp = self.param(user.concurrency_stamp.as_str());
        let extra_properties = self.param(user.extra_properties.clone());

        self.statements.push(format!(
            "CREATE type::record('user', {id}) SET \
             tenant_id = {tenant_id}, username = {username}, email = {email}, \
             name = {name}, surname = {surname}, phone_number = {phone_number}, \
             lockout_enabled = {lockout_enabled}, password_hash = {password_hash}, \
             concurrency_stamp = {stamp}, extra_properties = {extra_properties}"
        ));
    }

    fn update_user(
        &mut self,
        tenant_id: Uuid,
        user_id: Uuid,
        expected_stamp: &str,
        changes: &UserRecordChanges,
    ) {
        let id = self.param(user_id.to_string());
        let tenant = self.param(tenant_id.to_string());
        let expected = self.param(expected_stamp);

        // Re-checked inside the transaction so a concurrent writer that
        // committed after the caller's read still aborts this one.
        self.statements.push(format!(
            "IF array::first((SELECT VALUE concurrency_stamp FROM type::record('user', {id}) \
             WHERE tenant_id = {tenant})) != {expected} \
             {{ THROW \"{CONCURRENCY_CONFLICT_MARKER}\" }}"
        ));
        self.guarded_user = Some(user_id);

        let mut sets = vec![
            format!("username = {}", self.param(changes.username.as_str())),
            format!("email = {}", self.param(changes.email.as_str())),
            format!("name = {}", self.param(changes.name.as_str())),
            format!("surname = {}", self.param(changes.surname.as_str())),
            format!(
                "phone_number = {}",
                self.optional_param(changes.phone_number.as_deref())
            ),
            format!("lockout_enabled = {}", self.param(changes.lockout_enabled)),
            format!(
                "concurrency_stamp = {}",
                self.param(changes.concurrency_stamp.as_str())
            ),
            format!(
                "extra_properties = {}",
                self.param(changes.extra_properties.clone())
            ),
        ];
        if let Some(hash) = &changes.password_hash {
            sets.push(format!("password_hash = {}", self.param(hash.as_str())));
        }
        sets.push("updated_at = time::now()".to_string());

        self.statements.push(format!(
            "UPDATE type::record('user', {id}) SET {} WHERE tenant_id = {tenant}",
            sets.join(", ")
        ));
    }

    fn replace_user_roles(&mut self, _tenant_id: Uuid, user_id: Uuid, role_ids: &[Uuid]) {
        let user = self.param(user_id.to_string());
        self.statements.push(format!(
            "DELETE has_role WHERE in = type::record('user', {user})"
        ));
        // Uuid formatting cannot carry SurrealQL syntax.
        for role_id in role_ids {
            self.statements.push(format!(
                "RELATE user:`{user_id}` -> has_role -> role:`{role_id}`"
            ));
        }
    }

    fn delete_associations(
        &mut self,
        tenant_id: Uuid,
        user_id: Uuid,
        dimension: AssociationDimension,
    ) {
        let tenant = self.param(tenant_id.to_string());
        let user = self.param(user_id.to_string());
        self.statements.push(format!(
            "DELETE {} WHERE tenant_id = {tenant} AND user_id = {user}",
            table(dimension)
        ));
    }

    fn insert_association(
        &mut self,
        tenant_id: Uuid,
        user_id: Uuid,
        dimension: AssociationDimension,
        target_id: Uuid,
    ) {
        let tenant = self.param(tenant_id.to_string());
        let user = self.param(user_id.to_string());
        let target = self.param(target_id.to_string());
        self.statements.push(format!(
            "CREATE {} SET tenant_id = {tenant}, user_id = {user}, {} = {target}",
            table(dimension),
            target_column(dimension),
        ));
    }

    fn staged(&self) -> usize {
        self.statements.len()
    }

    async fn commit(self) -> RosterResult<()> {
        if self.statements.is_empty() {
            return Ok(());
        }

        let script = self.script();
        debug!(statements = self.statements.len(), "Committing unit of work");

        let Self {
            db,
            bindings,
            guarded_user,
            ..
        } = self;

        let mut query = db.query(script);
        for binding in bindings {
            query = query.bind(binding);
        }

        let response = query.await.map_err(DbError::from)?;
        response.check().map_err(|e| {
            let message = e.to_string();
            match guarded_user {
                Some(user_id) if message.contains(CONCURRENCY_CONFLICT_MARKER) => {
                    DbError::ConcurrencyConflict {
                        entity: "user".into(),
                        id: user_id.to_string(),
                    }
                }
                _ => DbError::Query(message),
            }
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use surrealdb::engine::local::{Db, Mem};

    async fn uow() -> SurrealUnitOfWork<Db> {
        let db = Surreal::new::<Mem>(()).await.unwrap();
        SurrealUnitOfWork::new(db)
    }

    #[tokio::test]
    async fn script_wraps_statements_in_transaction() {
        let mut work = uow().await;
        let tenant = Uuid::new_v4();
        let user = Uuid::new_v4();
        work.delete_associations(tenant, user, AssociationDimension::Job);
        work.insert_association(tenant, user, AssociationDimension::Job, Uuid::new_v4());

        let script = work.script();
        assert!(script.starts_with("BEGIN TRANSACTION;"));
        assert!(script.ends_with("COMMIT TRANSACTION;"));
        assert!(script.contains("DELETE user_job WHERE tenant_id = $p0 AND user_id = $p1"));
        assert!(script.contains("CREATE user_job SET tenant_id = $p2, user_id = $p3, job_id = $p4"));
        assert_eq!(work.staged(), 2);
    }

    #[tokio::test]
    async fn values_are_bound_not_inlined() {
        let mut work = uow().await;
        let record = NewUserRecord {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            username: "robert'); DELETE user; --".into(),
            email: "bobby@example.com".into(),
            name: String::new(),
            surname: String::new(),
            phone_number: None,
            lockout_enabled: true,
            password_hash: "hash".into(),
            concurrency_stamp: "stamp".into(),
            extra_properties: serde_json::json!({}),
        };
        work.insert_user(&record);

        let script = work.script();
        assert!(!script.contains("robert"));
        assert!(script.contains("phone_number = NONE"));
    }

    #[tokio::test]
    async fn empty_unit_of_work_commits_trivially() {
        let work = uow().await;
        work.commit().await.unwrap();
    }
}
