//! Turns user create/update requests into validated records.
//!
//! Nothing here writes to storage. The manager reads the store for
//! uniqueness and role lookups, then hands back records that the
//! directory service stages in its unit of work.

use std::collections::BTreeSet;

use roster_core::error::{FieldError, RosterResult};
use roster_core::models::directory::{CreateUserInput, UpdateUserInput};
use roster_core::models::user::{
    NewUserRecord, User, UserRecordChanges, new_concurrency_stamp,
};
use roster_core::repository::{DirectoryStore, RoleRepository, UserRepository};
use tracing::debug;
use uuid::Uuid;

use crate::config::IdentityConfig;
use crate::error::IdentityError;
use crate::password::hash_password;
use crate::validation;

/// A new user row plus the roles it should hold.
#[derive(Debug, Clone)]
pub struct PreparedCreate {
    pub record: NewUserRecord,
    pub role_ids: Vec<Uuid>,
}

/// Replacement values for an existing user.
#[derive(Debug, Clone)]
pub struct PreparedUpdate {
    pub changes: UserRecordChanges,
    /// `None` leaves role assignments as they are.
    pub role_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, Default)]
pub struct IdentityManager {
    config: IdentityConfig,
}

impl IdentityManager {
    pub fn new(config: IdentityConfig) -> Self {
        Self { config }
    }

    pub async fn prepare_create<S: DirectoryStore>(
        &self,
        store: &S,
        tenant_id: Uuid,
        input: &CreateUserInput,
    ) -> RosterResult<PreparedCreate> {
        let username = input.username.trim();
        let email = input.email.trim();
        let phone_number = normalize_phone(input.phone_number.as_deref());

        let mut errors = Vec::new();
        self.check_username(store, tenant_id, username, None, &mut errors)
            .await?;
        self.check_email(store, tenant_id, email, None, &mut errors)
            .await?;
        errors.extend(validation::validate_profile(
            &input.name,
            &input.surname,
            phone_number.as_deref(),
        ));
        errors.extend(validation::validate_password(&input.password, &self.config));
        let extra_properties = match &input.extra_properties {
            Some(value) => check_extra_properties(value, &mut errors)
                .cloned()
                .unwrap_or_else(empty_object),
            None => empty_object(),
        };
        let role_ids = resolve_roles(store, tenant_id, &input.role_names, &mut errors).await?;

        if !errors.is_empty() {
            debug!(%tenant_id, errors = errors.len(), "Rejected new user");
            return Err(IdentityError::Rejected(errors).into());
        }

        let password_hash = hash_password(&input.password, self.config.pepper.as_deref())?;
        Ok(PreparedCreate {
            record: NewUserRecord {
                id: Uuid::new_v4(),
                tenant_id,
                username: username.to_string(),
                email: email.to_string(),
                name: input.name.clone(),
                surname: input.surname.clone(),
                phone_number,
                lockout_enabled: input.lockout_enabled,
                password_hash,
                concurrency_stamp: new_concurrency_stamp(),
                extra_properties,
            },
            role_ids,
        })
    }

    /// Validate an update of `existing`. The concurrency stamp is not
    /// checked here.
    pub async fn prepare_update<S: DirectoryStore>(
        &self,
        store: &S,
        existing: &User,
        input: &UpdateUserInput,
    ) -> RosterResult<PreparedUpdate> {
        let tenant_id = existing.tenant_id;
        let username = input.username.trim();
        let email = input.email.trim();
        let phone_number = normalize_phone(input.phone_number.as_deref());

        let mut errors = Vec::new();
        if !username.eq_ignore_ascii_case(&existing.username) {
            self.check_username(store, tenant_id, username, Some(existing.id), &mut errors)
                .await?;
        } else if let Err(e) = validation::validate_username(username) {
            errors.push(e);
        }
        if !email.eq_ignore_ascii_case(&existing.email) {
            self.check_email(store, tenant_id, email, Some(existing.id), &mut errors)
                .await?;
        } else if let Err(e) = validation::validate_email(email) {
            errors.push(e);
        }
        errors.extend(validation::validate_profile(
            &input.name,
            &input.surname,
            phone_number.as_deref(),
        ));

        let new_password = input.password.as_deref().filter(|p| !p.is_empty());
        if let Some(password) = new_password {
            errors.extend(validation::validate_password(password, &self.config));
        }

        let mut extra_properties = existing.extra_properties.clone();
        if let Some(overlay) = &input.extra_properties
            && let Some(overlay) = check_extra_properties(overlay, &mut errors)
        {
            merge_object(&mut extra_properties, overlay);
        }

        let role_ids = match &input.role_names {
            Some(names) => Some(resolve_roles(store, tenant_id, names, &mut errors).await?),
            None => None,
        };

        if !errors.is_empty() {
            debug!(%tenant_id, user_id = %existing.id, errors = errors.len(), "Rejected user update");
            return Err(IdentityError::Rejected(errors).into());
        }

        let password_hash = new_password
            .map(|p| hash_password(p, self.config.pepper.as_deref()))
            .transpose()?;

        Ok(PreparedUpdate {
            changes: UserRecordChanges {
                username: username.to_string(),
                email: email.to_string(),
                name: input.name.clone(),
                surname: input.surname.clone(),
                phone_number,
                lockout_enabled: input.lockout_enabled,
                password_hash,
                concurrency_stamp: new_concurrency_stamp(),
                extra_properties,
            },
            role_ids,
        })
    }

    async fn check_username<S: DirectoryStore>(
        &self,
        store: &S,
        tenant_id: Uuid,
        username: &str,
        owner: Option<Uuid>,
        errors: &mut Vec<FieldError>,
    ) -> RosterResult<()> {
        if let Err(e) = validation::validate_username(username) {
            errors.push(e);
            return Ok(());
        }
        let holder = store.users().find_by_username(tenant_id, username).await?;
        if holder.is_some_and(|u| Some(u.id) != owner) {
            errors.push(FieldError::new(
                "username",
                "duplicate",
                format!("Username '{username}' is already taken"),
            ));
        }
        Ok(())
    }

    async fn check_email<S: DirectoryStore>(
        &self,
        store: &S,
        tenant_id: Uuid,
        email: &str,
        owner: Option<Uuid>,
        errors: &mut Vec<FieldError>,
    ) -> RosterResult<()> {
        if let Err(e) = validation::validate_email(email) {
            errors.push(e);
            return Ok(());
        }
        let holder = store.users().find_by_email(tenant_id, email).await?;
        if holder.is_some_and(|u| Some(u.id) != owner) {
            errors.push(FieldError::new(
                "email",
                "duplicate",
                format!("Email '{email}' is already taken"),
            ));
        }
        Ok(())
    }
}

/// Role ids for `names`; every unknown name becomes a field error.
async fn resolve_roles<S: DirectoryStore>(
    store: &S,
    tenant_id: Uuid,
    names: &[String],
    errors: &mut Vec<FieldError>,
) -> RosterResult<Vec<Uuid>> {
    let wanted: BTreeSet<&str> = names
        .iter()
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .collect();
    if wanted.is_empty() {
        return Ok(Vec::new());
    }

    let lookup: Vec<String> = wanted.iter().map(|n| n.to_string()).collect();
    let roles = store.roles().find_by_names(tenant_id, &lookup).await?;

    for name in &wanted {
        if !roles.iter().any(|r| r.name == *name) {
            errors.push(FieldError::new(
                "role_names",
                "not_found",
                format!("Role '{name}' does not exist"),
            ));
        }
    }

    let mut ids: Vec<Uuid> = roles.into_iter().map(|r| r.id).collect();
    ids.sort();
    ids.dedup();
    Ok(ids)
}

fn normalize_phone(phone_number: Option<&str>) -> Option<String> {
    phone_number
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(Default::default())
}

fn check_extra_properties<'a>(
    value: &'a serde_json::Value,
    errors: &mut Vec<FieldError>,
) -> Option<&'a serde_json::Value> {
    if value.is_object() {
        Some(value)
    } else {
        errors.push(FieldError::new(
            "extra_properties",
            "invalid_type",
            "Extra properties must be a JSON object",
        ));
        None
    }
}

/// Overlay the keys of `overlay` onto `target`. A non-object target is
/// replaced.
fn merge_object(target: &mut serde_json::Value, overlay: &serde_json::Value) {
    let Some(overlay) = overlay.as_object() else {
        return;
    };
    if !target.is_object() {
        *target = empty_object();
    }
    if let Some(target) = target.as_object_mut() {
        for (key, value) in overlay {
            target.insert(key.clone(), value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_overlays_keys() {
        let mut target = json!({"a": 1, "b": 2});
        merge_object(&mut target, &json!({"b": 3, "c": 4}));
        assert_eq!(target, json!({"a": 1, "b": 3, "c": 4}));
    }

    #[test]
    fn merge_replaces_non_object_target() {
        let mut target = json!(null);
        merge_object(&mut target, &json!({"k": "v"}));
        assert_eq!(target, json!({"k": "v"}));
    }

    #[test]
    fn blank_phone_is_absent() {
        assert_eq!(normalize_phone(Some("  ")), None);
        assert_eq!(normalize_phone(Some(" 555 ")).as_deref(), Some("555"));
        assert_eq!(normalize_phone(None), None);
    }

    #[test]
    fn non_object_extra_properties_rejected() {
        let mut errors = Vec::new();
        assert!(check_extra_properties(&json!([1, 2]), &mut errors).is_none());
        assert_eq!(errors[0].field, "extra_properties");
    }
}
