//! User domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub username: String,
    pub email: String,
    pub name: String,
    pub surname: String,
    pub phone_number: Option<String>,
    pub lockout_enabled: bool,
    /// Argon2id PHC string; never the raw password.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Opaque token rotated on every update; callers echo it back to
    /// prove they saw the latest version.
    pub concurrency_stamp: String,
    pub extra_properties: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A fully validated user row, ready to be staged for insertion.
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub username: String,
    pub email: String,
    pub name: String,
    pub surname: String,
    pub phone_number: Option<String>,
    pub lockout_enabled: bool,
    pub password_hash: String,
    pub concurrency_stamp: String,
    pub extra_properties: serde_json::Value,
}

/// Replacement values for an existing user row.
///
/// Every field is written; `password_hash` is only replaced when `Some`.
#[derive(Debug, Clone)]
pub struct UserRecordChanges {
    pub username: String,
    pub email: String,
    pub name: String,
    pub surname: String,
    pub phone_number: Option<String>,
    pub lockout_enabled: bool,
    pub password_hash: Option<String>,
    /// The stamp the row will carry after the update commits.
    pub concurrency_stamp: String,
    pub extra_properties: serde_json::Value,
}

/// Generate a fresh concurrency stamp.
pub fn new_concurrency_stamp() -> String {
    Uuid::new_v4().simple().to_string()
}
