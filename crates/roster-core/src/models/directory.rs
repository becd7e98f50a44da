//! Request and response shapes of the user directory service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::User;
use crate::repository::Pagination;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserInput {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub surname: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub lockout_enabled: bool,
    #[serde(default)]
    pub role_names: Vec<String>,
    #[serde(default)]
    pub job_ids: Vec<Uuid>,
    #[serde(default)]
    pub organization_ids: Vec<Uuid>,
    #[serde(default)]
    pub extra_properties: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUserInput {
    /// Must match the stored stamp or the update is rejected.
    pub concurrency_stamp: String,
    pub username: String,
    pub email: String,
    /// Rotates the password when present and non-empty.
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub surname: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub lockout_enabled: bool,
    /// `None` leaves role assignments untouched; `Some` replaces them.
    #[serde(default)]
    pub role_names: Option<Vec<String>>,
    #[serde(default)]
    pub job_ids: Vec<Uuid>,
    #[serde(default)]
    pub organization_ids: Vec<Uuid>,
    /// Keys present here overwrite the stored extra properties.
    #[serde(default)]
    pub extra_properties: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserSortField {
    Username,
    Email,
    Name,
    Surname,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSort {
    pub field: UserSortField,
    #[serde(default)]
    pub direction: SortDirection,
}

impl UserSort {
    pub fn asc(field: UserSortField) -> Self {
        Self {
            field,
            direction: SortDirection::Ascending,
        }
    }

    pub fn desc(field: UserSortField) -> Self {
        Self {
            field,
            direction: SortDirection::Descending,
        }
    }
}

impl Default for UserSort {
    /// Newest users first.
    fn default() -> Self {
        Self::desc(UserSortField::CreatedAt)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListUsersInput {
    /// Restrict to members of this organization's subtree.
    #[serde(default)]
    pub organization_id: Option<Uuid>,
    /// Free-text, case-insensitive substring filter.
    #[serde(default)]
    pub filter: Option<String>,
    #[serde(default)]
    pub sort: Option<UserSort>,
    #[serde(default)]
    pub skip: u64,
    #[serde(default = "default_take")]
    pub take: u64,
}

fn default_take() -> u64 {
    Pagination::default().limit
}

impl Default for ListUsersInput {
    fn default() -> Self {
        Self {
            organization_id: None,
            filter: None,
            sort: None,
            skip: 0,
            take: default_take(),
        }
    }
}

impl ListUsersInput {
    /// The filter with surrounding whitespace removed, or `None` when blank.
    pub fn normalized_filter(&self) -> Option<String> {
        self.filter
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_lowercase)
    }
}

/// A user as returned by `get`, `create` and `update`.
#[derive(Debug, Clone, Serialize)]
pub struct UserDetail {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub username: String,
    pub email: String,
    pub name: String,
    pub surname: String,
    pub phone_number: Option<String>,
    pub lockout_enabled: bool,
    pub concurrency_stamp: String,
    pub extra_properties: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub job_ids: Vec<Uuid>,
    pub organization_ids: Vec<Uuid>,
    pub role_names: Vec<String>,
}

impl UserDetail {
    pub fn new(
        user: User,
        job_ids: Vec<Uuid>,
        organization_ids: Vec<Uuid>,
        role_names: Vec<String>,
    ) -> Self {
        Self {
            id: user.id,
            tenant_id: user.tenant_id,
            username: user.username,
            email: user.email,
            name: user.name,
            surname: user.surname,
            phone_number: user.phone_number,
            lockout_enabled: user.lockout_enabled,
            concurrency_stamp: user.concurrency_stamp,
            extra_properties: user.extra_properties,
            created_at: user.created_at,
            updated_at: user.updated_at,
            job_ids,
            organization_ids,
            role_names,
        }
    }
}

/// A list entry with its organizations flattened into a display string.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub name: String,
    pub surname: String,
    pub phone_number: Option<String>,
    pub lockout_enabled: bool,
    pub created_at: DateTime<Utc>,
    /// Organization names joined with `", "`, ordered by cascade code.
    pub organization_names: String,
}

impl UserSummary {
    pub fn new(user: User, organization_names: String) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            name: user.name,
            surname: user.surname,
            phone_number: user.phone_number,
            lockout_enabled: user.lockout_enabled,
            created_at: user.created_at,
            organization_names,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omitted_take_uses_default_page_size() {
        let input: ListUsersInput = serde_json::from_str(r#"{"skip": 20}"#).unwrap();
        assert_eq!(input.skip, 20);
        assert_eq!(input.take, 10);
        assert_eq!(ListUsersInput::default().take, 10);

        let explicit: ListUsersInput = serde_json::from_str(r#"{"take": 0}"#).unwrap();
        assert_eq!(explicit.take, 0);
    }

    #[test]
    fn blank_filter_normalizes_to_none() {
        let input = ListUsersInput {
            filter: Some("  Smith ".into()),
            ..ListUsersInput::default()
        };
        assert_eq!(input.normalized_filter().as_deref(), Some("smith"));
        assert_eq!(
            ListUsersInput {
                filter: Some("   ".into()),
                ..ListUsersInput::default()
            }
            .normalized_filter(),
            None
        );
    }
}
