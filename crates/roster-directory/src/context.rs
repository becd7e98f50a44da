//! Caller context and permission checks.

use std::collections::BTreeSet;

use roster_core::error::{RosterError, RosterResult};
use tracing::warn;
use uuid::Uuid;

/// Permission names understood by the directory service.
pub mod permissions {
    /// Required by every user operation.
    pub const USERS: &str = "Roster.Users";
    pub const USERS_CREATE: &str = "Roster.Users.Create";
    pub const USERS_UPDATE: &str = "Roster.Users.Update";
}

/// Who is calling, on behalf of which tenant. Permissions arrive already
/// resolved.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub tenant_id: Uuid,
    pub permissions: BTreeSet<String>,
}

impl RequestContext {
    pub fn new<I, P>(tenant_id: Uuid, permissions: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self {
            tenant_id,
            permissions: permissions.into_iter().map(Into::into).collect(),
        }
    }

    pub fn has(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    /// Fail with `AuthorizationDenied` unless every permission is held.
    pub fn require(&self, required: &[&str]) -> RosterResult<()> {
        if let Some(missing) = required.iter().find(|p| !self.has(p)) {
            warn!(tenant_id = %self.tenant_id, permission = %missing, "Permission denied");
            return Err(RosterError::AuthorizationDenied {
                reason: format!("missing permission '{missing}'"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_checks_every_permission() {
        let ctx = RequestContext::new(Uuid::new_v4(), [permissions::USERS]);
        assert!(ctx.require(&[permissions::USERS]).is_ok());

        let err = ctx
            .require(&[permissions::USERS, permissions::USERS_CREATE])
            .unwrap_err();
        match err {
            RosterError::AuthorizationDenied { reason } => {
                assert!(reason.contains("Roster.Users.Create"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_context_is_denied() {
        let ctx = RequestContext::new(Uuid::new_v4(), Vec::<String>::new());
        assert!(ctx.require(&[permissions::USERS]).is_err());
        assert!(ctx.require(&[]).is_ok());
    }
}
