//! Identity error types.

use roster_core::error::{FieldError, RosterError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity rules violated ({} field errors)", .0.len())]
    Rejected(Vec<FieldError>),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<IdentityError> for RosterError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::Rejected(errors) => RosterError::Validation { errors },
            IdentityError::Crypto(msg) => RosterError::Crypto(msg),
        }
    }
}
