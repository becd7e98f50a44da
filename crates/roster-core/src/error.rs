//! Error types for the Roster directory.

use serde::Serialize;
use thiserror::Error;

/// A single field-level rule violation reported by identity validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Input field that failed (e.g. `username`, `organization_ids[2]`).
    pub field: String,
    /// Machine-readable code (e.g. `duplicate`, `too_short`).
    pub code: String,
    pub message: String,
}

impl FieldError {
    pub fn new(
        field: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Validation failed: {}", join_messages(.errors))]
    Validation { errors: Vec<FieldError> },

    #[error("Concurrency conflict: {entity} {id} was modified by another request")]
    ConcurrencyConflict { entity: String, id: String },

    #[error("Authorization denied: {reason}")]
    AuthorizationDenied { reason: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type RosterResult<T> = Result<T, RosterError>;

fn join_messages(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Coarse classification of a [`RosterError`], stable across messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    NotFound,
    Validation,
    ConcurrencyConflict,
    AuthorizationDenied,
    Internal,
}

/// Structured, serializable form of an error as surfaced to callers.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub messages: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub field_errors: Vec<FieldError>,
}

impl RosterError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Build a validation failure from a single field error.
    pub fn invalid(field: &str, code: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            errors: vec![FieldError::new(field, code, message)],
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::ConcurrencyConflict { .. } => ErrorKind::ConcurrencyConflict,
            Self::AuthorizationDenied { .. } => ErrorKind::AuthorizationDenied,
            Self::Database(_) | Self::Crypto(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Human-readable messages; one per sub-error for validation failures.
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Validation { errors } => errors.iter().map(|e| e.message.clone()).collect(),
            other => vec![other.to_string()],
        }
    }

    pub fn report(&self) -> ErrorReport {
        let field_errors = match self {
            Self::Validation { errors } => errors.clone(),
            _ => Vec::new(),
        };
        ErrorReport {
            kind: self.kind(),
            messages: self.messages(),
            field_errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_are_listed_individually() {
        let err = RosterError::Validation {
            errors: vec![
                FieldError::new("username", "duplicate", "Username 'alice' is already taken"),
                FieldError::new("password", "too_short", "Password is too short"),
            ],
        };
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.messages().len(), 2);
        assert_eq!(
            err.to_string(),
            "Validation failed: Username 'alice' is already taken; Password is too short"
        );
    }

    #[test]
    fn infrastructure_errors_report_as_internal() {
        let report = RosterError::Database("connection reset".into()).report();
        assert_eq!(report.kind, ErrorKind::Internal);
        assert_eq!(report.messages, vec!["Database error: connection reset"]);
        assert!(report.field_errors.is_empty());
    }

    #[test]
    fn report_serializes_kind_and_fields() {
        let report = RosterError::invalid("email", "invalid_format", "Invalid email").report();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["kind"], "Validation");
        assert_eq!(json["field_errors"][0]["field"], "email");
    }
}
