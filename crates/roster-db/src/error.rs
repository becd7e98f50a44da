//! Database-specific error types and conversions.

use roster_core::error::RosterError;

/// Marker thrown from inside a transaction when a concurrency stamp check
/// fails; recognised when mapping the transaction error.
pub(crate) const CONCURRENCY_CONFLICT_MARKER: &str = "roster:concurrency_conflict";

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Malformed stored value: {0}")]
    Decode(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Stale concurrency stamp for {entity} {id}")]
    ConcurrencyConflict { entity: String, id: String },
}

impl From<DbError> for RosterError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => RosterError::NotFound { entity, id },
            DbError::ConcurrencyConflict { entity, id } => {
                RosterError::ConcurrencyConflict { entity, id }
            }
            other => RosterError::Database(other.to_string()),
        }
    }
}
