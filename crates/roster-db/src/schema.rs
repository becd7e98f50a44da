//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Every tenant-scoped table carries a
//! `tenant_id` column that leads its indexes.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "directory_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Users (tenant scope)
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE user TYPE string;
DEFINE FIELD username ON TABLE user TYPE string;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD name ON TABLE user TYPE string DEFAULT '';
DEFINE FIELD surname ON TABLE user TYPE string DEFAULT '';
DEFINE FIELD phone_number ON TABLE user TYPE option<string>;
DEFINE FIELD lockout_enabled ON TABLE user TYPE bool DEFAULT false;
DEFINE FIELD password_hash ON TABLE user TYPE string;
DEFINE FIELD concurrency_stamp ON TABLE user TYPE string;
DEFINE FIELD extra_properties ON TABLE user TYPE object FLEXIBLE \
    DEFAULT {};
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_tenant_username ON TABLE user \
    COLUMNS tenant_id, username UNIQUE;
DEFINE INDEX idx_user_tenant_email ON TABLE user \
    COLUMNS tenant_id, email UNIQUE;

-- =======================================================================
-- Roles (tenant scope)
-- =======================================================================
DEFINE TABLE role SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE role TYPE string;
DEFINE FIELD name ON TABLE role TYPE string;
DEFINE FIELD description ON TABLE role TYPE string DEFAULT '';
DEFINE FIELD created_at ON TABLE role TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE role TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_role_tenant_name ON TABLE role \
    COLUMNS tenant_id, name UNIQUE;

-- =======================================================================
-- Organizations (tenant scope, cascade-coded tree)
-- =======================================================================
DEFINE TABLE organization SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE organization TYPE string;
DEFINE FIELD name ON TABLE organization TYPE string;
DEFINE FIELD parent_id ON TABLE organization TYPE option<string>;
DEFINE FIELD cascade_id ON TABLE organization TYPE string \
    ASSERT string::len($value) > 0;
DEFINE FIELD created_at ON TABLE organization TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE organization TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_organization_tenant_cascade ON TABLE organization \
    COLUMNS tenant_id, cascade_id UNIQUE;

-- =======================================================================
-- Jobs (tenant scope)
-- =======================================================================
DEFINE TABLE job SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE job TYPE string;
DEFINE FIELD name ON TABLE job TYPE string;
DEFINE FIELD created_at ON TABLE job TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE job TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_job_tenant_name ON TABLE job \
    COLUMNS tenant_id, name UNIQUE;

-- =======================================================================
-- User associations (tenant scope, replace-all)
-- =======================================================================
DEFINE TABLE user_organization SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE user_organization TYPE string;
DEFINE FIELD user_id ON TABLE user_organization TYPE string;
DEFINE FIELD organization_id ON TABLE user_organization TYPE string;
DEFINE FIELD created_at ON TABLE user_organization TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_organization_unique ON TABLE user_organization \
    COLUMNS tenant_id, user_id, organization_id UNIQUE;
DEFINE INDEX idx_user_organization_org ON TABLE user_organization \
    COLUMNS tenant_id, organization_id;

DEFINE TABLE user_job SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE user_job TYPE string;
DEFINE FIELD user_id ON TABLE user_job TYPE string;
DEFINE FIELD job_id ON TABLE user_job TYPE string;
DEFINE FIELD created_at ON TABLE user_job TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_job_unique ON TABLE user_job \
    COLUMNS tenant_id, user_id, job_id UNIQUE;

-- =======================================================================
-- Graph Edge Tables (relations)
-- =======================================================================

-- User -> Role assignment
DEFINE TABLE has_role TYPE RELATION SCHEMAFULL;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}
