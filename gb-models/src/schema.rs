//! Local document store schema.
//!
//! Documents are stored one row per (collection, id), with their fields
//! serialized in the same typed JSON encoding Firestore uses.

use rusqlite::Connection;
use gb_core::error::{GbError, GbResult};
use tracing::{debug, info};

/// Current schema version, tracked in `PRAGMA user_version`.
pub const SCHEMA_VERSION: i32 = 1;

/// Create all tables and indexes if they do not exist.
pub fn create_tables(conn: &Connection) -> GbResult<()> {
    conn.execute_batch(SCHEMA_SQL)
        .map_err(|e| GbError::Database(format!("failed to create schema: {e}")))?;

    let version: i32 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|e| GbError::Database(e.to_string()))?;

    if version < SCHEMA_VERSION {
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)
            .map_err(|e| GbError::Database(e.to_string()))?;
        info!("document schema created at version {SCHEMA_VERSION}");
    } else {
        debug!("document schema verified (version {version})");
    }
    Ok(())
}

/// Drop all tables (used for store reset).
pub fn drop_tables(conn: &Connection) -> GbResult<()> {
    conn.execute_batch("DROP TABLE IF EXISTS documents; PRAGMA user_version = 0;")
        .map_err(|e| GbError::Database(format!("failed to drop tables: {e}")))?;
    Ok(())
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    collection  TEXT NOT NULL,
    id          TEXT NOT NULL,
    fields      TEXT NOT NULL,
    create_time TEXT NOT NULL,
    update_time TEXT NOT NULL,
    PRIMARY KEY (collection, id)
);

CREATE INDEX IF NOT EXISTS idx_documents_update_time ON documents (collection, update_time);
"#;
