//! Local SQLite document store.
//!
//! Uses SQLite in WAL mode with r2d2 connection pooling. Each document is a
//! row keyed by (collection, id) whose fields are kept in the typed JSON
//! encoding, so the handlers see the same values they would from Firestore.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use gb_core::config::StoreConfig;
use gb_core::error::{GbError, GbResult};

use crate::document::Document;
use crate::schema;
use crate::store::DocumentStore;
use crate::value::{FieldValue, Fields};

/// Type alias for the SQLite connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// SQLite-backed document store.
#[derive(Clone)]
pub struct LocalStore {
    pool: Arc<DbPool>,
}

impl LocalStore {
    /// Open (or create) the store at the given path.
    ///
    /// Creates parent directories, builds the connection pool with the
    /// configured pragmas, and creates the schema.
    pub fn init(db_path: &Path, config: &StoreConfig) -> GbResult<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        info!("opening local document store at {}", db_path.display());

        let manager = SqliteConnectionManager::file(db_path);
        let pool = Pool::builder()
            .max_size(config.pool_size.max(1))
            .connection_customizer(Box::new(ConnectionCustomizer {
                wal_mode: config.wal_mode,
            }))
            .build(manager)
            .map_err(|e| GbError::Pool(e.to_string()))?;

        let store = Self {
            pool: Arc::new(pool),
        };

        {
            let conn = store.conn()?;
            schema::create_tables(&conn)?;
        }

        Ok(store)
    }

    /// Get a connection from the pool.
    pub fn conn(&self) -> GbResult<r2d2::PooledConnection<SqliteConnectionManager>> {
        self.pool.get().map_err(|e| GbError::Pool(e.to_string()))
    }

    /// Execute a function within a database transaction.
    pub fn transaction<T, F>(&self, f: F) -> GbResult<T>
    where
        F: FnOnce(&Connection) -> GbResult<T>,
    {
        let mut conn = self.conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| GbError::Database(e.to_string()))?;

        let result = f(&tx)?;

        tx.commit()
            .map_err(|e| GbError::Database(e.to_string()))?;

        Ok(result)
    }

    /// Load a document, or `None` if it does not exist.
    pub fn get(&self, collection: &str, id: &str) -> GbResult<Option<Document>> {
        let conn = self.conn()?;
        load(&conn, collection, id)
    }

    /// Insert or replace a whole document.
    pub fn put(&self, collection: &str, id: &str, fields: &Fields) -> GbResult<()> {
        let encoded = serde_json::to_string(fields)?;
        let now = now();
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO documents (collection, id, fields, create_time, update_time)
             VALUES (?1, ?2, ?3, ?4, ?4)
             ON CONFLICT(collection, id) DO UPDATE SET
                fields = excluded.fields,
                update_time = excluded.update_time",
            params![collection, id, encoded, now],
        )
        .map_err(|e| GbError::Database(e.to_string()))?;

        debug!("stored document {collection}/{id}");
        Ok(())
    }

    /// Replace one field of an existing document.
    pub fn set_field(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: FieldValue,
    ) -> GbResult<()> {
        self.transaction(|conn| {
            let mut doc = load(conn, collection, id)?.ok_or_else(|| GbError::DocumentNotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
            doc.fields.insert(field.to_string(), value);

            let encoded = serde_json::to_string(&doc.fields)?;
            conn.execute(
                "UPDATE documents SET fields = ?1, update_time = ?2
                 WHERE collection = ?3 AND id = ?4",
                params![encoded, now(), collection, id],
            )
            .map_err(|e| GbError::Database(e.to_string()))?;
            Ok(())
        })?;

        debug!("updated field {field} on {collection}/{id}");
        Ok(())
    }

    /// Delete a document. Returns whether it existed.
    pub fn delete(&self, collection: &str, id: &str) -> GbResult<bool> {
        let conn = self.conn()?;
        let removed = conn
            .execute(
                "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
                params![collection, id],
            )
            .map_err(|e| GbError::Database(e.to_string()))?;
        Ok(removed > 0)
    }

    /// List document ids in a collection, sorted.
    pub fn list_ids(&self, collection: &str) -> GbResult<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT id FROM documents WHERE collection = ?1 ORDER BY id")
            .map_err(|e| GbError::Database(e.to_string()))?;
        let ids = stmt
            .query_map(params![collection], |row| row.get::<_, String>(0))
            .map_err(|e| GbError::Database(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| GbError::Database(e.to_string()))?;
        Ok(ids)
    }

    /// Drop and recreate the schema, deleting every document.
    pub fn reset(&self) -> GbResult<()> {
        let conn = self.conn()?;
        schema::drop_tables(&conn)?;
        schema::create_tables(&conn)?;
        info!("local document store reset");
        Ok(())
    }
}

/// Runs the SQLite call inline, blocking the executor thread for its
/// duration. Suited to local runs and tests, not to a shared runtime.
#[async_trait]
impl DocumentStore for LocalStore {
    async fn get_document(&self, collection: &str, id: &str) -> GbResult<Document> {
        self.get(collection, id)?.ok_or_else(|| GbError::DocumentNotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        })
    }

    async fn update_field(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: FieldValue,
    ) -> GbResult<()> {
        self.set_field(collection, id, field, value)
    }
}

fn load(conn: &Connection, collection: &str, id: &str) -> GbResult<Option<Document>> {
    let row = conn
        .query_row(
            "SELECT fields, update_time FROM documents WHERE collection = ?1 AND id = ?2",
            params![collection, id],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
        )
        .optional()
        .map_err(|e| GbError::Database(e.to_string()))?;

    match row {
        Some((encoded, update_time)) => {
            let fields: Fields = serde_json::from_str(&encoded).map_err(|e| {
                GbError::Database(format!("corrupt document {collection}/{id}: {e}"))
            })?;
            Ok(Some(Document {
                id: id.to_string(),
                fields,
                update_time: Some(update_time),
            }))
        }
        None => Ok(None),
    }
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// r2d2 connection customizer that applies PRAGMA settings.
#[derive(Debug)]
struct ConnectionCustomizer {
    wal_mode: bool,
}

impl r2d2::CustomizeConnection<Connection, rusqlite::Error> for ConnectionCustomizer {
    fn on_acquire(&self, conn: &mut Connection) -> Result<(), rusqlite::Error> {
        if self.wal_mode {
            conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        }

        conn.execute_batch(
            "PRAGMA synchronous=NORMAL;
             PRAGMA busy_timeout=5000;",
        )?;

        Ok(())
    }
}
