use std::fs;
use std::path::Path;

use duckdb::{AccessMode, Config, Connection};
use tracing::debug;

use crate::error::Result;

/// Escapes a filesystem path for embedding in a single-quoted SQL literal.
pub fn quote_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/").replace('\'', "''")
}

/// The warehouse resource: one DuckDB connection, acquired once per run by a
/// single owner and released when dropped, on every exit path. Concurrent
/// runs against the same file path are not supported; callers serialize runs.
pub struct Warehouse {
    conn: Connection,
}

impl Warehouse {
    /// Opens (creating if absent) the warehouse file for a build run.
    pub fn create(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(db_path)?;
        debug!(path = %db_path.display(), "opened warehouse");
        Ok(Self { conn })
    }

    /// Opens an already-built warehouse read-only (validator entry point).
    /// The file must exist, and no statement through this handle can mutate
    /// warehouse state.
    pub fn open_existing(db_path: &Path) -> Result<Self> {
        if !db_path.exists() {
            return Err(crate::error::WarehouseError::WarehouseNotFound(
                db_path.to_path_buf(),
            ));
        }
        let config = Config::default().access_mode(AccessMode::ReadOnly)?;
        let conn = Connection::open_with_flags(db_path, config)?;
        Ok(Self { conn })
    }

    /// In-memory warehouse, used by the test suite.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Creates the layer namespaces. Idempotent.
    pub fn ensure_schemas(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE SCHEMA IF NOT EXISTS raw;
             CREATE SCHEMA IF NOT EXISTS stg;
             CREATE SCHEMA IF NOT EXISTS mart;",
        )?;
        Ok(())
    }

    /// Runs a batch of SQL statements against the live warehouse state.
    pub fn execute_batch(&self, sql: &str) -> duckdb::Result<()> {
        self.conn.execute_batch(sql)
    }

    /// Row count of a table or view. Errors if the object is not resolvable.
    pub fn count(&self, object: &str) -> Result<i64> {
        let count =
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM {object}"), [], |row| {
                    row.get(0)
                })?;
        Ok(count)
    }

    /// Whether the object resolves and returns at least zero rows.
    pub fn is_queryable(&self, object: &str) -> bool {
        self.count(object).is_ok()
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_schemas_is_idempotent() {
        let wh = Warehouse::open_in_memory().unwrap();
        wh.ensure_schemas().unwrap();
        wh.ensure_schemas().unwrap();
        wh.execute_batch("CREATE TABLE raw.t (x VARCHAR);").unwrap();
        assert_eq!(wh.count("raw.t").unwrap(), 0);
    }

    #[test]
    fn count_errors_on_missing_object() {
        let wh = Warehouse::open_in_memory().unwrap();
        assert!(wh.count("mart.nope").is_err());
        assert!(!wh.is_queryable("mart.nope"));
    }

    #[test]
    fn open_existing_rejects_writes() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("built.duckdb");
        {
            let wh = Warehouse::create(&db_path).unwrap();
            wh.ensure_schemas().unwrap();
            wh.execute_batch("CREATE TABLE mart.t (x INTEGER);").unwrap();
        }

        let wh = Warehouse::open_existing(&db_path).unwrap();
        assert_eq!(wh.count("mart.t").unwrap(), 0);
        assert!(wh.execute_batch("INSERT INTO mart.t VALUES (1);").is_err());
        assert!(wh.execute_batch("DROP TABLE mart.t;").is_err());
    }

    #[test]
    fn open_existing_requires_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.duckdb");
        assert!(Warehouse::open_existing(&missing).is_err());
    }

    #[test]
    fn quote_path_escapes_single_quotes() {
        let quoted = quote_path(Path::new("/tmp/it's/data.csv"));
        assert_eq!(quoted, "/tmp/it''s/data.csv");
    }
}
