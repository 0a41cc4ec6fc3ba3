//! Shipped connection source implementations.
//!
//! # Responsibility
//! - Open file-backed or in-memory SQLite connections on demand.
//! - Apply connection pragmas and one-time bootstrap SQL.
//!
//! # Invariants
//! - Every connection handed out has `foreign_keys=ON` and a busy timeout.
//! - Bootstrap SQL runs exactly once, at source construction, before any
//!   connection reaches a caller.

use super::{ConnectionSource, DbError, DbResult};
use log::{debug, error, info};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

fn configure(conn: &Connection) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|source| DbError::Bootstrap {
            source,
            context: "pragma setup",
        })?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    Ok(())
}

fn run_bootstrap(conn: &Connection, sql: &str) -> DbResult<()> {
    conn.execute_batch(sql).map_err(|source| DbError::Bootstrap {
        source,
        context: "schema bootstrap",
    })
}

fn close_released(conn: Connection) {
    if let Err((_conn, err)) = conn.close() {
        error!("event=conn_release module=db status=error error={err}");
    }
}

/// Source that opens the same database file for every acquire.
///
/// Pooling is deliberately out of scope; each acquire is a fresh handle and
/// release closes it. SQLite's busy timeout arbitrates concurrent writers.
pub struct FileConnectionSource {
    path: PathBuf,
}

impl FileConnectionSource {
    /// Creates a source over `path` without touching the schema.
    pub fn new(path: impl AsRef<Path>) -> DbResult<Self> {
        Self::with_bootstrap(path, None)
    }

    /// Creates a source over `path`, running `bootstrap_sql` once up front.
    ///
    /// The SQL should be idempotent (`CREATE TABLE IF NOT EXISTS ...`) since
    /// the file may already carry the schema from an earlier run.
    pub fn with_bootstrap(path: impl AsRef<Path>, bootstrap_sql: Option<&str>) -> DbResult<Self> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open(&path)?;
        configure(&conn)?;
        if let Some(sql) = bootstrap_sql {
            run_bootstrap(&conn, sql)?;
        }
        close_released(conn);
        info!(
            "event=source_init module=db status=ok mode=file path={}",
            path.display()
        );
        Ok(Self { path })
    }
}

impl ConnectionSource for FileConnectionSource {
    fn acquire(&self) -> DbResult<Connection> {
        let conn = Connection::open(&self.path)?;
        configure(&conn)?;
        debug!("event=conn_acquire module=db mode=file");
        Ok(conn)
    }

    fn release(&self, conn: Connection) {
        debug!("event=conn_release module=db mode=file");
        close_released(conn);
    }
}

/// Source backed by a uniquely named shared-cache in-memory database.
///
/// An anchor connection held for the source's lifetime keeps the database
/// alive, so independent acquires observe the same data. Intended for tests
/// and the CLI probe; file sources are the production path.
#[derive(Debug)]
pub struct MemoryConnectionSource {
    uri: String,
    // Dropping this connection would let SQLite discard the database.
    _anchor: Connection,
}

impl MemoryConnectionSource {
    pub fn new() -> DbResult<Self> {
        Self::with_bootstrap(None)
    }

    /// Creates an empty in-memory database, running `bootstrap_sql` once.
    pub fn with_bootstrap(bootstrap_sql: Option<&str>) -> DbResult<Self> {
        let uri = format!("file:crudkit-{}?mode=memory&cache=shared", Uuid::new_v4());
        let anchor = Connection::open(&uri)?;
        configure(&anchor)?;
        if let Some(sql) = bootstrap_sql {
            run_bootstrap(&anchor, sql)?;
        }
        info!("event=source_init module=db status=ok mode=memory");
        Ok(Self {
            uri,
            _anchor: anchor,
        })
    }
}

impl ConnectionSource for MemoryConnectionSource {
    fn acquire(&self) -> DbResult<Connection> {
        let conn = Connection::open(&self.uri)?;
        configure(&conn)?;
        debug!("event=conn_acquire module=db mode=memory");
        Ok(conn)
    }

    fn release(&self, conn: Connection) {
        debug!("event=conn_release module=db mode=memory");
        close_released(conn);
    }
}

#[cfg(test)]
mod tests {
    use super::{ConnectionSource, FileConnectionSource, MemoryConnectionSource};
    use crate::db::DbError;

    const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS kv (k TEXT PRIMARY KEY, v TEXT NOT NULL);";

    #[test]
    fn memory_source_shares_data_across_acquires() {
        let source = MemoryConnectionSource::with_bootstrap(Some(SCHEMA)).unwrap();

        let writer = source.acquire().unwrap();
        writer
            .execute("INSERT INTO kv (k, v) VALUES ('a', '1');", [])
            .unwrap();
        source.release(writer);

        let reader = source.acquire().unwrap();
        let value: String = reader
            .query_row("SELECT v FROM kv WHERE k = 'a';", [], |row| row.get(0))
            .unwrap();
        source.release(reader);

        assert_eq!(value, "1");
    }

    #[test]
    fn distinct_memory_sources_are_isolated() {
        let first = MemoryConnectionSource::with_bootstrap(Some(SCHEMA)).unwrap();
        let second = MemoryConnectionSource::with_bootstrap(Some(SCHEMA)).unwrap();

        let conn = first.acquire().unwrap();
        conn.execute("INSERT INTO kv (k, v) VALUES ('a', '1');", [])
            .unwrap();
        first.release(conn);

        let conn = second.acquire().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM kv;", [], |row| row.get(0))
            .unwrap();
        second.release(conn);

        assert_eq!(count, 0);
    }

    #[test]
    fn file_source_persists_between_acquires() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("people.db");
        let source = FileConnectionSource::with_bootstrap(&path, Some(SCHEMA)).unwrap();

        let conn = source.acquire().unwrap();
        conn.execute("INSERT INTO kv (k, v) VALUES ('k', 'persisted');", [])
            .unwrap();
        source.release(conn);

        let conn = source.acquire().unwrap();
        let value: String = conn
            .query_row("SELECT v FROM kv WHERE k = 'k';", [], |row| row.get(0))
            .unwrap();
        source.release(conn);

        assert_eq!(value, "persisted");
    }

    #[test]
    fn invalid_bootstrap_sql_is_a_bootstrap_error() {
        let err = MemoryConnectionSource::with_bootstrap(Some("CREATE TABEL broken;")).unwrap_err();
        assert!(matches!(err, DbError::Bootstrap { .. }));
    }
}
