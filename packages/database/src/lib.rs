#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! `DuckDB` storage for historical accident records.
//!
//! The ingestion tool writes the `accidents` table and rebuilds the summary
//! tables; the query side opens the same file read-only through
//! [`pool::ConnectionPool`].

pub mod paths;
pub mod pool;
pub mod records;
pub mod schema;
pub mod summaries;

use std::path::{Path, PathBuf};

use duckdb::Connection;

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// `DuckDB` error.
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The database file does not exist.
    #[error("Accident database not found at {}", path.display())]
    MissingStore {
        /// Path that was looked up.
        path: PathBuf,
    },
}

/// Opens (or creates) a writable accidents database and ensures the
/// schema exists.
///
/// # Errors
///
/// Returns [`DbError`] if the connection or schema creation fails.
pub fn open(path: &Path) -> Result<Connection, DbError> {
    if let Some(parent) = path.parent() {
        paths::ensure_dir(parent)?;
    }

    let conn = Connection::open(path)?;
    schema::create_schema(&conn)?;

    Ok(conn)
}

/// Opens an existing accidents database read-only.
///
/// Never creates the file, its directory, or the schema.
///
/// # Errors
///
/// Returns [`DbError::MissingStore`] if the file does not exist, or
/// [`DbError::DuckDb`] if it cannot be opened.
pub fn open_read_only(path: &Path) -> Result<Connection, DbError> {
    if !path.exists() {
        return Err(DbError::MissingStore {
            path: path.to_path_buf(),
        });
    }

    let config = duckdb::Config::default().access_mode(duckdb::AccessMode::ReadOnly)?;
    Ok(Connection::open_with_flags(path, config)?)
}

/// Opens an in-memory accidents database with the schema applied.
///
/// # Errors
///
/// Returns [`DbError`] if the connection or schema creation fails.
pub fn open_in_memory() -> Result<Connection, DbError> {
    let conn = Connection::open_in_memory()?;
    schema::create_schema(&conn)?;
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("accident_risk_{name}_{}", std::process::id()))
    }

    #[test]
    fn read_only_open_does_not_create_missing_store() {
        let dir = scratch_dir("missing");
        let path = dir.join("accidents.duckdb");

        let err = open_read_only(&path).unwrap_err();
        assert!(matches!(err, DbError::MissingStore { .. }));
        assert!(!path.exists());
        assert!(!dir.exists());
    }

    #[test]
    fn read_only_open_reads_but_rejects_writes() {
        let dir = scratch_dir("read_only");
        let path = dir.join("accidents.duckdb");
        drop(open(&path).unwrap());

        let conn = open_read_only(&path).unwrap();
        assert_eq!(records::get_record_count(&conn).unwrap(), 0);
        assert!(conn.execute_batch("CREATE TABLE scratch (x INTEGER)").is_err());

        drop(conn);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
