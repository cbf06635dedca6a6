//! Round-robin pool of read-only `DuckDB` connections.
//!
//! `duckdb::Connection` is `Send` but not `Sync`, so each connection sits
//! behind its own `Mutex`. Callers hold the returned handle for the
//! duration of one query call; dropping it releases the connection on
//! every exit path. When every pooled connection is in use, `acquire`
//! clones a short-lived overflow connection instead of waiting.

use std::ops::Deref;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};

use duckdb::Connection;

use crate::DbError;

/// Pool of `DuckDB` connections handed out round-robin.
pub struct ConnectionPool {
    connections: Vec<Mutex<Connection>>,
    /// Only locked long enough to clone an overflow connection.
    seed: Mutex<Connection>,
    next: AtomicUsize,
}

/// A connection borrowed from a [`ConnectionPool`].
pub enum PooledConnection<'a> {
    /// One of the pool's own connections, released on drop.
    Pooled(MutexGuard<'a, Connection>),
    /// A clone made because every pooled connection was busy.
    Overflow(Connection),
}

impl Deref for PooledConnection<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        match self {
            Self::Pooled(guard) => &**guard,
            Self::Overflow(conn) => conn,
        }
    }
}

impl PooledConnection<'_> {
    /// Whether this handle is an overflow clone rather than a pooled
    /// connection.
    #[must_use]
    pub const fn is_overflow(&self) -> bool {
        matches!(self, Self::Overflow(_))
    }
}

impl std::fmt::Debug for ConnectionPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionPool")
            .field("size", &self.connections.len())
            .finish_non_exhaustive()
    }
}

impl ConnectionPool {
    /// Opens `size` read-only connections to the `DuckDB` file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::MissingStore`] if the file does not exist, or
    /// [`DbError::DuckDb`] if any connection fails to open.
    pub fn open_read_only(path: &Path, size: usize) -> Result<Self, DbError> {
        let connections = (0..size.max(1))
            .map(|_| crate::open_read_only(path).map(Mutex::new))
            .collect::<Result<Vec<_>, DbError>>()?;

        log::info!(
            "Opened {} read-only DuckDB connection(s) to {}",
            connections.len(),
            path.display()
        );

        Ok(Self {
            connections,
            seed: Mutex::new(crate::open_read_only(path)?),
            next: AtomicUsize::new(0),
        })
    }

    /// Builds a pool of `size` handles that share `conn`'s database.
    ///
    /// Used for in-memory databases, where each new `open` would create an
    /// unrelated empty database.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::DuckDb`] if a connection cannot be cloned.
    pub fn from_connection(conn: Connection, size: usize) -> Result<Self, DbError> {
        let connections = (0..size.max(1))
            .map(|_| conn.try_clone().map(Mutex::new))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            connections,
            seed: Mutex::new(conn),
            next: AtomicUsize::new(0),
        })
    }

    /// Number of connections in the pool.
    #[must_use]
    pub fn size(&self) -> usize {
        self.connections.len()
    }

    /// Acquires a free connection, starting the scan at the next
    /// round-robin slot.
    ///
    /// Never waits on a connection another caller holds: if every pooled
    /// connection is busy, a fresh handle on the same database is cloned
    /// and dropped after use. A poisoned mutex is recovered rather than
    /// propagated; connections are only ever used for reads, so a panic
    /// mid-query leaves nothing half-written.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::DuckDb`] if an overflow connection cannot be
    /// cloned.
    pub fn acquire(&self) -> Result<PooledConnection<'_>, DbError> {
        let len = self.connections.len();
        let start = self.next.fetch_add(1, Ordering::Relaxed);

        for offset in 0..len {
            match self.connections[(start + offset) % len].try_lock() {
                Ok(guard) => return Ok(PooledConnection::Pooled(guard)),
                Err(TryLockError::Poisoned(e)) => {
                    return Ok(PooledConnection::Pooled(e.into_inner()));
                }
                Err(TryLockError::WouldBlock) => {}
            }
        }

        log::debug!("All {len} pooled connection(s) busy; cloning an overflow connection");
        let seed = self.seed.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(PooledConnection::Overflow(seed.try_clone()?))
    }
}
