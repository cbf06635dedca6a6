//! Shared read-only handle on the accidents database.

use std::path::Path;

use accident_risk_database::DbError;
use accident_risk_database::paths::{accidents_db_path, pool_size};
use accident_risk_database::pool::{ConnectionPool, PooledConnection};
use accident_risk_database::schema::has_summary_tables;
use accident_risk_database_models::GlobalBaseline;
use duckdb::Connection;

use crate::AnalyticsError;
use crate::source::{StatsSource, Strategy};

/// Connection pool, statistics strategy, and the global baseline.
///
/// The baseline is read once at open time and never changes for the life
/// of the store.
#[derive(Debug)]
pub struct AccidentStore {
    pool: ConnectionPool,
    strategy: Strategy,
    baseline: GlobalBaseline,
}

impl AccidentStore {
    /// Opens the database at `path` read-only with `size` connections.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::Store`] if the file is missing or cannot
    /// be opened, or [`AnalyticsError::Database`] if the baseline cannot
    /// be read.
    pub fn open(path: &Path, size: usize) -> Result<Self, AnalyticsError> {
        log::info!("Opening accident store at {}", path.display());
        let pool = ConnectionPool::open_read_only(path, size)?;
        Self::from_pool(pool, None)
    }

    /// Opens the database named by the environment.
    ///
    /// # Errors
    ///
    /// See [`Self::open`].
    pub fn open_default() -> Result<Self, AnalyticsError> {
        Self::open(&accidents_db_path(), pool_size())
    }

    /// Wraps an already-open connection (typically in-memory).
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError`] if the connection cannot be cloned or
    /// the baseline cannot be read.
    pub fn from_connection(
        conn: Connection,
        size: usize,
        strategy: Option<Strategy>,
    ) -> Result<Self, AnalyticsError> {
        let pool = ConnectionPool::from_connection(conn, size)?;
        Self::from_pool(pool, strategy)
    }

    /// Builds a store over `pool`, detecting the strategy when `None`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError`] if detection or the baseline query fails.
    pub fn from_pool(pool: ConnectionPool, strategy: Option<Strategy>) -> Result<Self, AnalyticsError> {
        let (strategy, baseline) = {
            let conn = pool.acquire()?;
            let strategy = match strategy {
                Some(strategy) => strategy,
                None => detect_strategy(&conn)?,
            };
            let baseline = strategy.source().baseline(&conn)?;
            (strategy, baseline)
        };

        log::info!(
            "Accident store ready: strategy={strategy}, connections={}, avg_hourly={:.3}, clear_weather_severity={:?}",
            pool.size(),
            baseline.avg_hourly,
            baseline.clear_weather_severity,
        );

        Ok(Self {
            pool,
            strategy,
            baseline,
        })
    }

    /// Borrows a connection for the duration of one call.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::Store`] if every pooled connection is busy
    /// and an overflow connection cannot be opened.
    pub fn connection(&self) -> Result<PooledConnection<'_>, AnalyticsError> {
        Ok(self.pool.acquire()?)
    }

    /// The statistics source for this store's strategy.
    #[must_use]
    pub fn source(&self) -> &'static dyn StatsSource {
        self.strategy.source()
    }

    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    #[must_use]
    pub const fn baseline(&self) -> &GlobalBaseline {
        &self.baseline
    }
}

fn detect_strategy(conn: &Connection) -> Result<Strategy, DbError> {
    if has_summary_tables(conn)? {
        Ok(Strategy::Aggregate)
    } else {
        log::warn!("Summary tables missing; scanning raw records");
        Ok(Strategy::Raw)
    }
}
