#![allow(clippy::module_name_repetitions)]
//! Canonical file paths and environment overrides for the accidents
//! database.

use std::path::{Path, PathBuf};

/// Environment variable overriding the database location.
pub const DB_PATH_ENV: &str = "ACCIDENTS_DB_PATH";

/// Environment variable overriding the read-only pool size.
pub const POOL_SIZE_ENV: &str = "ACCIDENTS_DB_POOL_SIZE";

/// Pool size used when [`POOL_SIZE_ENV`] is unset or unparseable.
pub const DEFAULT_POOL_SIZE: usize = 4;

/// Returns the workspace root directory.
///
/// Resolved at compile time from `CARGO_MANIFEST_DIR`, falling back to the
/// current directory when the crate is built outside the workspace.
#[must_use]
pub fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

/// Returns the `data/` directory path.
#[must_use]
pub fn data_dir() -> PathBuf {
    project_root().join("data")
}

/// Returns the accidents `DuckDB` path, honouring [`DB_PATH_ENV`].
#[must_use]
pub fn accidents_db_path() -> PathBuf {
    std::env::var(DB_PATH_ENV)
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map_or_else(|| data_dir().join("accidents.duckdb"), PathBuf::from)
}

/// Returns the read-only pool size, honouring [`POOL_SIZE_ENV`].
#[must_use]
pub fn pool_size() -> usize {
    std::env::var(POOL_SIZE_ENV)
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(DEFAULT_POOL_SIZE)
}

/// Ensures a directory exists, creating it if necessary.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.as_os_str().is_empty() && !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
