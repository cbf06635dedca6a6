#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Accident risk query engine.
//!
//! Each public function in [`tools`] corresponds to a tool the calling
//! agent can invoke. Statistics come from a [`source::StatsSource`], which
//! reads either the precomputed summary tables or the raw `accidents`
//! table; [`classify`] and [`scoring`] turn the numbers into risk levels,
//! and [`assemble`] shapes the final documents. [`dispatch`] is the
//! name-based entry point used by transports.

pub mod aggregate;
pub mod assemble;
pub mod classify;
pub mod dispatch;
pub mod filters;
pub mod raw;
pub mod records;
pub mod scoring;
pub mod source;
pub mod store;
pub mod tools;

#[cfg(test)]
pub(crate) mod fixture;

use accident_risk_database::DbError;
use accident_risk_spatial::SpatialError;
use thiserror::Error;

pub use dispatch::{execute_tool, render};
pub use store::AccidentStore;

/// Errors that can occur during analytics operations.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// Database query failed.
    #[error("Database error: {0}")]
    Database(#[from] duckdb::Error),

    /// The store could not be opened or read.
    #[error("Store unavailable: {0}")]
    Store(#[from] DbError),

    /// A result could not be converted to JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The caller supplied an argument the tools cannot act on.
    #[error("{message}")]
    InvalidArgument {
        /// Description of what went wrong.
        message: String,
        /// Accepted values, when the argument is drawn from a fixed set.
        valid_options: Option<Vec<String>>,
    },
}

impl AnalyticsError {
    /// Creates an [`AnalyticsError::InvalidArgument`] with no option list.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
            valid_options: None,
        }
    }

    /// Whether this error must abort the call rather than be reported
    /// in-band as an error document.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::InvalidArgument { .. })
    }
}

impl From<SpatialError> for AnalyticsError {
    fn from(e: SpatialError) -> Self {
        Self::invalid_argument(e.to_string())
    }
}
