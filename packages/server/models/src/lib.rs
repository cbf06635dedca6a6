#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API response types for the accident risk server.
//!
//! Tool results themselves are the documents defined in
//! `accident_risk_analytics_models`; the types here only cover the
//! server's own envelope endpoints.

use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
    /// How statistics are being read (`aggregate` or `raw`).
    pub strategy: String,
}

/// Error body for failures outside a tool's own error document.
#[derive(Debug, Serialize)]
pub struct ApiError {
    /// What went wrong.
    pub error: String,
}
