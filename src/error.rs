//! Error types for costctl
//!
//! This module defines the error handling strategy for costctl. There are two
//! error types: `CostctlError` (main error enum) and `ConfigError` (configuration-specific).
//!
//! ## Error Handling Philosophy
//!
//! Library code uses `crate::error::Result<T>` which returns `CostctlError`.
//! CLI code uses `anyhow::Result<T>` for top-level error handling. The conversion
//! happens at the CLI boundary using `anyhow::Error::from` to preserve error chains.
//!
//! ## Fatal vs. Per-Resource Errors
//!
//! Errors implement `IsFatal` to indicate whether a run must stop. Anything
//! wrong with the asset inventory (malformed payloads, orphans, unresolved
//! links) is fatal: an estimate built on a partially-wrong graph is worse
//! than none. Pricing gaps (`MissingPricingData`, `InvalidTierSchedule`) only
//! drop the affected cost line and are reported as warnings.
//!
//! ## When to Use Which Error
//!
//! - `MalformedPayload`: the record payload is not a JSON object at all
//! - `UnexpectedShape`: a field exists but has the wrong JSON type
//! - `MissingField`: a field required by the resource kind is absent
//! - `OrphanedReference`: children left in a dangling pool after the build pass
//! - `UnresolvedLink`: an instance interface names a network/subnetwork that
//!   does not exist anywhere in the graph
//! - `MissingPricingData`: the price cache has no schedule for a resource shape

use thiserror::Error;

/// Main error type for costctl
#[derive(Error, Debug)]
pub enum CostctlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Malformed payload in record {record}: {reason}")]
    MalformedPayload { record: String, reason: String },

    #[error("Unexpected shape in record {record}: field '{field}' is not {expected}")]
    UnexpectedShape {
        record: String,
        field: String,
        expected: &'static str,
    },

    #[error("Missing field in {resource}: '{field}'")]
    MissingField { resource: String, field: String },

    #[error("Orphaned references ({}): {}", orphans.len(), orphans.join(", "))]
    OrphanedReference { orphans: Vec<String> },

    #[error("Unresolved link from instance {instance}: {reference}")]
    UnresolvedLink { instance: String, reference: String },

    #[error("No pricing data for {resource} ({query})")]
    MissingPricingData { resource: String, query: String },

    #[error("Invalid tier schedule {rate_id}: {reason}")]
    InvalidTierSchedule { rate_id: String, reason: String },

    #[error("Validation error: {field} - {reason}")]
    Validation { field: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Failed to parse config: {0}")]
    ParseError(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, CostctlError>;

/// Trait for determining whether an error must abort the whole run
///
/// The estimate pipeline uses this to decide between propagating an error
/// and recording it as a per-resource warning.
pub trait IsFatal {
    fn is_fatal(&self) -> bool;
}

impl IsFatal for CostctlError {
    fn is_fatal(&self) -> bool {
        !matches!(
            self,
            CostctlError::MissingPricingData { .. } | CostctlError::InvalidTierSchedule { .. }
        )
    }
}
