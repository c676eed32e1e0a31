//! costctl library
//!
//! This library provides the core functionality for the costctl CLI:
//! reconciling asset inventory records into a resource graph and pricing
//! that graph against tiered price schedules.

pub mod assets;
pub mod attributes;
pub mod billing;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod pricing;
pub mod records;
pub mod report;
pub mod usage;
pub mod utils;
pub mod validation;

// Re-export commonly used types
pub use assets::{build, BuildOptions, ResourceGraph};
pub use error::{CostctlError, Result};
pub use records::RawRecord;
pub use report::{estimate, CostLine, Estimate};
