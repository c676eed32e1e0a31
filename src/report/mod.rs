//! Cost lines and estimates
//!
//! Turns resource groups and engine output into normalized cost lines, and
//! runs the full graph → estimate pipeline.

mod estimate;
mod export;

pub use estimate::{estimate, Estimate, EstimateWarning};
pub use export::CSV_HEADER;

use crate::billing::TieredCost;
use crate::fingerprint::ResourceGroup;
use crate::usage::UsageProfile;
use serde::{Deserialize, Serialize};

/// Usage amount with its unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quantity {
    pub amount: u64,
    pub unit: String,
}

/// One row of the cost report
///
/// Field order matches the report columns:
/// type, count, spec, max usage, max cost, projected usage, projected cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostLine {
    pub resource_type: String,
    pub count: u64,
    pub spec: String,
    pub max_usage: Quantity,
    pub max_cost: f64,
    pub projected_usage: Quantity,
    pub projected_cost: f64,
}

/// Combine a group, its (group-wide) usage and the engine output
pub fn assemble(group: &ResourceGroup, usage: &UsageProfile, cost: &TieredCost) -> CostLine {
    CostLine {
        resource_type: group.representative.type_label().to_string(),
        count: group.count,
        spec: group.representative.spec(),
        max_usage: Quantity {
            amount: usage.ceiling,
            unit: usage.unit.to_string(),
        },
        max_cost: cost.ceiling_cost,
        projected_usage: Quantity {
            amount: usage.projected,
            unit: usage.unit.to_string(),
        },
        projected_cost: cost.projected_cost,
    }
}
