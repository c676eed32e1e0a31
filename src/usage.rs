//! Usage profiles
//!
//! Each billable resource has a ceiling usage (worst case for the month)
//! and a projected usage, both in the unit its price schedule is quoted in.

use crate::config::UsageConfig;
use crate::fingerprint::Billable;
use serde::Serialize;

/// Ceiling and projected usage in a common unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UsageProfile {
    pub ceiling: u64,
    pub projected: u64,
    pub unit: &'static str,
}

impl UsageProfile {
    /// Usage of `count` identical resources
    pub fn scaled(self, count: u64) -> Self {
        Self {
            ceiling: self.ceiling.saturating_mul(count),
            projected: self.projected.saturating_mul(count),
            unit: self.unit,
        }
    }
}

/// Monthly usage of one resource
pub fn usage_for(resource: &Billable, config: &UsageConfig) -> UsageProfile {
    match resource {
        Billable::Instance(_) => UsageProfile {
            ceiling: config.ceiling_hours,
            projected: config.projected_hours,
            unit: "h",
        },
        Billable::Disk(disk) => UsageProfile {
            ceiling: disk.size_gb,
            projected: disk.size_gb,
            unit: "GiBy.mo",
        },
        Billable::Image(image) => UsageProfile {
            ceiling: image.size_gb,
            projected: image.size_gb,
            unit: "GiBy.mo",
        },
        Billable::Egress(_) => UsageProfile {
            ceiling: config.egress_ceiling_gib,
            projected: config.egress_projected_gib,
            unit: "GiBy",
        },
    }
}
