//! Fingerprinting and grouping of billable resources
//!
//! Two resources with equal fingerprints are economically equivalent: they
//! bill against the same price schedule with the same per-unit usage. Groups
//! keep the first resource seen as their representative.

use crate::assets::{Disk, Image, Instance, ResourceGraph, Subnetwork};
use crate::error::{CostctlError, Result};
use crate::utils::short_name;
use serde::Serialize;
use std::collections::HashMap;

const SEPARATOR: &str = "|";

/// A graph entity that produces a cost line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "resource")]
pub enum Billable {
    Instance(Instance),
    Disk(Disk),
    Image(Image),
    /// Egress through a subnetwork at its derived tier
    Egress(Subnetwork),
}

impl Billable {
    pub fn name(&self) -> &str {
        match self {
            Billable::Instance(i) => &i.name,
            Billable::Disk(d) => &d.name,
            Billable::Image(i) => &i.name,
            Billable::Egress(s) => &s.name,
        }
    }

    /// Resource type column of the cost report
    pub fn type_label(&self) -> &'static str {
        match self {
            Billable::Instance(_) => "Instance",
            Billable::Disk(d) if d.regional => "RegionalDisk",
            Billable::Disk(_) => "Disk",
            Billable::Image(_) => "Image",
            Billable::Egress(_) => "Egress",
        }
    }

    /// Regions used for price lookup
    pub fn regions(&self) -> Vec<String> {
        match self {
            Billable::Instance(i) => i.location.regions(),
            Billable::Disk(d) => d.location.regions(),
            Billable::Image(i) => i.location.regions(),
            Billable::Egress(s) => vec![s.region.clone()],
        }
    }

    /// Human-readable shape, used as the report's spec column
    pub fn spec(&self) -> String {
        let region = self.regions().join(",");
        match self {
            Billable::Instance(i) => {
                format!("{} {} {} ({})", i.machine_type, i.scheduling, i.os, region)
            }
            Billable::Disk(d) => format!("{} {}GB ({})", d.disk_type, d.size_gb, region),
            Billable::Image(i) => format!("{}GB ({})", i.size_gb, region),
            Billable::Egress(s) => {
                format!("{} {} ({})", short_name(&s.name), s.network_tier, region)
            }
        }
    }

    /// Fields that decide economic equivalence, in fixed order
    fn fingerprint_fields(&self) -> Vec<(&'static str, String)> {
        let region = self.regions().join(",");
        match self {
            Billable::Instance(i) => vec![
                ("region", region),
                ("machineType", i.machine_type.clone()),
                ("scheduling", i.scheduling.to_string()),
                ("os", i.os.clone()),
            ],
            Billable::Disk(d) => vec![
                ("region", region),
                ("type", d.disk_type.clone()),
                ("sizeGb", d.size_gb.to_string()),
            ],
            Billable::Image(i) => vec![
                ("storageLocations", region),
                ("diskSizeGb", i.size_gb.to_string()),
            ],
            Billable::Egress(s) => vec![
                ("region", region),
                ("networkTier", s.network_tier.to_string()),
            ],
        }
    }
}

/// Identity string for billing equivalence
pub fn fingerprint(resource: &Billable) -> Result<String> {
    let mut parts = vec![resource.type_label().to_string()];
    for (field, value) in resource.fingerprint_fields() {
        if value.is_empty() {
            return Err(CostctlError::MissingField {
                resource: resource.name().to_string(),
                field: field.to_string(),
            });
        }
        parts.push(value);
    }
    Ok(parts.join(SEPARATOR))
}

/// Billable entities in discovery order
pub fn billables(graph: &ResourceGraph) -> Vec<Billable> {
    let mut resources: Vec<Billable> = Vec::new();
    resources.extend(graph.instances.iter().cloned().map(Billable::Instance));
    resources.extend(graph.disks.iter().map(|d| {
        Billable::Disk(Disk {
            images: Vec::new(),
            ..d.clone()
        })
    }));
    resources.extend(graph.all_images().cloned().map(Billable::Image));
    resources.extend(
        graph
            .networks
            .iter()
            .flat_map(|n| n.subnetworks.iter().cloned())
            .map(Billable::Egress),
    );
    resources
}

/// Resources merged under one fingerprint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceGroup {
    pub fingerprint: String,
    pub representative: Billable,
    pub count: u64,
}

/// Collapse resources with equal fingerprints into counted groups
///
/// Groups appear in order of first occurrence.
pub fn group(resources: impl IntoIterator<Item = Billable>) -> Result<Vec<ResourceGroup>> {
    let mut groups: Vec<ResourceGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for resource in resources {
        let key = fingerprint(&resource)?;
        match index.get(&key) {
            Some(&i) => groups[i].count += 1,
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(ResourceGroup {
                    fingerprint: key,
                    representative: resource,
                    count: 1,
                });
            }
        }
    }
    Ok(groups)
}
