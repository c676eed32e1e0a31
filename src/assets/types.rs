//! Type definitions for the resource graph
//!
//! Every entity is identified by its normalized `projects/...` path. Children
//! are owned by their parent; the graph owns the top-level entities.

use crate::attributes::Location;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Network service tier
///
/// Ordered so that `max` picks the dominating tier: `Premium > Standard`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NetworkTier {
    Standard,
    Premium,
}

impl NetworkTier {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "STANDARD" => Some(NetworkTier::Standard),
            "PREMIUM" => Some(NetworkTier::Premium),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NetworkTier::Standard => "STANDARD",
            NetworkTier::Premium => "PREMIUM",
        }
    }
}

impl fmt::Display for NetworkTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Instance scheduling / commitment class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SchedulingClass {
    OnDemand,
    Preemptible,
    Commit1Yr,
    Commit3Yr,
}

impl SchedulingClass {
    pub fn as_str(self) -> &'static str {
        match self {
            SchedulingClass::OnDemand => "OnDemand",
            SchedulingClass::Preemptible => "Preemptible",
            SchedulingClass::Commit1Yr => "Commit1Yr",
            SchedulingClass::Commit3Yr => "Commit3Yr",
        }
    }
}

impl fmt::Display for SchedulingClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Network interface attached to an instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInterface {
    pub network: String,
    pub subnetwork: String,
    /// Explicit tier from the access config, if any
    pub tier: Option<NetworkTier>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub name: String,
    pub location: Location,
    pub machine_type: String,
    /// Raw `scheduling.preemptible` value
    pub preemptible: Option<bool>,
    pub scheduling: SchedulingClass,
    /// First license of the boot disk
    pub license: Option<String>,
    pub os: String,
    pub interfaces: Vec<NetworkInterface>,
}

/// Zonal or regional persistent disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disk {
    pub name: String,
    pub location: Location,
    pub regional: bool,
    pub size_gb: u64,
    pub disk_type: String,
    pub source_image: Option<String>,
    pub licenses: Vec<String>,
    /// Images created from this disk
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub name: String,
    pub location: Location,
    pub size_gb: u64,
    pub licenses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    pub name: String,
    pub subnetworks: Vec<Subnetwork>,
    pub firewalls: Vec<Firewall>,
    pub routes: Vec<Route>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subnetwork {
    pub name: String,
    pub region: String,
    pub ip_cidr_range: String,
    /// Highest tier used by any interface on this subnetwork
    pub network_tier: NetworkTier,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Firewall {
    pub name: String,
    pub direction: String,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub name: String,
    pub dest_range: String,
    pub priority: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceAccount {
    pub name: String,
    pub email: String,
    pub keys: Vec<ServiceAccountKey>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceAccountKey {
    pub name: String,
    pub key_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    pub enabled: bool,
}

/// Fully linked resource graph
///
/// Entities and children are kept ordered by name, so two graphs built from
/// permutations of the same records compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceGraph {
    pub instances: Vec<Instance>,
    pub disks: Vec<Disk>,
    /// Images without a source disk in the project
    pub images: Vec<Image>,
    pub networks: Vec<Network>,
    pub service_accounts: Vec<ServiceAccount>,
    pub services: Vec<Service>,
}

impl ResourceGraph {
    pub fn network(&self, name: &str) -> Option<&Network> {
        self.networks.iter().find(|n| n.name == name)
    }

    pub fn subnetwork(&self, network: &str, name: &str) -> Option<&Subnetwork> {
        self.network(network)?
            .subnetworks
            .iter()
            .find(|s| s.name == name)
    }

    /// All images, attached and standalone
    pub fn all_images(&self) -> impl Iterator<Item = &Image> {
        self.disks
            .iter()
            .flat_map(|d| d.images.iter())
            .chain(self.images.iter())
    }

    /// Entity counts per kind, for summaries
    pub fn counts(&self) -> Vec<(&'static str, usize)> {
        let sum = |f: fn(&Network) -> usize| self.networks.iter().map(f).sum::<usize>();
        vec![
            ("Instance", self.instances.len()),
            ("Disk", self.disks.iter().filter(|d| !d.regional).count()),
            ("RegionalDisk", self.disks.iter().filter(|d| d.regional).count()),
            ("Image", self.all_images().count()),
            ("Network", self.networks.len()),
            ("Subnetwork", sum(|n| n.subnetworks.len())),
            ("Firewall", sum(|n| n.firewalls.len())),
            ("Route", sum(|n| n.routes.len())),
            ("ServiceAccount", self.service_accounts.len()),
            (
                "ServiceAccountKey",
                self.service_accounts.iter().map(|s| s.keys.len()).sum(),
            ),
            ("Service", self.services.len()),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.counts().iter().all(|(_, n)| *n == 0)
    }
}
