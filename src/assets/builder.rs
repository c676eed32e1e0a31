//! Single-pass asset reconciliation
//!
//! Records are visited exactly once, in arrival order. A child whose parent
//! has already been seen is attached directly; otherwise it is parked in a
//! dangling pool keyed by the parent's identity. Creating a parent drains
//! the matching pool entries, so arrival order never changes the result.

use super::types::*;
use crate::attributes::{os_from_license, Attributes};
use crate::config::Config;
use crate::error::{CostctlError, Result};
use crate::records::{AssetKind, RawRecord};
use crate::utils::{resource_path, short_name};
use std::collections::BTreeMap;
use tracing::debug;

/// Project-level defaults applied while building
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub default_network_tier: NetworkTier,
    pub default_scheduling: SchedulingClass,
    pub fallback_os: String,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for BuildOptions {
    fn from(config: &Config) -> Self {
        Self {
            default_network_tier: config.project.default_network_tier,
            default_scheduling: config.project.default_scheduling,
            fallback_os: config.project.fallback_os.clone(),
        }
    }
}

/// Children waiting for a parent, keyed by parent identity
#[derive(Debug)]
pub(super) struct Dangling<T> {
    by_parent: BTreeMap<String, Vec<T>>,
}

impl<T> Default for Dangling<T> {
    fn default() -> Self {
        Self {
            by_parent: BTreeMap::new(),
        }
    }
}

impl<T> Dangling<T> {
    pub(super) fn park(&mut self, parent: String, child: T) {
        self.by_parent.entry(parent).or_default().push(child);
    }

    pub(super) fn take(&mut self, parent: &str) -> Vec<T> {
        self.by_parent.remove(parent).unwrap_or_default()
    }

    pub(super) fn is_empty(&self) -> bool {
        self.by_parent.is_empty()
    }

    /// Drain remaining entries as `(parent, child)` pairs
    pub(super) fn drain(&mut self) -> impl Iterator<Item = (String, T)> + '_ {
        std::mem::take(&mut self.by_parent)
            .into_iter()
            .flat_map(|(parent, children)| {
                children.into_iter().map(move |c| (parent.clone(), c))
            })
    }
}

/// The dangling pools of one build
#[derive(Debug, Default)]
pub(super) struct DanglingPools {
    pub(super) subnetworks: Dangling<Subnetwork>,
    pub(super) firewalls: Dangling<Firewall>,
    pub(super) routes: Dangling<Route>,
    pub(super) images: Dangling<Image>,
    pub(super) keys: Dangling<ServiceAccountKey>,
}

/// Builder-owned state for one reconciliation run
#[derive(Debug)]
pub struct AssetBuilder {
    pub(super) options: BuildOptions,
    pub(super) instances: Vec<Instance>,
    pub(super) disks: BTreeMap<String, Disk>,
    pub(super) images: Vec<Image>,
    pub(super) networks: BTreeMap<String, Network>,
    pub(super) service_accounts: BTreeMap<String, ServiceAccount>,
    pub(super) services: Vec<Service>,
    pub(super) dangling: DanglingPools,
    pub(super) skipped: usize,
}

impl AssetBuilder {
    pub fn new(options: BuildOptions) -> Self {
        Self {
            options,
            instances: Vec::new(),
            disks: BTreeMap::new(),
            images: Vec::new(),
            networks: BTreeMap::new(),
            service_accounts: BTreeMap::new(),
            services: Vec::new(),
            dangling: DanglingPools::default(),
            skipped: 0,
        }
    }

    /// Dispatch one record to its kind's handler
    pub fn add(&mut self, record: &RawRecord) -> Result<()> {
        if record.asset_type().is_empty() {
            self.skipped += 1;
            return Ok(());
        }
        let Some(kind) = record.kind() else {
            debug!("Skipping unsupported asset type {}", record.asset_type());
            self.skipped += 1;
            return Ok(());
        };

        let attrs = record.attributes()?;
        let name = resource_path(record.name()).to_string();
        debug!("Adding {:?} {}", kind, name);

        match kind {
            AssetKind::Instance => self.add_instance(name, attrs),
            AssetKind::Disk => self.add_disk(name, attrs, false),
            AssetKind::RegionalDisk => self.add_disk(name, attrs, true),
            AssetKind::Image => self.add_image(name, attrs),
            AssetKind::Network => self.add_network(name),
            AssetKind::Subnetwork => self.add_subnetwork(name, attrs),
            AssetKind::Firewall => self.add_firewall(name, attrs),
            AssetKind::Route => self.add_route(name, attrs),
            AssetKind::ServiceAccount => self.add_service_account(name, attrs),
            AssetKind::ServiceAccountKey => self.add_service_account_key(name, attrs),
            AssetKind::Service => self.add_service(name, attrs),
        }
    }

    fn duplicate(kind: &str, name: &str) -> CostctlError {
        CostctlError::Validation {
            field: kind.to_string(),
            reason: format!("duplicate record {}", name),
        }
    }

    fn add_instance(&mut self, name: String, attrs: &Attributes) -> Result<()> {
        let location = attrs.require_location()?;
        let machine_type = short_name(attrs.require_str("machineType")?).to_string();
        let preemptible = attrs.bool("scheduling.preemptible")?;
        let scheduling = attrs
            .scheduling_class()?
            .unwrap_or(self.options.default_scheduling);
        let license = attrs.first_disk_license()?.map(str::to_string);
        let os = os_from_license(license.as_deref(), &self.options.fallback_os);

        let mut interfaces = Vec::new();
        let count = attrs.array("networkInterfaces")?.map_or(0, Vec::len);
        for i in 0..count {
            let network = attrs.require_str(&format!("networkInterfaces.{}.network", i))?;
            let subnetwork = attrs.require_str(&format!("networkInterfaces.{}.subnetwork", i))?;
            let tier_path = format!("networkInterfaces.{}.accessConfigs.0.networkTier", i);
            let tier = match attrs.str(&tier_path)? {
                Some(raw) => Some(NetworkTier::parse(raw).ok_or_else(|| {
                    CostctlError::UnexpectedShape {
                        record: attrs.record().to_string(),
                        field: tier_path.clone(),
                        expected: "STANDARD or PREMIUM",
                    }
                })?),
                None => None,
            };
            interfaces.push(NetworkInterface {
                network: resource_path(network).to_string(),
                subnetwork: resource_path(subnetwork).to_string(),
                tier,
            });
        }

        self.instances.push(Instance {
            name,
            location,
            machine_type,
            preemptible,
            scheduling,
            license,
            os,
            interfaces,
        });
        Ok(())
    }

    fn add_disk(&mut self, name: String, attrs: &Attributes, regional: bool) -> Result<()> {
        if self.disks.contains_key(&name) {
            return Err(Self::duplicate("disk", &name));
        }
        let size_gb = attrs.u64("sizeGb")?.ok_or_else(|| CostctlError::MissingField {
            resource: name.clone(),
            field: "sizeGb".to_string(),
        })?;
        let disk = Disk {
            location: attrs.require_location()?,
            regional,
            size_gb,
            disk_type: short_name(attrs.require_str("type")?).to_string(),
            source_image: attrs.str("sourceImage")?.map(|s| resource_path(s).to_string()),
            licenses: attrs.str_list("licenses")?,
            images: self.dangling.images.take(&name),
            name: name.clone(),
        };
        self.disks.insert(name, disk);
        Ok(())
    }

    fn add_image(&mut self, name: String, attrs: &Attributes) -> Result<()> {
        let size_gb = attrs.u64("diskSizeGb")?.ok_or_else(|| CostctlError::MissingField {
            resource: name.clone(),
            field: "diskSizeGb".to_string(),
        })?;
        let image = Image {
            location: attrs.require_location()?,
            size_gb,
            licenses: attrs.str_list("licenses")?,
            name,
        };

        match attrs.str("sourceDisk")?.map(resource_path) {
            Some(disk_name) => match self.disks.get_mut(disk_name) {
                Some(disk) => disk.images.push(image),
                None => self.dangling.images.park(disk_name.to_string(), image),
            },
            None => self.images.push(image),
        }
        Ok(())
    }

    fn add_network(&mut self, name: String) -> Result<()> {
        if self.networks.contains_key(&name) {
            return Err(Self::duplicate("network", &name));
        }
        let network = Network {
            subnetworks: self.dangling.subnetworks.take(&name),
            firewalls: self.dangling.firewalls.take(&name),
            routes: self.dangling.routes.take(&name),
            name: name.clone(),
        };
        self.networks.insert(name, network);
        Ok(())
    }

    fn parent_network(attrs: &Attributes) -> Result<String> {
        Ok(resource_path(attrs.require_str("network")?).to_string())
    }

    fn add_subnetwork(&mut self, name: String, attrs: &Attributes) -> Result<()> {
        let parent = Self::parent_network(attrs)?;
        let subnetwork = Subnetwork {
            region: short_name(attrs.require_str("region")?).to_string(),
            ip_cidr_range: attrs.str("ipCidrRange")?.unwrap_or_default().to_string(),
            network_tier: self.options.default_network_tier,
            name,
        };
        match self.networks.get_mut(&parent) {
            Some(network) => network.subnetworks.push(subnetwork),
            None => self.dangling.subnetworks.park(parent, subnetwork),
        }
        Ok(())
    }

    fn add_firewall(&mut self, name: String, attrs: &Attributes) -> Result<()> {
        let parent = Self::parent_network(attrs)?;
        let firewall = Firewall {
            direction: attrs.str("direction")?.unwrap_or("INGRESS").to_string(),
            disabled: attrs.bool("disabled")?.unwrap_or(false),
            name,
        };
        match self.networks.get_mut(&parent) {
            Some(network) => network.firewalls.push(firewall),
            None => self.dangling.firewalls.park(parent, firewall),
        }
        Ok(())
    }

    fn add_route(&mut self, name: String, attrs: &Attributes) -> Result<()> {
        let parent = Self::parent_network(attrs)?;
        let route = Route {
            dest_range: attrs.str("destRange")?.unwrap_or_default().to_string(),
            priority: attrs.u64("priority")?.unwrap_or(1000),
            name,
        };
        match self.networks.get_mut(&parent) {
            Some(network) => network.routes.push(route),
            None => self.dangling.routes.park(parent, route),
        }
        Ok(())
    }

    fn add_service_account(&mut self, name: String, attrs: &Attributes) -> Result<()> {
        if self.service_accounts.contains_key(&name) {
            return Err(Self::duplicate("service account", &name));
        }
        let account = ServiceAccount {
            email: attrs
                .str("email")?
                .unwrap_or_else(|| short_name(&name))
                .to_string(),
            keys: self.dangling.keys.take(&name),
            name: name.clone(),
        };
        self.service_accounts.insert(name, account);
        Ok(())
    }

    fn add_service_account_key(&mut self, name: String, attrs: &Attributes) -> Result<()> {
        let parent = match name.rfind("/keys/") {
            Some(idx) => name[..idx].to_string(),
            None => {
                return Err(CostctlError::Validation {
                    field: "service account key".to_string(),
                    reason: format!("{} does not name a parent account", name),
                })
            }
        };
        let key = ServiceAccountKey {
            key_type: attrs.str("keyType")?.unwrap_or("USER_MANAGED").to_string(),
            name,
        };
        match self.service_accounts.get_mut(&parent) {
            Some(account) => account.keys.push(key),
            None => self.dangling.keys.park(parent, key),
        }
        Ok(())
    }

    fn add_service(&mut self, name: String, attrs: &Attributes) -> Result<()> {
        let enabled = attrs
            .str("state")?
            .map(|s| s.eq_ignore_ascii_case("ENABLED"))
            .unwrap_or(false);
        self.services.push(Service { name, enabled });
        Ok(())
    }

    /// Number of records skipped for having an empty or unsupported type
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}
