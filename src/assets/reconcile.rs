//! Final consistency pass over a finished build

use super::builder::AssetBuilder;
use super::types::*;
use crate::error::{CostctlError, Result};
use tracing::info;

impl AssetBuilder {
    /// Validate the dangling pools, link instances to subnetworks and
    /// hand off the canonical graph.
    pub fn finish(mut self) -> Result<ResourceGraph> {
        self.check_orphans()?;
        self.link_interfaces()?;

        let mut graph = ResourceGraph {
            instances: self.instances,
            disks: self.disks.into_values().collect(),
            images: self.images,
            networks: self.networks.into_values().collect(),
            service_accounts: self.service_accounts.into_values().collect(),
            services: self.services,
        };
        canonicalize(&mut graph)?;

        info!(
            "Reconciled {} instances, {} disks, {} networks, {} service accounts ({} records skipped)",
            graph.instances.len(),
            graph.disks.len(),
            graph.networks.len(),
            graph.service_accounts.len(),
            self.skipped
        );
        Ok(graph)
    }

    fn check_orphans(&mut self) -> Result<()> {
        let pools = &mut self.dangling;
        if pools.subnetworks.is_empty()
            && pools.firewalls.is_empty()
            && pools.routes.is_empty()
            && pools.images.is_empty()
            && pools.keys.is_empty()
        {
            return Ok(());
        }

        let mut orphans = Vec::new();
        orphans.extend(
            pools
                .subnetworks
                .drain()
                .map(|(p, c)| format!("subnetwork {} (network {})", c.name, p)),
        );
        orphans.extend(
            pools
                .firewalls
                .drain()
                .map(|(p, c)| format!("firewall {} (network {})", c.name, p)),
        );
        orphans.extend(
            pools
                .routes
                .drain()
                .map(|(p, c)| format!("route {} (network {})", c.name, p)),
        );
        orphans.extend(
            pools
                .images
                .drain()
                .map(|(p, c)| format!("image {} (disk {})", c.name, p)),
        );
        orphans.extend(
            pools
                .keys
                .drain()
                .map(|(p, c)| format!("key {} (service account {})", c.name, p)),
        );
        Err(CostctlError::OrphanedReference { orphans })
    }

    /// Resolve every interface and raise the subnetwork's tier
    fn link_interfaces(&mut self) -> Result<()> {
        let default_tier = self.options.default_network_tier;
        for instance in &self.instances {
            for iface in &instance.interfaces {
                let network = self.networks.get_mut(&iface.network).ok_or_else(|| {
                    CostctlError::UnresolvedLink {
                        instance: instance.name.clone(),
                        reference: format!("network {}", iface.network),
                    }
                })?;
                let subnetwork = network
                    .subnetworks
                    .iter_mut()
                    .find(|s| s.name == iface.subnetwork)
                    .ok_or_else(|| CostctlError::UnresolvedLink {
                        instance: instance.name.clone(),
                        reference: format!(
                            "subnetwork {} in network {}",
                            iface.subnetwork, iface.network
                        ),
                    })?;
                let tier = iface.tier.unwrap_or(default_tier);
                subnetwork.network_tier = subnetwork.network_tier.max(tier);
            }
        }
        Ok(())
    }
}

/// Order entities and children by name, rejecting duplicate identities
fn canonicalize(graph: &mut ResourceGraph) -> Result<()> {
    graph.instances.sort_by(|a, b| a.name.cmp(&b.name));
    ensure_unique("instance", graph.instances.iter().map(|i| &i.name))?;
    graph.images.sort_by(|a, b| a.name.cmp(&b.name));
    graph.services.sort_by(|a, b| a.name.cmp(&b.name));
    ensure_unique("service", graph.services.iter().map(|s| &s.name))?;

    for disk in &mut graph.disks {
        disk.images.sort_by(|a, b| a.name.cmp(&b.name));
    }
    let mut images: Vec<&String> = graph.all_images().map(|i| &i.name).collect();
    images.sort();
    ensure_unique("image", images.into_iter())?;

    for network in &mut graph.networks {
        network.subnetworks.sort_by(|a, b| a.name.cmp(&b.name));
        ensure_unique("subnetwork", network.subnetworks.iter().map(|s| &s.name))?;
        network.firewalls.sort_by(|a, b| a.name.cmp(&b.name));
        ensure_unique("firewall", network.firewalls.iter().map(|f| &f.name))?;
        network.routes.sort_by(|a, b| a.name.cmp(&b.name));
        ensure_unique("route", network.routes.iter().map(|r| &r.name))?;
    }
    for account in &mut graph.service_accounts {
        account.keys.sort_by(|a, b| a.name.cmp(&b.name));
        ensure_unique("service account key", account.keys.iter().map(|k| &k.name))?;
    }
    Ok(())
}

/// Names must arrive sorted
fn ensure_unique<'a>(kind: &str, mut names: impl Iterator<Item = &'a String>) -> Result<()> {
    let Some(mut previous) = names.next() else {
        return Ok(());
    };
    for name in names {
        if name == previous {
            return Err(CostctlError::Validation {
                field: kind.to_string(),
                reason: format!("duplicate record {}", name),
            });
        }
        previous = name;
    }
    Ok(())
}
