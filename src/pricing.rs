//! Price cache interface
//!
//! The estimator asks a [`PriceCache`] for candidate tier schedules by
//! billing service, resource family, regions and a shape discriminator.
//! [`StaticPriceCache`] serves them from a price file on disk.

use crate::billing::{Tier, TierSchedule};
use crate::error::{CostctlError, Result};
use crate::fingerprint::Billable;
use crate::validation::validate_tier_schedule;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

pub const COMPUTE_SERVICE: &str = "Compute Engine";

/// Lookup key for tier schedules
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceQuery {
    pub service: String,
    pub family: String,
    pub regions: Vec<String>,
    pub discriminator: String,
}

impl fmt::Display for PriceQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} '{}' in {}",
            self.service,
            self.family,
            self.discriminator,
            self.regions.join(",")
        )
    }
}

impl PriceQuery {
    fn compute(family: &str, regions: Vec<String>, discriminator: String) -> Self {
        Self {
            service: COMPUTE_SERVICE.to_string(),
            family: family.to_string(),
            regions,
            discriminator,
        }
    }

    /// Query for a billable resource's main cost line
    pub fn for_resource(resource: &Billable) -> Self {
        let regions = resource.regions();
        match resource {
            Billable::Instance(i) => Self::compute(
                "Compute",
                regions,
                format!("{} {}", i.machine_type, i.scheduling),
            ),
            Billable::Disk(d) if d.regional => {
                Self::compute("Storage", regions, format!("regional {}", d.disk_type))
            }
            Billable::Disk(d) => Self::compute("Storage", regions, d.disk_type.clone()),
            Billable::Image(_) => Self::compute("Storage", regions, "image".to_string()),
            Billable::Egress(s) => {
                Self::compute("Network", regions, format!("egress {}", s.network_tier))
            }
        }
    }

    /// Query for an instance's OS license surcharge
    pub fn for_license(resource: &Billable) -> Option<Self> {
        match resource {
            Billable::Instance(i) => Some(Self::compute("License", resource.regions(), i.os.clone())),
            _ => None,
        }
    }
}

/// Source of tier schedules, keyed by rate identifier
pub trait PriceCache {
    fn schedules(&self, query: &PriceQuery) -> Result<BTreeMap<String, TierSchedule>>;
}

/// Pick the schedule to bill with: the first candidate in rate-id order
pub fn select_schedule(
    cache: &dyn PriceCache,
    resource: &str,
    query: &PriceQuery,
) -> Result<(String, TierSchedule)> {
    let candidates = cache.schedules(query)?;
    if candidates.len() > 1 {
        debug!(
            "{} candidate schedules for {}, using the first",
            candidates.len(),
            query
        );
    }
    candidates
        .into_iter()
        .next()
        .ok_or_else(|| CostctlError::MissingPricingData {
            resource: resource.to_string(),
            query: query.to_string(),
        })
}

/// One rate of a price file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceEntry {
    pub rate_id: String,
    #[serde(default = "default_service")]
    pub service: String,
    pub family: String,
    /// Region name, or `global` to match any region
    pub region: String,
    pub discriminator: String,
    pub tiers: Vec<Tier>,
}

fn default_service() -> String {
    COMPUTE_SERVICE.to_string()
}

impl PriceEntry {
    fn matches(&self, query: &PriceQuery) -> bool {
        self.service == query.service
            && self.family == query.family
            && self.discriminator == query.discriminator
            && (self.region == "global" || query.regions.iter().any(|r| *r == self.region))
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PriceFile {
    #[serde(default)]
    rates: Vec<PriceEntry>,
}

/// In-memory price cache loaded from a TOML or JSON price file
#[derive(Debug, Default)]
pub struct StaticPriceCache {
    entries: Vec<(PriceEntry, TierSchedule)>,
}

impl StaticPriceCache {
    /// Build from entries, dropping schedules that fail validation
    pub fn from_entries(entries: Vec<PriceEntry>) -> Self {
        let entries = entries
            .into_iter()
            .filter_map(|entry| {
                let schedule = TierSchedule::new(entry.tiers.clone());
                match validate_tier_schedule(&entry.rate_id, &schedule) {
                    Ok(()) => Some((entry, schedule)),
                    Err(e) => {
                        warn!("Dropping price entry: {}", e);
                        None
                    }
                }
            })
            .collect();
        Self { entries }
    }

    /// Parse price file content; `.json` paths are JSON, anything else TOML
    pub fn parse(content: &str, json: bool) -> Result<Self> {
        let file: PriceFile = if json {
            serde_json::from_str(content)?
        } else {
            toml::from_str(content).map_err(|e| CostctlError::Validation {
                field: "price file".to_string(),
                reason: e.to_string(),
            })?
        };
        Ok(Self::from_entries(file.rates))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CostctlError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read prices {}: {}", path.display(), e),
            ))
        })?;
        let json = path.extension().is_some_and(|ext| ext == "json");
        let cache = Self::parse(&content, json)?;
        debug!("Loaded {} rates from {}", cache.len(), path.display());
        Ok(cache)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PriceCache for StaticPriceCache {
    fn schedules(&self, query: &PriceQuery) -> Result<BTreeMap<String, TierSchedule>> {
        Ok(self
            .entries
            .iter()
            .filter(|(entry, _)| entry.matches(query))
            .map(|(entry, schedule)| (entry.rate_id.clone(), schedule.clone()))
            .collect())
    }
}
