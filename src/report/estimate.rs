use super::{assemble, CostLine};
use crate::assets::ResourceGraph;
use crate::billing::cost;
use crate::config::Config;
use crate::error::{IsFatal, Result};
use crate::fingerprint::{billables, group, Billable, ResourceGroup};
use crate::pricing::{select_schedule, PriceCache, PriceQuery};
use crate::usage::{usage_for, UsageProfile};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

/// A resource group left out of the report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimateWarning {
    pub resource: String,
    pub count: u64,
    pub message: String,
}

/// Cost report for one graph
#[derive(Debug, Clone, Serialize)]
pub struct Estimate {
    pub currency: String,
    pub generated_at: DateTime<Utc>,
    pub lines: Vec<CostLine>,
    pub warnings: Vec<EstimateWarning>,
}

impl Estimate {
    pub fn total_max_cost(&self) -> f64 {
        self.lines.iter().map(|l| l.max_cost).sum()
    }

    pub fn total_projected_cost(&self) -> f64 {
        self.lines.iter().map(|l| l.projected_cost).sum()
    }
}

/// Price every billable group of `graph`
///
/// Groups without pricing data are skipped with a warning; any other error
/// aborts the estimate.
pub fn estimate(graph: &ResourceGraph, cache: &dyn PriceCache, config: &Config) -> Result<Estimate> {
    let groups = group(billables(graph))?;
    let rate = config.currency.conversion_rate;

    let mut lines = Vec::new();
    let mut warnings = Vec::new();

    for g in &groups {
        match price_group(g, cache, config, rate) {
            Ok(mut group_lines) => lines.append(&mut group_lines),
            Err(e) if !e.is_fatal() => {
                warn!("Omitting {} x {}: {}", g.count, g.representative.spec(), e);
                warnings.push(EstimateWarning {
                    resource: g.representative.name().to_string(),
                    count: g.count,
                    message: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        "Estimated {} cost lines from {} groups ({} omitted)",
        lines.len(),
        groups.len(),
        warnings.len()
    );

    Ok(Estimate {
        currency: config.currency.code.clone(),
        generated_at: Utc::now(),
        lines,
        warnings,
    })
}

fn price_group(
    g: &ResourceGroup,
    cache: &dyn PriceCache,
    config: &Config,
    rate: f64,
) -> Result<Vec<CostLine>> {
    let resource = &g.representative;
    let usage = usage_for(resource, &config.usage).scaled(g.count);

    let query = PriceQuery::for_resource(resource);
    let (rate_id, schedule) = select_schedule(cache, resource.name(), &query)?;
    debug!("Pricing {} with rate {}", g.fingerprint, rate_id);
    let mut lines = vec![assemble(
        g,
        &usage,
        &cost(&schedule, usage.ceiling, usage.projected, rate),
    )];

    if let Some(line) = license_line(g, resource, cache, rate, &usage)? {
        lines.push(line);
    }
    Ok(lines)
}

/// OS license surcharge; free operating systems have no rate
fn license_line(
    g: &ResourceGroup,
    resource: &Billable,
    cache: &dyn PriceCache,
    rate: f64,
    usage: &UsageProfile,
) -> Result<Option<CostLine>> {
    let Some(query) = PriceQuery::for_license(resource) else {
        return Ok(None);
    };
    let Some((rate_id, schedule)) = cache.schedules(&query)?.into_iter().next() else {
        debug!("No license pricing for {}", query);
        return Ok(None);
    };
    debug!("Pricing license for {} with rate {}", g.fingerprint, rate_id);

    let mut line = assemble(
        g,
        usage,
        &cost(&schedule, usage.ceiling, usage.projected, rate),
    );
    line.resource_type = "License".to_string();
    if let Billable::Instance(instance) = resource {
        line.spec = format!("{} on {}", instance.os, instance.machine_type);
    }
    Ok(Some(line))
}
