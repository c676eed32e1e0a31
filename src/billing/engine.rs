use super::tiers::TierSchedule;
use serde::{Deserialize, Serialize};

/// Ceiling and projected cost for one usage pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TieredCost {
    pub ceiling_cost: f64,
    pub projected_cost: f64,
}

/// Remaining balance of one usage quantity while walking the tiers
struct Balance {
    remaining: u64,
    total: f64,
}

impl Balance {
    fn new(usage: u64) -> Self {
        Self {
            remaining: usage,
            total: 0.0,
        }
    }

    /// Consume up to `capacity` units at `unit_price`
    fn consume(&mut self, capacity: u64, unit_price: f64) {
        let used = self.remaining.min(capacity);
        if unit_price != 0.0 {
            self.total += used as f64 * unit_price;
        }
        self.remaining -= used;
    }

    /// Charge everything left at `unit_price`
    fn consume_all(&mut self, unit_price: f64) {
        self.consume(self.remaining, unit_price);
    }
}

/// Slab-bill a ceiling and a projected usage against `schedule`
///
/// Tiers are walked in ascending start order; a non-final tier holds
/// `start(i+1) - start(i)` units and the final tier is unbounded. Both
/// totals are divided by `conversion_rate` when it is not 1.0.
///
/// The schedule is trusted: gaps, overlaps or a first tier above 0 are
/// not detected here.
pub fn cost(
    schedule: &TierSchedule,
    ceiling_usage: u64,
    projected_usage: u64,
    conversion_rate: f64,
) -> TieredCost {
    let mut ceiling = Balance::new(ceiling_usage);
    let mut projected = Balance::new(projected_usage);

    let tiers = schedule.tiers();
    for (i, tier) in tiers.iter().enumerate() {
        if ceiling.remaining == 0 && projected.remaining == 0 {
            break;
        }
        match tiers.get(i + 1) {
            Some(next) => {
                let capacity = next
                    .start_usage_amount
                    .saturating_sub(tier.start_usage_amount);
                ceiling.consume(capacity, tier.unit_price);
                projected.consume(capacity, tier.unit_price);
            }
            None => {
                ceiling.consume_all(tier.unit_price);
                projected.consume_all(tier.unit_price);
            }
        }
    }

    let mut result = TieredCost {
        ceiling_cost: ceiling.total,
        projected_cost: projected.total,
    };
    if conversion_rate != 1.0 {
        result.ceiling_cost /= conversion_rate;
        result.projected_cost /= conversion_rate;
    }
    result
}
