use serde::{Deserialize, Serialize};

/// One slab of a tier schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    /// Usage amount at which this tier begins
    pub start_usage_amount: u64,
    /// Price per unit in `currency`
    pub unit_price: f64,
    pub currency: String,
}

impl Tier {
    pub fn new(start_usage_amount: u64, unit_price: f64, currency: impl Into<String>) -> Self {
        Self {
            start_usage_amount,
            unit_price,
            currency: currency.into(),
        }
    }
}

/// Tiers ordered by ascending start amount
///
/// Expected to be contiguous with the first tier at 0; see
/// `validation::validate_tier_schedule`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Tier>", into = "Vec<Tier>")]
pub struct TierSchedule {
    tiers: Vec<Tier>,
}

impl TierSchedule {
    pub fn new(mut tiers: Vec<Tier>) -> Self {
        tiers.sort_by_key(|t| t.start_usage_amount);
        Self { tiers }
    }

    /// Single unbounded tier
    pub fn flat(unit_price: f64, currency: impl Into<String>) -> Self {
        Self::new(vec![Tier::new(0, unit_price, currency)])
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Currency of the first tier
    pub fn currency(&self) -> Option<&str> {
        self.tiers.first().map(|t| t.currency.as_str())
    }
}

impl From<Vec<Tier>> for TierSchedule {
    fn from(tiers: Vec<Tier>) -> Self {
        Self::new(tiers)
    }
}

impl From<TierSchedule> for Vec<Tier> {
    fn from(schedule: TierSchedule) -> Self {
        schedule.tiers
    }
}
