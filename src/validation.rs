//! Input validation utilities
//!
//! Provides validation functions for configuration values and price data to
//! prevent invalid inputs from turning into silently wrong estimates.

use crate::billing::TierSchedule;
use crate::error::{ConfigError, CostctlError, Result};

/// Validate a currency conversion rate
///
/// The rate divides every computed cost, so it must be finite and positive.
pub fn validate_conversion_rate(rate: f64) -> Result<()> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(ConfigError::InvalidValue {
            field: "currency.conversion_rate".to_string(),
            reason: format!("must be a positive number, got: {}", rate),
        }
        .into());
    }
    Ok(())
}

/// Validate that a projected usage does not exceed its ceiling
pub fn validate_projection(field: &str, projected: u64, ceiling: u64) -> Result<()> {
    if projected > ceiling {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: format!(
                "projected usage {} exceeds ceiling usage {}",
                projected, ceiling
            ),
        }
        .into());
    }
    Ok(())
}

/// Validate tier schedule well-formedness
///
/// The billing engine assumes contiguous, non-overlapping tiers and does not
/// check them itself. Price sources call this at load time instead:
/// - at least one tier
/// - first tier starts at 0
/// - start amounts strictly increasing
/// - unit prices finite and non-negative
/// - a single currency across tiers
pub fn validate_tier_schedule(rate_id: &str, schedule: &TierSchedule) -> Result<()> {
    let invalid = |reason: String| CostctlError::InvalidTierSchedule {
        rate_id: rate_id.to_string(),
        reason,
    };

    let tiers = schedule.tiers();
    let first = tiers
        .first()
        .ok_or_else(|| invalid("schedule has no tiers".to_string()))?;

    if first.start_usage_amount != 0 {
        return Err(invalid(format!(
            "first tier must start at 0, starts at {}",
            first.start_usage_amount
        )));
    }

    for pair in tiers.windows(2) {
        if pair[1].start_usage_amount <= pair[0].start_usage_amount {
            return Err(invalid(format!(
                "tier start {} does not follow {}",
                pair[1].start_usage_amount, pair[0].start_usage_amount
            )));
        }
    }

    for tier in tiers {
        if !tier.unit_price.is_finite() || tier.unit_price < 0.0 {
            return Err(invalid(format!(
                "tier starting at {} has invalid unit price {}",
                tier.start_usage_amount, tier.unit_price
            )));
        }
        if tier.currency != first.currency {
            return Err(invalid(format!(
                "mixed currencies {} and {}",
                first.currency, tier.currency
            )));
        }
    }

    Ok(())
}
