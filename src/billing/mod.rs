//! Tiered (slab) billing
//!
//! A [`TierSchedule`] is an ordered list of usage thresholds with a unit
//! price each. [`cost`] splits a ceiling and a projected usage across the
//! tiers and returns both totals.

mod engine;
mod tiers;

pub use engine::{cost, TieredCost};
pub use tiers::{Tier, TierSchedule};
