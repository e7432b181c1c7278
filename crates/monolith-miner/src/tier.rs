//! Voltage tiers and overclock math.
//!
//! Tiers form a ladder where each tier carries four times the voltage of
//! the one below, starting at 8 for tier 0. A miner is built for a rated
//! tier; feeding it from a higher-tier energy provider overclocks it,
//! scaling resource cost per tick linearly.

/// Highest tier the ladder defines. Voltages above this clamp.
pub const MAX_TIER: u32 = 14;

/// Nominal voltage of a tier: `8 * 4^tier`.
pub fn tier_voltage(tier: u32) -> i64 {
    8i64 << (2 * tier.min(MAX_TIER))
}

/// Largest tier whose voltage is at most `voltage`. Anything below the
/// tier-0 voltage floors to 0.
pub fn floor_tier(voltage: i64) -> u32 {
    let mut tier = 0;
    while tier < MAX_TIER && tier_voltage(tier + 1) <= voltage {
        tier += 1;
    }
    tier
}

/// Tier the machine actually runs at given its rated tier and the supplied
/// voltage: never below rated, never more than one above it.
pub fn energy_tier(rated_tier: u32, supplied_voltage: i64) -> u32 {
    (rated_tier + 1).min(floor_tier(supplied_voltage).max(rated_tier))
}

/// Linear scale factor applied to per-tick energy and fluid cost. One tier
/// of excess voltage contributes one point, with a floor of 1 so the
/// machine always runs at least at rated speed.
pub fn overclock_amount(rated_tier: u32, supplied_voltage: i64) -> u32 {
    floor_tier(supplied_voltage).saturating_sub(rated_tier).max(1)
}

/// Per-tick energy cost at the given running tier. The base cost is rated
/// for `rated_tier` and quadruples per tier above it.
pub fn scaled_energy_cost(base_cost: i64, rated_tier: u32, energy_tier: u32) -> i64 {
    base_cost << (2 * energy_tier.saturating_sub(rated_tier).min(MAX_TIER))
}
