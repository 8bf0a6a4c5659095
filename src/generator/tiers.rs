//! Noise tier filtering.
//!
//! The underlying world is identical across tiers for a given seed; the
//! tier only controls what the agent gets to see. Filtering happens at
//! packaging time by null-filling module slots, generation always runs
//! every module so the shared random stream stays stable.

use crate::scenario::types::{HeartbeatPayload, NoiseTier};

/// Null-fill the modules a tier hides.
pub fn apply_tier(hb: &mut HeartbeatPayload, tier: NoiseTier) {
    if tier < NoiseTier::T2 {
        hb.location = None;
        hb.weather = None;
    }
    if tier < NoiseTier::T3 {
        hb.calendar = None;
        hb.communications = None;
    }
    if tier < NoiseTier::T4 {
        hb.financial = None;
    }
}

/// Module keys visible at a tier, in payload order.
pub fn visible_modules(tier: NoiseTier) -> Vec<&'static str> {
    let mut modules = vec!["wearable"];
    if tier >= NoiseTier::T2 {
        modules.push("location");
        modules.push("weather");
    }
    if tier >= NoiseTier::T3 {
        modules.push("calendar");
        modules.push("communications");
    }
    if tier >= NoiseTier::T4 {
        modules.push("financial");
    }
    modules
}
