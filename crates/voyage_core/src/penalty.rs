//! Wiring correctness to performance multipliers.
//!
//! Pure lookups: incorrect-connection count → [`PenaltyTier`] → multiplier.
//! Nothing here is stored; the tick loop re-derives penalties every second.

use serde::{Deserialize, Serialize};

use crate::{Constants, EngineeringState, PenaltyTier, Player, ShipSystem, TierThresholds};

pub fn tier_for(incorrect: u32, thresholds: &TierThresholds) -> PenaltyTier {
    if incorrect >= thresholds.heavy_min {
        PenaltyTier::Heavy
    } else if incorrect >= thresholds.medium_min {
        PenaltyTier::Medium
    } else if incorrect >= thresholds.light_min {
        PenaltyTier::Light
    } else {
        PenaltyTier::None
    }
}

/// Table value for `system` at `tier`, before system-specific post-processing.
pub fn raw_multiplier(system: ShipSystem, tier: PenaltyTier, constants: &Constants) -> f64 {
    let table = match system {
        ShipSystem::Weapons => &constants.penalty_multipliers.weapons,
        ShipSystem::Thrust => &constants.penalty_multipliers.thrust,
        ShipSystem::Fuel => &constants.penalty_multipliers.fuel,
        ShipSystem::Power => &constants.penalty_multipliers.power,
    };
    match tier {
        PenaltyTier::None => table.none,
        PenaltyTier::Light => table.light,
        PenaltyTier::Medium => table.medium,
        PenaltyTier::Heavy => table.heavy,
    }
}

/// Thrust only: a boost below the floor is raised to the floor.
fn post_process(system: ShipSystem, raw: f64, constants: &Constants) -> f64 {
    match system {
        ShipSystem::Thrust if raw < constants.thrust_boost_floor => constants.thrust_boost_floor,
        _ => raw,
    }
}

pub fn multiplier_for_tier(system: ShipSystem, tier: PenaltyTier, constants: &Constants) -> f64 {
    post_process(system, raw_multiplier(system, tier, constants), constants)
}

/// Multiplier for `system` on `player`'s ship.
///
/// Without engineering state the result is a neutral 1.0. If the system's
/// panel cannot be resolved the "none" tier value is used.
pub fn penalty_for(
    system: ShipSystem,
    engineering: Option<&EngineeringState>,
    player: Player,
    constants: &Constants,
) -> f64 {
    let Some(engineering) = engineering else {
        return 1.0;
    };
    let tier = engineering
        .panel_for(system, player)
        .map_or(PenaltyTier::None, |(_, panel)| {
            tier_for(panel.incorrect_count(player), &constants.penalty_tiers)
        });
    multiplier_for_tier(system, tier, constants)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SystemPenalties {
    pub weapons: f64,
    pub thrust: f64,
    pub fuel: f64,
    pub power: f64,
}

impl SystemPenalties {
    pub const NEUTRAL: SystemPenalties = SystemPenalties {
        weapons: 1.0,
        thrust: 1.0,
        fuel: 1.0,
        power: 1.0,
    };

    pub fn derive(
        engineering: Option<&EngineeringState>,
        player: Player,
        constants: &Constants,
    ) -> Self {
        Self {
            weapons: penalty_for(ShipSystem::Weapons, engineering, player, constants),
            thrust: penalty_for(ShipSystem::Thrust, engineering, player, constants),
            fuel: penalty_for(ShipSystem::Fuel, engineering, player, constants),
            power: penalty_for(ShipSystem::Power, engineering, player, constants),
        }
    }

    pub fn get(&self, system: ShipSystem) -> f64 {
        match system {
            ShipSystem::Weapons => self.weapons,
            ShipSystem::Thrust => self.thrust,
            ShipSystem::Fuel => self.fuel,
            ShipSystem::Power => self.power,
        }
    }
}
