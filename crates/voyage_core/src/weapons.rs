//! Weapon fire against the hazard registry.

use crate::hazards::strip_outer_layers;
use crate::{emit, Constants, Cooldown, Event, EventEnvelope, GameState, MaterialType, WeaponType};

/// Material each weapon peels.
pub fn countered_material(weapon: WeaponType) -> MaterialType {
    match weapon {
        WeaponType::Phasers => MaterialType::Crystal,
        WeaponType::Missiles => MaterialType::Alloy,
        WeaponType::Railgun => MaterialType::Stone,
    }
}

pub fn power_cost(weapons_penalty: f64, constants: &Constants) -> f64 {
    (constants.weapon_power_cost * weapons_penalty).round()
}

pub fn is_ready(state: &GameState, weapon: WeaponType) -> bool {
    let now = state.clock.total_seconds();
    state
        .weapons
        .cooldowns
        .get(&weapon)
        .map_or(true, |cooldown| cooldown.ready_at <= now)
}

fn scaled_secs(base: f64, penalty: f64) -> u64 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let secs = (base * penalty).round().max(0.0) as u64;
    secs
}

/// Fires `weapon`. Returns false, changing nothing, while cooling down or when
/// the battery cannot cover the shot.
pub fn fire_weapon(
    state: &mut GameState,
    weapon: WeaponType,
    weapons_penalty: f64,
    constants: &Constants,
    events: &mut Vec<EventEnvelope>,
) -> bool {
    if !is_ready(state, weapon) {
        return false;
    }
    let cost = power_cost(weapons_penalty, constants);
    if state.ship.battery.current < cost {
        return false;
    }

    let now = state.clock.total_seconds();
    state.ship.battery.apply(-cost);
    let hits = strip_outer_layers(state, countered_material(weapon), events);

    let cooldown = if hits == 0 {
        Cooldown {
            started_at: now,
            ready_at: now + scaled_secs(constants.weapon_miss_cooldown_secs, weapons_penalty),
        }
    } else {
        let started_at = now + 1;
        Cooldown {
            started_at,
            ready_at: started_at
                + scaled_secs(constants.weapon_hit_cooldown_secs, weapons_penalty),
        }
    };
    state.weapons.cooldowns.insert(weapon, cooldown);

    events.push(emit(
        &mut state.counters,
        now,
        Event::WeaponFired {
            weapon,
            power_cost: cost,
            hits,
        },
    ));
    true
}
