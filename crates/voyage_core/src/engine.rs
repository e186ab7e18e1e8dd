use rand::Rng;

use crate::navigation::navigation_stage;
use crate::penalty::SystemPenalties;
use crate::speed::compute_speed;
use crate::{alerts, disaster, emit, fuel, hazards};
use crate::{Constants, Event, EventEnvelope, GameContent, GameState};

/// Advance the simulation by one second.
///
/// Order of operations:
/// 1. Advance the clock.
/// 2. Derive system penalties for the active ship.
/// 3. Regenerate power, burn fuel, finish refuelling, apply manual alert effects.
/// 4. Move the ship unless it is on break; detect checkpoints and arrival.
/// 5. Update the navigation stage and fuel-mixture targets.
/// 6. Run the disaster due-check.
/// 7. Reap hazards whose deadline has arrived into hull damage.
/// 8. Resolve manual alerts and recompute the automatic alert set.
///
/// Returns all events produced this tick. Never fails.
pub fn tick(
    state: &mut GameState,
    content: &GameContent,
    rng: &mut impl Rng,
) -> Vec<EventEnvelope> {
    let constants = &content.constants;
    let mut events = Vec::new();

    state.clock.advance();

    let penalties = SystemPenalties::derive(
        Some(&state.engineering),
        state.active_player(),
        constants,
    );

    apply_upkeep(state, &penalties, constants, rng, &mut events);
    advance_ship(state, &penalties, constants, &mut events);
    update_stage(state, content, &mut events);
    disaster::check_due(state, content, rng, &mut events);
    hazards::reap_impacts(state, constants, &mut events);

    events.extend(alerts::resolve_manual(state));
    events.extend(alerts::reconcile(state, constants));
    events
}

fn apply_upkeep(
    state: &mut GameState,
    penalties: &SystemPenalties,
    constants: &Constants,
    rng: &mut impl Rng,
    events: &mut Vec<EventEnvelope>,
) {
    let restored = (constants.power_regen_base / penalties.power).round().max(0.0);
    state.ship.battery.apply(restored);
    state.ship.last_power_restored = restored;

    if !state.ship.on_break {
        let burn = (constants.fuel_burn_per_tick * penalties.fuel).round();
        state.ship.fuel.apply(-burn);
    }

    fuel::complete_refuel(state, constants, rng, events);
    alerts::apply_manual_effects(state, constants);
}

fn advance_ship(
    state: &mut GameState,
    penalties: &SystemPenalties,
    constants: &Constants,
    events: &mut Vec<EventEnvelope>,
) {
    if state.ship.on_break || state.meta.arrived {
        return;
    }
    let nav_errors = state
        .navigation
        .errors_for(state.active_player(), constants.speed_nav_tolerance);
    let speed = compute_speed(&state.ship.fuel, nav_errors, penalties.thrust, constants);
    if speed <= 0.0 {
        return;
    }

    let now = state.clock.total_seconds();
    let before = state.ship.distance_traveled();
    state.ship.distance.apply(-speed);
    let after = state.ship.distance_traveled();

    if let Some(checkpoint) = constants
        .break_points
        .iter()
        .copied()
        .find(|bp| before < *bp && *bp <= after)
    {
        state.ship.on_break = true;
        tracing::info!(checkpoint, at = now, "checkpoint reached, ship on break");
        events.push(emit(
            &mut state.counters,
            now,
            Event::BreakStarted { checkpoint },
        ));
    }

    if state.ship.distance.is_empty() {
        state.meta.arrived = true;
        tracing::info!(at = now, "destination reached");
        events.push(emit(&mut state.counters, now, Event::DestinationReached));
    }
}

fn update_stage(state: &mut GameState, content: &GameContent, events: &mut Vec<EventEnvelope>) {
    let stage = navigation_stage(state.ship.distance_traveled(), &content.constants);
    if state.navigation.enter_stage(content, stage) {
        let now = state.clock.total_seconds();
        tracing::info!(quadrant = ?stage, at = now, "entered quadrant");
        events.push(emit(
            &mut state.counters,
            now,
            Event::QuadrantEntered { quadrant: stage },
        ));
    }
    fuel::rotate_targets(state, &content.constants, events);
}
