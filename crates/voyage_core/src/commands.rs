//! Player write interfaces.
//!
//! Commands apply immediately, outside the tick. A command that fails
//! validation, targets a cooling-down system, or lacks power is dropped
//! without touching state; the returned event list is then empty.

use crate::alerts::{dismiss_manual, raise_manual};
use crate::penalty::penalty_for;
use crate::{
    emit, fuel, weapons, Axis, Command, CommandEnvelope, Connection, DisruptionSource, Event,
    EventEnvelope, GameContent, GameState, PanelId, Player, ShipSystem, SystemEffect,
};

pub fn apply_commands(
    state: &mut GameState,
    commands: &[CommandEnvelope],
    content: &GameContent,
) -> Vec<EventEnvelope> {
    let mut events = Vec::new();
    for envelope in commands {
        events.extend(apply_command(state, envelope, content));
    }
    events
}

pub fn apply_command(
    state: &mut GameState,
    envelope: &CommandEnvelope,
    content: &GameContent,
) -> Vec<EventEnvelope> {
    let constants = &content.constants;
    let player = envelope.issued_by;
    let now = state.clock.total_seconds();
    let mut events = Vec::new();

    let penalty = |state: &GameState, system: ShipSystem| {
        penalty_for(system, Some(&state.engineering), player, constants)
    };

    let accepted = match &envelope.command {
        Command::SelectPlayer => {
            select_player(state, player, &mut events);
            true
        }
        Command::SetNavigationAxis { axis, value } => {
            set_navigation_axis(state, *axis, *value, &mut events)
        }
        Command::SetWiringConnections { panel, connections } => {
            set_wiring(state, panel, connections, player, &mut events)
        }
        Command::FireWeapon { weapon } => {
            let p = penalty(state, ShipSystem::Weapons);
            weapons::fire_weapon(state, *weapon, p, constants, &mut events)
        }
        Command::TransferFuelLayer { tube } => {
            fuel::transfer_layer(state, *tube, player, constants, &mut events)
        }
        Command::DumpFuelLayer => {
            let p = penalty(state, ShipSystem::Fuel);
            fuel::dump_layer(state, p, constants, &mut events)
        }
        Command::DumpAllFuelLayers => {
            let p = penalty(state, ShipSystem::Fuel);
            fuel::dump_all_layers(state, p, constants, &mut events)
        }
        Command::StartRefuel => {
            let p = penalty(state, ShipSystem::Fuel);
            fuel::start_refuel(state, p, constants, &mut events)
        }
        Command::ResumeJourney => resume_journey(state, player, content, &mut events),
        Command::RaiseAlert {
            name,
            description,
            severity,
            effects,
        } => {
            if name.trim().is_empty() || !effects_valid(effects) {
                false
            } else {
                let alert_id = raise_manual(
                    state,
                    player,
                    name.clone(),
                    description.clone(),
                    *severity,
                    effects.clone(),
                );
                events.push(emit(
                    &mut state.counters,
                    now,
                    Event::AlertRaised {
                        alert_id,
                        severity: *severity,
                        name: name.clone(),
                    },
                ));
                true
            }
        }
        Command::DismissAlert { alert_id } => {
            let dismissed = dismiss_manual(state, alert_id);
            if dismissed {
                events.push(emit(
                    &mut state.counters,
                    now,
                    Event::AlertCleared {
                        alert_id: alert_id.clone(),
                    },
                ));
            }
            dismissed
        }
        Command::SetDistanceTraveled { traveled } => {
            set_distance_traveled(state, *traveled, &mut events)
        }
    };

    if !accepted {
        tracing::debug!(command = ?envelope.command, ?player, "command rejected");
    }
    events
}

fn set_navigation_axis(
    state: &mut GameState,
    axis: Axis,
    value: f64,
    events: &mut Vec<EventEnvelope>,
) -> bool {
    if !value.is_finite() {
        return false;
    }
    state.navigation.current.set(axis, value);
    let now = state.clock.total_seconds();
    events.push(emit(
        &mut state.counters,
        now,
        Event::NavigationAdjusted { axis, value },
    ));
    true
}

/// Debug override used to jump along the journey.
fn set_distance_traveled(
    state: &mut GameState,
    traveled: f64,
    events: &mut Vec<EventEnvelope>,
) -> bool {
    if !traveled.is_finite() {
        return false;
    }
    let max = state.ship.distance.max;
    state.ship.distance.set(max - traveled);
    let now = state.clock.total_seconds();
    events.push(emit(
        &mut state.counters,
        now,
        Event::DistanceOverridden {
            traveled: state.ship.distance_traveled(),
        },
    ));
    true
}

/// Takes the seat for `player`: navigation and wiring reset to that ship's
/// solution.
fn select_player(state: &mut GameState, player: Player, events: &mut Vec<EventEnvelope>) {
    state.meta.local_player = Some(player);
    state.navigation.reset_for(player);
    state.engineering.reset_to(player);
    let now = state.clock.total_seconds();
    events.push(emit(
        &mut state.counters,
        now,
        Event::PlayerSelected { player },
    ));
}

fn set_wiring(
    state: &mut GameState,
    panel: &PanelId,
    connections: &[Connection],
    player: Player,
    events: &mut Vec<EventEnvelope>,
) -> bool {
    let legal = connections
        .iter()
        .all(|c| c.endpoints_in_range() && !c.is_self_loop());
    if !legal {
        return false;
    }
    let Some(repaired) = state.engineering.set_connections(
        panel,
        connections.to_vec(),
        DisruptionSource::User,
        player,
    ) else {
        return false;
    };
    let incorrect = state
        .engineering
        .panels
        .get(panel)
        .map_or(0, |p| p.incorrect_count(player));
    let now = state.clock.total_seconds();
    events.push(emit(
        &mut state.counters,
        now,
        Event::WiringChanged {
            panel: panel.clone(),
            incorrect,
            repaired,
        },
    ));
    true
}

/// Leaves a checkpoint break once navigation matches `player`'s target.
fn resume_journey(
    state: &mut GameState,
    player: Player,
    content: &GameContent,
    events: &mut Vec<EventEnvelope>,
) -> bool {
    if !state.ship.on_break {
        return false;
    }
    if !state
        .navigation
        .is_aligned(player, content.constants.speed_nav_tolerance)
    {
        return false;
    }
    state.ship.on_break = false;
    let now = state.clock.total_seconds();
    tracing::info!(at = now, "journey resumed");
    events.push(emit(&mut state.counters, now, Event::JourneyResumed));
    true
}

fn effects_valid(effects: &[SystemEffect]) -> bool {
    effects.iter().all(|e| e.change_per_interval.is_finite())
}
