//! Effect functions for every catalog entry.
//!
//! Wiring effects go through [`EngineeringState::set_connections`] so the
//! override hierarchy decides which panels they may touch. When no panel is
//! eligible a small hazard spawn is substituted.
//!
//! [`EngineeringState::set_connections`]: crate::EngineeringState::set_connections

use rand::seq::SliceRandom;
use rand::Rng;

use crate::hazards::{spawn_hazards, SpawnPlan};
use crate::{
    emit, Axis, Connection, Constants, DisasterKind, DisasterSeverity, DisruptionSource, Endpoint,
    Event, EventEnvelope, GameState, PanelId, ENDPOINTS_PER_CLASS,
};

const MINOR_CUTS_PER_PANEL: usize = 2;

pub fn apply_effect(
    kind: DisasterKind,
    state: &mut GameState,
    constants: &Constants,
    rng: &mut impl Rng,
    events: &mut Vec<EventEnvelope>,
) {
    match kind {
        DisasterKind::NavMisalign => nudge_navigation(state, rng, events),
        DisasterKind::SingleAsteroid => {
            let plan = SpawnPlan::small(rng.gen_range(1..=3));
            spawn_hazards(state, &plan, constants, rng, events);
        }
        DisasterKind::PowerSurge => drain_power(state, constants, events),
        DisasterKind::MinorRewire => minor_rewire(state, kind, constants, rng, events),
        DisasterKind::MajorAsteroid => {
            let plan = SpawnPlan {
                count: rng.gen_range(3..=5),
                large: rng.gen_range(1..=2),
                medium: 0,
                impact_multiplier: 1.0,
            };
            spawn_hazards(state, &plan, constants, rng, events);
        }
        DisasterKind::MajorRewire => major_rewire(state, kind, constants, rng, events),
        DisasterKind::CatastrophicRewire => catastrophic_rewire(state, kind, constants, rng, events),
        DisasterKind::ThreeMinors => three_minors(state, constants, rng, events),
        DisasterKind::AsteroidCluster => {
            let plan = SpawnPlan {
                count: rng.gen_range(7..=10),
                large: rng.gen_range(2..=3),
                medium: rng.gen_range(1..=3),
                impact_multiplier: 1.5,
            };
            spawn_hazards(state, &plan, constants, rng, events);
        }
        DisasterKind::Sabotage => sabotage(state, constants, rng, events),
    }
}

fn nudge_navigation(state: &mut GameState, rng: &mut impl Rng, events: &mut Vec<EventEnvelope>) {
    let axis = Axis::ALL[rng.gen_range(0..Axis::ALL.len())];
    let delta = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
    let current = state.navigation.current.get(axis);
    state.navigation.current.set(axis, current + delta);
    let now = state.clock.total_seconds();
    events.push(emit(
        &mut state.counters,
        now,
        Event::NavigationNudged { axis, delta },
    ));
}

fn drain_power(state: &mut GameState, constants: &Constants, events: &mut Vec<EventEnvelope>) {
    let drained = -state.ship.battery.apply(-constants.power_surge_drain);
    let now = state.clock.total_seconds();
    events.push(emit(
        &mut state.counters,
        now,
        Event::PowerDrained { amount: drained },
    ));
}

/// Spawns 1-2 small hazards in place of a wiring effect with no target.
fn fallback_spawn(
    state: &mut GameState,
    kind: DisasterKind,
    plan: &SpawnPlan,
    constants: &Constants,
    rng: &mut impl Rng,
    events: &mut Vec<EventEnvelope>,
) {
    tracing::debug!(disaster = kind.name(), "no eligible panel, spawning hazards instead");
    let spawned = spawn_hazards(state, plan, constants, rng, events);
    let now = state.clock.total_seconds();
    events.push(emit(
        &mut state.counters,
        now,
        Event::DisasterFallback {
            disaster: kind,
            hazards_spawned: spawned,
        },
    ));
}

fn small_fallback(rng: &mut impl Rng) -> SpawnPlan {
    SpawnPlan::small(rng.gen_range(1..=2))
}

/// One disruptive edit: drop an edge, or move one of its ends to another
/// endpoint of the same class. Minor disruptions only drop edges.
fn edit_once(connections: &mut Vec<Connection>, source: DisruptionSource, rng: &mut impl Rng) {
    if connections.is_empty() {
        return;
    }
    let index = rng.gen_range(0..connections.len());
    if source == DisruptionSource::Minor || rng.gen_bool(0.5) {
        connections.remove(index);
        return;
    }
    let edge = &mut connections[index];
    let end: &mut Endpoint = if rng.gen_bool(0.5) {
        &mut edge.from
    } else {
        &mut edge.to
    };
    let shift = rng.gen_range(1..ENDPOINTS_PER_CLASS);
    end.index = (end.index + shift) % ENDPOINTS_PER_CLASS;
    if connections[index].is_self_loop() {
        connections.remove(index);
    }
}

fn disrupt_panel(
    state: &mut GameState,
    panel_id: &PanelId,
    edits: usize,
    source: DisruptionSource,
    rng: &mut impl Rng,
    events: &mut Vec<EventEnvelope>,
) {
    let Some(panel) = state.engineering.panels.get(panel_id) else {
        return;
    };
    let mut connections = panel.connections.clone();
    for _ in 0..edits {
        edit_once(&mut connections, source, rng);
    }
    let player = state.active_player();
    state
        .engineering
        .set_connections(panel_id, connections, source, player);
    let now = state.clock.total_seconds();
    events.push(emit(
        &mut state.counters,
        now,
        Event::PanelDisrupted {
            panel: panel_id.clone(),
            source,
        },
    ));
}

/// Cuts two edges from every wired panel a minor disruption may touch.
fn minor_rewire(
    state: &mut GameState,
    kind: DisasterKind,
    constants: &Constants,
    rng: &mut impl Rng,
    events: &mut Vec<EventEnvelope>,
) {
    let mut eligible = state.engineering.eligible_panels(DisruptionSource::Minor);
    eligible.retain(|id| {
        state
            .engineering
            .panels
            .get(id)
            .is_some_and(|panel| !panel.connections.is_empty())
    });
    if eligible.is_empty() {
        let plan = small_fallback(rng);
        fallback_spawn(state, kind, &plan, constants, rng, events);
        return;
    }
    for panel_id in &eligible {
        disrupt_panel(
            state,
            panel_id,
            MINOR_CUTS_PER_PANEL,
            DisruptionSource::Minor,
            rng,
            events,
        );
    }
}

fn major_rewire(
    state: &mut GameState,
    kind: DisasterKind,
    constants: &Constants,
    rng: &mut impl Rng,
    events: &mut Vec<EventEnvelope>,
) {
    let mut eligible = state.engineering.eligible_panels(DisruptionSource::Major);
    if eligible.is_empty() {
        let plan = SpawnPlan {
            count: rng.gen_range(2..=3),
            large: 1,
            medium: 0,
            impact_multiplier: 1.0,
        };
        fallback_spawn(state, kind, &plan, constants, rng, events);
        return;
    }
    eligible.shuffle(rng);
    for (panel_id, edits) in eligible.iter().zip([2, 1]) {
        disrupt_panel(state, panel_id, edits, DisruptionSource::Major, rng, events);
    }
}

fn catastrophic_rewire(
    state: &mut GameState,
    kind: DisasterKind,
    constants: &Constants,
    rng: &mut impl Rng,
    events: &mut Vec<EventEnvelope>,
) {
    let mut eligible = state.engineering.eligible_panels(DisruptionSource::Catastrophic);
    if eligible.is_empty() {
        let plan = SpawnPlan {
            count: rng.gen_range(5..=7),
            large: 2,
            medium: rng.gen_range(1..=2),
            impact_multiplier: 1.3,
        };
        fallback_spawn(state, kind, &plan, constants, rng, events);
        return;
    }
    eligible.shuffle(rng);
    for panel_id in eligible.iter().take(3) {
        let edits = rng.gen_range(2..=3);
        disrupt_panel(
            state,
            panel_id,
            edits,
            DisruptionSource::Catastrophic,
            rng,
            events,
        );
    }
}

/// Three random minor effects followed by two small hazards.
fn three_minors(
    state: &mut GameState,
    constants: &Constants,
    rng: &mut impl Rng,
    events: &mut Vec<EventEnvelope>,
) {
    let minors: Vec<DisasterKind> = super::CATALOG
        .iter()
        .filter(|def| def.severity == DisasterSeverity::Minor)
        .map(|def| def.kind)
        .collect();
    for _ in 0..3 {
        if let Some(kind) = minors.choose(rng).copied() {
            apply_effect(kind, state, constants, rng, events);
        }
    }
    spawn_hazards(state, &SpawnPlan::small(2), constants, rng, events);
}

/// Wipes every panel and drops five medium hazards.
fn sabotage(
    state: &mut GameState,
    constants: &Constants,
    rng: &mut impl Rng,
    events: &mut Vec<EventEnvelope>,
) {
    let player = state.active_player();
    let now = state.clock.total_seconds();
    let panel_ids: Vec<PanelId> = state.engineering.panels.keys().cloned().collect();
    for panel_id in panel_ids {
        state.engineering.set_connections(
            &panel_id,
            Vec::new(),
            DisruptionSource::Catastrophic,
            player,
        );
        events.push(emit(
            &mut state.counters,
            now,
            Event::PanelDisrupted {
                panel: panel_id,
                source: DisruptionSource::Catastrophic,
            },
        ));
    }
    let plan = SpawnPlan {
        count: 5,
        large: 0,
        medium: 5,
        impact_multiplier: 1.2,
    };
    spawn_hazards(state, &plan, constants, rng, events);
}
