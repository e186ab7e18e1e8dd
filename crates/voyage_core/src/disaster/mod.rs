//! Disaster scheduling and weighted selection.
//!
//! The schedule is a two-field state machine (`has_fired_first`,
//! `next_fire_at`) plus a short severity history. The first disaster is
//! always the Major Asteroid Swarm; later ones are drawn from the current
//! quadrant's weight table.

mod effects;

use std::collections::VecDeque;

use rand::Rng;

pub use effects::apply_effect;

use crate::{
    emit, AnimationHint, Constants, DisasterKind, DisasterSchedule, DisasterSeverity,
    DisasterWeight, Event, EventEnvelope, GameContent, GameState, Quadrant,
};

pub struct DisasterDef {
    pub kind: DisasterKind,
    pub name: &'static str,
    pub severity: DisasterSeverity,
}

pub const CATALOG: &[DisasterDef] = &[
    DisasterDef {
        kind: DisasterKind::NavMisalign,
        name: "Navigation Misalignment",
        severity: DisasterSeverity::Minor,
    },
    DisasterDef {
        kind: DisasterKind::SingleAsteroid,
        name: "Single Asteroid",
        severity: DisasterSeverity::Minor,
    },
    DisasterDef {
        kind: DisasterKind::PowerSurge,
        name: "Power Surge",
        severity: DisasterSeverity::Minor,
    },
    DisasterDef {
        kind: DisasterKind::MinorRewire,
        name: "Minor Engineering Rewire",
        severity: DisasterSeverity::Minor,
    },
    DisasterDef {
        kind: DisasterKind::MajorAsteroid,
        name: "Major Asteroid Swarm",
        severity: DisasterSeverity::Major,
    },
    DisasterDef {
        kind: DisasterKind::MajorRewire,
        name: "Major Engineering Rewire",
        severity: DisasterSeverity::Major,
    },
    DisasterDef {
        kind: DisasterKind::CatastrophicRewire,
        name: "Catastrophic Engineering Failure",
        severity: DisasterSeverity::Catastrophic,
    },
    DisasterDef {
        kind: DisasterKind::ThreeMinors,
        name: "Three Minor Disasters",
        severity: DisasterSeverity::Catastrophic,
    },
    DisasterDef {
        kind: DisasterKind::AsteroidCluster,
        name: "Asteroid Cluster",
        severity: DisasterSeverity::Catastrophic,
    },
    DisasterDef {
        kind: DisasterKind::Sabotage,
        name: "Sabotage",
        severity: DisasterSeverity::Catastrophic,
    },
];

/// Disaster fired unconditionally once the first trigger time passes.
pub const BOOTSTRAP_DISASTER: DisasterKind = DisasterKind::MajorAsteroid;

impl DisasterKind {
    fn definition(self) -> &'static DisasterDef {
        CATALOG
            .iter()
            .find(|def| def.kind == self)
            .unwrap_or(&CATALOG[0])
    }

    pub fn name(self) -> &'static str {
        self.definition().name
    }

    pub fn severity(self) -> DisasterSeverity {
        self.definition().severity
    }

    pub fn animation_hint(self) -> AnimationHint {
        match self {
            DisasterKind::NavMisalign => AnimationHint::Slide,
            _ => AnimationHint::Shake,
        }
    }
}

impl DisasterSchedule {
    pub fn new(constants: &Constants) -> Self {
        Self {
            next_fire_at: constants.first_disaster_at_secs,
            has_fired_first: false,
            history: VecDeque::with_capacity(constants.disaster_history_len),
            fired: 0,
        }
    }
}

pub fn weights_for(content: &GameContent, quadrant: Quadrant) -> &[DisasterWeight] {
    content
        .disaster_weights
        .iter()
        .find(|entry| entry.quadrant == quadrant)
        .map(|entry| entry.weights.as_slice())
        .unwrap_or(&[])
}

/// Weighted pool for the next draw. Catastrophic entries are dropped right
/// after a catastrophic disaster unless that would leave nothing.
pub fn candidate_pool(
    weights: &[DisasterWeight],
    history: &VecDeque<DisasterSeverity>,
) -> Vec<DisasterWeight> {
    let last_was_catastrophic = history.back() == Some(&DisasterSeverity::Catastrophic);
    if last_was_catastrophic {
        let filtered: Vec<DisasterWeight> = weights
            .iter()
            .filter(|w| w.disaster.severity() != DisasterSeverity::Catastrophic)
            .copied()
            .collect();
        if filtered.iter().any(|w| w.weight > 0) {
            return filtered;
        }
    }
    weights.to_vec()
}

/// Uniform pick over a flattened list where each entry repeats `weight` times.
pub fn draw(pool: &[DisasterWeight], rng: &mut impl Rng) -> Option<DisasterKind> {
    let flattened: Vec<DisasterKind> = pool
        .iter()
        .flat_map(|w| std::iter::repeat(w.disaster).take(w.weight as usize))
        .collect();
    if flattened.is_empty() {
        return None;
    }
    Some(flattened[rng.gen_range(0..flattened.len())])
}

fn schedule_next(state: &mut GameState, constants: &Constants, rng: &mut impl Rng) {
    let now = state.clock.total_seconds();
    let min = constants.disaster_refire_min_secs;
    let max = constants.disaster_refire_max_secs.max(min);
    state.disasters.next_fire_at = now + rng.gen_range(min..=max);
}

/// Due-check run once per tick. Skipped entirely while on break; the pending
/// fire time is left alone so a disaster that came due during the break fires
/// on the first tick after it.
pub fn check_due(
    state: &mut GameState,
    content: &GameContent,
    rng: &mut impl Rng,
    events: &mut Vec<EventEnvelope>,
) -> Option<DisasterKind> {
    if state.ship.on_break {
        return None;
    }
    let constants = &content.constants;
    let now = state.clock.total_seconds();

    if !state.disasters.has_fired_first {
        if now < constants.first_disaster_at_secs {
            return None;
        }
        fire(state, BOOTSTRAP_DISASTER, content, rng, events);
        state.disasters.has_fired_first = true;
        schedule_next(state, constants, rng);
        return Some(BOOTSTRAP_DISASTER);
    }

    if now < state.disasters.next_fire_at {
        return None;
    }
    let quadrant = Quadrant::from_traveled(
        state.ship.distance_traveled(),
        constants.quadrant_length,
    );
    let pool = candidate_pool(weights_for(content, quadrant), &state.disasters.history);
    let picked = draw(&pool, rng);
    if let Some(kind) = picked {
        fire(state, kind, content, rng, events);
    } else {
        tracing::warn!(?quadrant, "empty disaster weight table");
    }
    schedule_next(state, constants, rng);
    picked
}

/// Applies `kind` and records it in the history.
pub fn fire(
    state: &mut GameState,
    kind: DisasterKind,
    content: &GameContent,
    rng: &mut impl Rng,
    events: &mut Vec<EventEnvelope>,
) {
    let now = state.clock.total_seconds();
    let quadrant = Quadrant::from_traveled(
        state.ship.distance_traveled(),
        content.constants.quadrant_length,
    );
    let severity = kind.severity();
    tracing::info!(disaster = kind.name(), ?severity, ?quadrant, at = now, "disaster triggered");
    events.push(emit(
        &mut state.counters,
        now,
        Event::DisasterTriggered {
            disaster: kind,
            severity,
            quadrant,
        },
    ));
    events.push(emit(
        &mut state.counters,
        now,
        Event::AnimationRequested {
            hint: kind.animation_hint(),
        },
    ));

    apply_effect(kind, state, &content.constants, rng, events);

    let history = &mut state.disasters.history;
    history.push_back(severity);
    while history.len() > content.constants.disaster_history_len {
        history.pop_front();
    }
    state.disasters.fired += 1;
}
