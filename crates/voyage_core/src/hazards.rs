//! Asteroid registry: spawning, layer stripping, and impact reaping.

use rand::Rng;

use crate::{
    emit, Constants, Event, EventEnvelope, GameState, Hazard, HazardId, MaterialType, Position,
};

const VIEWPORT_WIDTH: f64 = 600.0;
const VIEWPORT_HEIGHT: f64 = 400.0;
const MIN_HAZARD_SIZE: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeClass {
    Small,
    Medium,
    Large,
}

impl SizeClass {
    fn layer_range(self) -> std::ops::RangeInclusive<usize> {
        match self {
            SizeClass::Small => 1..=2,
            SizeClass::Medium => 2..=4,
            SizeClass::Large => 3..=5,
        }
    }
}

/// How many hazards a disaster drops and how soon they hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnPlan {
    pub count: usize,
    pub large: usize,
    pub medium: usize,
    /// Scales the impact delay; at least 1.
    pub impact_multiplier: f64,
}

impl SpawnPlan {
    pub fn small(count: usize) -> Self {
        Self {
            count,
            large: 0,
            medium: 0,
            impact_multiplier: 1.0,
        }
    }

    fn class_of(&self, index: usize) -> SizeClass {
        if index < self.large {
            SizeClass::Large
        } else if index < self.large + self.medium {
            SizeClass::Medium
        } else {
            SizeClass::Small
        }
    }
}

pub fn spawn_hazards(
    state: &mut GameState,
    plan: &SpawnPlan,
    constants: &Constants,
    rng: &mut impl Rng,
    events: &mut Vec<EventEnvelope>,
) -> usize {
    for index in 0..plan.count {
        spawn_hazard(state, plan.class_of(index), plan.impact_multiplier, constants, rng, events);
    }
    plan.count
}

pub fn spawn_hazard(
    state: &mut GameState,
    class: SizeClass,
    impact_multiplier: f64,
    constants: &Constants,
    rng: &mut impl Rng,
    events: &mut Vec<EventEnvelope>,
) -> HazardId {
    let now = state.clock.total_seconds();
    let layer_count = rng.gen_range(class.layer_range());
    let layers: Vec<MaterialType> = (0..layer_count)
        .map(|_| MaterialType::ALL[rng.gen_range(0..MaterialType::ALL.len())])
        .collect();

    let delay = (constants.hazard_impact_base_secs
        + rng.gen::<f64>() * constants.hazard_impact_spread_secs)
        * impact_multiplier.max(1.0);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let delay_secs = (delay.round() as u64).max(1);

    let size = (40.0 + 6.0 * layer_count as f64 + rng.gen_range(0.0..20.0)).min(80.0);
    let position = Position {
        x: rng.gen_range(0.0..VIEWPORT_WIDTH),
        y: rng.gen_range(0.0..VIEWPORT_HEIGHT),
    };

    let id = HazardId(format!("haz_{:06}", state.counters.next_hazard_id));
    state.counters.next_hazard_id += 1;

    events.push(emit(
        &mut state.counters,
        now,
        Event::HazardSpawned {
            hazard_id: id.clone(),
            layers: layers.clone(),
            impact_at: now + delay_secs,
        },
    ));
    state.hazards.push(Hazard {
        id: id.clone(),
        layers,
        spawned_at: now,
        impact_at: now + delay_secs,
        position,
        size,
        initial_layer_count: layer_count,
    });
    id
}

/// Strips the outer layer of every hazard whose outer layer is `material`.
/// Hazards left without layers are destroyed. Returns the number hit.
pub fn strip_outer_layers(
    state: &mut GameState,
    material: MaterialType,
    events: &mut Vec<EventEnvelope>,
) -> u32 {
    let now = state.clock.total_seconds();
    let mut hits = 0;
    let mut destroyed = Vec::new();
    for hazard in &mut state.hazards {
        if hazard.layers.first() != Some(&material) {
            continue;
        }
        hazard.layers.remove(0);
        hazard.size = shrunk_size(hazard);
        hits += 1;
        events.push(emit(
            &mut state.counters,
            now,
            Event::HazardLayerStripped {
                hazard_id: hazard.id.clone(),
                material,
                remaining: hazard.layers.len(),
            },
        ));
        if hazard.layers.is_empty() {
            destroyed.push(hazard.id.clone());
        }
    }
    state.hazards.retain(|h| !h.layers.is_empty());
    for hazard_id in destroyed {
        events.push(emit(
            &mut state.counters,
            now,
            Event::HazardDestroyed { hazard_id },
        ));
    }
    hits
}

/// Size after one layer comes off: the ring gap plus its drawn width.
fn shrunk_size(hazard: &Hazard) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let rings = hazard.initial_layer_count.max(1) as f64;
    let gap = (hazard.size / 2.0 / rings).floor().max(6.0);
    let width = (gap * 0.6).floor().max(4.0);
    (hazard.size - gap - width).max(MIN_HAZARD_SIZE)
}

/// Removes hazards whose deadline has arrived and adds their damage to the hull.
pub fn reap_impacts(
    state: &mut GameState,
    constants: &Constants,
    events: &mut Vec<EventEnvelope>,
) -> f64 {
    let now = state.clock.total_seconds();
    let (impacted, remaining): (Vec<Hazard>, Vec<Hazard>) = std::mem::take(&mut state.hazards)
        .into_iter()
        .partition(|h| h.impact_at <= now);
    state.hazards = remaining;

    let mut total = 0.0;
    for hazard in impacted {
        let damage = constants.hazard_base_damage + hazard.layers.len() as f64;
        state.ship.hull_damage.apply(damage);
        total += damage;
        tracing::info!(hazard = %hazard.id, damage, "hazard impact");
        events.push(emit(
            &mut state.counters,
            now,
            Event::HazardImpacted {
                hazard_id: hazard.id,
                damage,
            },
        ));
    }
    total
}

pub fn seconds_to_impact(hazard: &Hazard, now: u64) -> u64 {
    hazard.impact_at.saturating_sub(now)
}
