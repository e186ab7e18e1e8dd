//! Science station: fuel-mixture puzzle, storage tubes, and refuelling.
//!
//! Target mixtures come from a fixed linear congruential sequence keyed by
//! game-time period, so both ships derive the same targets independently.

use rand::Rng;

use crate::{
    emit, Constants, Cooldown, Event, EventEnvelope, FuelMixtureState, FuelType, GameState,
    PerPlayer, Player, Quadrant,
};

const LCG_MULTIPLIER: u64 = 9301;
const LCG_INCREMENT: u64 = 49297;
const LCG_MODULUS: u64 = 233_280;
const ALBATROSS_TARGET_SEED: u64 = 12345;
const KESTREL_TARGET_SEED: u64 = 67890;

struct MixtureSequence(u64);

impl MixtureSequence {
    fn next_unit(&mut self) -> f64 {
        self.0 = (self.0 * LCG_MULTIPLIER + LCG_INCREMENT) % LCG_MODULUS;
        self.0 as f64 / LCG_MODULUS as f64
    }
}

pub fn generate_target(seed: u64, length: usize) -> Vec<FuelType> {
    let mut sequence = MixtureSequence(seed % LCG_MODULUS);
    (0..length)
        .map(|_| {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let index = (sequence.next_unit() * FuelType::ALL.len() as f64) as usize;
            FuelType::ALL[index.min(FuelType::ALL.len() - 1)]
        })
        .collect()
}

pub fn targets_for_period(period: u64, length: usize) -> PerPlayer<Vec<FuelType>> {
    PerPlayer {
        albatross: generate_target(ALBATROSS_TARGET_SEED + period, length),
        kestrel: generate_target(KESTREL_TARGET_SEED + period, length),
    }
}

/// Required mixture length. Uses the quadrant one unit behind so a ship on a
/// checkpoint keeps the outgoing length.
pub fn mixture_length(traveled: f64, constants: &Constants) -> usize {
    let quadrant = Quadrant::from_traveled((traveled - 1.0).max(0.0), constants.quadrant_length);
    constants.mixture_length_by_quadrant[quadrant.index()]
}

pub fn random_storage(rng: &mut impl Rng, constants: &Constants) -> Vec<Vec<FuelType>> {
    (0..constants.storage_tube_count)
        .map(|_| {
            (0..constants.storage_tube_layers)
                .map(|_| FuelType::ALL[rng.gen_range(0..FuelType::ALL.len())])
                .collect()
        })
        .collect()
}

impl FuelMixtureState {
    pub fn new(rng: &mut impl Rng, constants: &Constants, now: u64, traveled: f64) -> Self {
        let period = period_at(now, constants);
        let required_length = mixture_length(traveled, constants);
        let targets = targets_for_period(period, required_length);
        Self {
            storage: random_storage(rng, constants),
            active: Vec::new(),
            previous_targets: targets.clone(),
            targets,
            target_period: period,
            required_length,
            refuel: Cooldown::default(),
            dump: Cooldown::default(),
            dump_all: Cooldown::default(),
            refuel_pending: false,
        }
    }
}

fn period_at(now: u64, constants: &Constants) -> u64 {
    now / constants.fuel_target_period_secs.max(1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuelAction {
    Refuel,
    Dump,
    DumpAll,
}

/// A fuel penalty above 1 scales the base cooldown; otherwise the default applies.
pub fn cooldown_secs(action: FuelAction, fuel_penalty: f64, constants: &Constants) -> u64 {
    let c = &constants.fuel_cooldowns;
    let (base, default) = match action {
        FuelAction::Refuel => (c.refuel_base_secs, c.refuel_default_secs),
        FuelAction::Dump => (c.dump_base_secs, c.dump_default_secs),
        FuelAction::DumpAll => (c.dump_all_base_secs, c.dump_all_default_secs),
    };
    if fuel_penalty > 1.0 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let scaled = (base as f64 * fuel_penalty).round() as u64;
        scaled
    } else {
        default
    }
}

fn start_cooldown(now: u64, secs: u64) -> Cooldown {
    Cooldown {
        started_at: now,
        ready_at: now + secs,
    }
}

/// Regenerates targets when the game-time period or the required length
/// changed. Outgoing targets are kept as the previous snapshot.
pub fn rotate_targets(
    state: &mut GameState,
    constants: &Constants,
    events: &mut Vec<EventEnvelope>,
) -> bool {
    let now = state.clock.total_seconds();
    let period = period_at(now, constants);
    let length = mixture_length(state.ship.distance_traveled(), constants);
    let fuel = &mut state.fuel;
    if period == fuel.target_period && length == fuel.required_length {
        return false;
    }
    fuel.previous_targets = std::mem::replace(&mut fuel.targets, targets_for_period(period, length));
    fuel.target_period = period;
    fuel.required_length = length;
    events.push(emit(
        &mut state.counters,
        now,
        Event::FuelTargetsRotated {
            required_length: length,
        },
    ));
    true
}

/// Moves the top layer of storage tube `tube` onto the active tube, then
/// checks the mixture for `player`.
pub fn transfer_layer(
    state: &mut GameState,
    tube: usize,
    player: Player,
    constants: &Constants,
    events: &mut Vec<EventEnvelope>,
) -> bool {
    let now = state.clock.total_seconds();
    let fuel = &mut state.fuel;
    if fuel.active.len() >= fuel.required_length {
        return false;
    }
    let Some(layer) = fuel.storage.get_mut(tube).and_then(Vec::pop) else {
        return false;
    };
    fuel.active.push(layer);
    events.push(emit(
        &mut state.counters,
        now,
        Event::FuelLayerTransferred { tube, fuel: layer },
    ));
    check_mixture(state, player, constants, events);
    true
}

/// Accepts the active tube if it equals `player`'s current or previous target.
pub fn check_mixture(
    state: &mut GameState,
    player: Player,
    constants: &Constants,
    events: &mut Vec<EventEnvelope>,
) -> bool {
    let fuel = &state.fuel;
    if fuel.active.is_empty() {
        return false;
    }
    let matches_current = fuel.active == *fuel.targets.get(player);
    let matches_previous = !matches_current && fuel.active == *fuel.previous_targets.get(player);
    if !matches_current && !matches_previous {
        return false;
    }

    let now = state.clock.total_seconds();
    state.fuel.active.clear();
    let added = state.ship.fuel.apply(constants.fuel_per_mixture);
    events.push(emit(
        &mut state.counters,
        now,
        Event::FuelMixtureAccepted {
            matched_previous: matches_previous,
            fuel_added: added,
        },
    ));
    true
}

pub fn dump_layer(
    state: &mut GameState,
    fuel_penalty: f64,
    constants: &Constants,
    events: &mut Vec<EventEnvelope>,
) -> bool {
    let now = state.clock.total_seconds();
    let fuel = &mut state.fuel;
    if fuel.dump.ready_at > now || fuel.active.pop().is_none() {
        return false;
    }
    fuel.dump = start_cooldown(now, cooldown_secs(FuelAction::Dump, fuel_penalty, constants));
    events.push(emit(
        &mut state.counters,
        now,
        Event::FuelLayersDumped { count: 1 },
    ));
    true
}

pub fn dump_all_layers(
    state: &mut GameState,
    fuel_penalty: f64,
    constants: &Constants,
    events: &mut Vec<EventEnvelope>,
) -> bool {
    let now = state.clock.total_seconds();
    let fuel = &mut state.fuel;
    if fuel.dump_all.ready_at > now || fuel.active.is_empty() {
        return false;
    }
    let count = fuel.active.len();
    fuel.active.clear();
    fuel.dump_all = start_cooldown(
        now,
        cooldown_secs(FuelAction::DumpAll, fuel_penalty, constants),
    );
    events.push(emit(
        &mut state.counters,
        now,
        Event::FuelLayersDumped { count },
    ));
    true
}

/// Empties the storage tubes and arms the refuel timer.
pub fn start_refuel(
    state: &mut GameState,
    fuel_penalty: f64,
    constants: &Constants,
    events: &mut Vec<EventEnvelope>,
) -> bool {
    let now = state.clock.total_seconds();
    let fuel = &mut state.fuel;
    if fuel.refuel_pending || fuel.refuel.ready_at > now {
        return false;
    }
    for tube in &mut fuel.storage {
        tube.clear();
    }
    fuel.refuel = start_cooldown(now, cooldown_secs(FuelAction::Refuel, fuel_penalty, constants));
    fuel.refuel_pending = true;
    let ready_at = fuel.refuel.ready_at;
    events.push(emit(
        &mut state.counters,
        now,
        Event::RefuelStarted { ready_at },
    ));
    true
}

/// Refills empty storage tubes once the refuel timer has expired.
pub fn complete_refuel(
    state: &mut GameState,
    constants: &Constants,
    rng: &mut impl Rng,
    events: &mut Vec<EventEnvelope>,
) -> bool {
    let now = state.clock.total_seconds();
    let fuel = &mut state.fuel;
    if !fuel.refuel_pending || now < fuel.refuel.ready_at {
        return false;
    }
    if fuel.storage.iter().any(|tube| !tube.is_empty()) {
        return false;
    }
    fuel.storage = random_storage(rng, constants);
    fuel.refuel_pending = false;
    events.push(emit(&mut state.counters, now, Event::RefuelCompleted));
    true
}
