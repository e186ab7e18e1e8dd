//! Shared test fixtures for `voyage_core` and downstream crates.
//!
//! `base_content()` mirrors the shipped `content/` directory so tests see the
//! real tuning. `base_state()` is a fresh ship at the start of the journey.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::navigation::targets_for;
use crate::{
    AlertBoard, Constants, Counters, DisasterKind, DisasterSchedule, DisasterWeight,
    EngineeringState, FuelCooldowns, FuelMixtureState, GameContent, GameState, MetaState,
    NavigationState, NavigationValues, PenaltyMultipliers, PerPlayer, Player, Quadrant,
    QuadrantDisasterWeights, QuadrantNavigation, ShipState, TierMultipliers, TierThresholds,
    WeaponsState,
};

pub fn base_constants() -> Constants {
    Constants {
        journey_length: 1000.0,
        quadrant_length: 250.0,
        break_points: vec![250.0, 500.0, 750.0],
        hull_max: 100.0,
        oxygen_max: 100.0,
        fuel_max: 100.0,
        battery_max: 100.0,
        penalty_tiers: TierThresholds {
            light_min: 1,
            medium_min: 3,
            heavy_min: 5,
        },
        penalty_multipliers: PenaltyMultipliers {
            weapons: tiers(1.0, 1.5, 2.0, 5.0),
            thrust: tiers(0.5, 1.25, 1.5, 3.0),
            fuel: tiers(1.0, 1.5, 2.0, 4.0),
            power: tiers(1.0, 1.25, 2.0, 3.0),
        },
        thrust_boost_floor: 0.75,
        power_regen_base: 5.0,
        low_power_ratio: 0.5,
        fuel_burn_per_tick: 1.0,
        base_speed: 2.0,
        low_fuel_fraction: 0.25,
        speed_nav_tolerance: 0.1,
        alert_nav_tolerance: 0.5,
        hazard_imminent_secs: 10,
        hazard_nearby_secs: 30,
        fuel_alert_critical_pct: 0.0,
        fuel_alert_danger_pct: 25.0,
        fuel_alert_warning_pct: 50.0,
        engineering_alert_warning: 1.5,
        engineering_alert_danger: 2.0,
        engineering_alert_critical: 5.0,
        first_disaster_at_secs: 30,
        disaster_refire_min_secs: 30,
        disaster_refire_max_secs: 60,
        disaster_history_len: 3,
        power_surge_drain: 50.0,
        weapon_power_cost: 30.0,
        weapon_hit_cooldown_secs: 1.0,
        weapon_miss_cooldown_secs: 3.0,
        hazard_impact_base_secs: 40.0,
        hazard_impact_spread_secs: 50.0,
        hazard_base_damage: 5.0,
        fuel_per_mixture: 100.0,
        fuel_target_period_secs: 30,
        storage_tube_count: 4,
        storage_tube_layers: 5,
        mixture_length_by_quadrant: [3, 4, 4, 5],
        fuel_cooldowns: FuelCooldowns {
            refuel_default_secs: 20,
            refuel_base_secs: 10,
            dump_default_secs: 3,
            dump_base_secs: 2,
            dump_all_default_secs: 20,
            dump_all_base_secs: 20,
        },
        manual_alert_effect_interval_secs: 600,
    }
}

fn tiers(none: f64, light: f64, medium: f64, heavy: f64) -> TierMultipliers {
    TierMultipliers {
        none,
        light,
        medium,
        heavy,
    }
}

fn nav(pitch: f64, yaw: f64, roll: f64) -> NavigationValues {
    NavigationValues { pitch, yaw, roll }
}

fn weights(entries: &[(DisasterKind, u32)]) -> Vec<DisasterWeight> {
    entries
        .iter()
        .map(|(disaster, weight)| DisasterWeight {
            disaster: *disaster,
            weight: *weight,
        })
        .collect()
}

pub fn base_content() -> GameContent {
    use DisasterKind::{
        AsteroidCluster, CatastrophicRewire, MajorAsteroid, MajorRewire, MinorRewire, NavMisalign,
        Sabotage, SingleAsteroid, ThreeMinors,
    };
    let navigation = vec![
        (Quadrant::Alpha, nav(15.5, 270.0, 0.0), nav(12.3, 275.5, -2.1)),
        (Quadrant::Beta, nav(18.7, 265.2, 1.5), nav(16.1, 272.8, -0.9)),
        (Quadrant::Gamma, nav(14.2, 278.3, -1.2), nav(19.8, 268.7, 2.3)),
        (Quadrant::Delta, nav(17.6, 263.9, 0.8), nav(13.4, 281.2, -1.7)),
    ]
    .into_iter()
    .map(|(quadrant, albatross, kestrel)| QuadrantNavigation {
        quadrant,
        targets: PerPlayer { albatross, kestrel },
    })
    .collect();

    let disaster_weights = vec![
        QuadrantDisasterWeights {
            quadrant: Quadrant::Alpha,
            weights: weights(&[
                (NavMisalign, 3),
                (SingleAsteroid, 5),
                (MinorRewire, 30),
                (MajorAsteroid, 1),
            ]),
        },
        QuadrantDisasterWeights {
            quadrant: Quadrant::Beta,
            weights: weights(&[
                (NavMisalign, 2),
                (SingleAsteroid, 3),
                (MinorRewire, 15),
                (MajorAsteroid, 5),
                (MajorRewire, 4),
                (ThreeMinors, 1),
            ]),
        },
        QuadrantDisasterWeights {
            quadrant: Quadrant::Gamma,
            weights: weights(&[
                (NavMisalign, 1),
                (SingleAsteroid, 2),
                (MinorRewire, 5),
                (MajorAsteroid, 6),
                (MajorRewire, 5),
                (CatastrophicRewire, 2),
                (ThreeMinors, 3),
                (AsteroidCluster, 4),
                (Sabotage, 2),
            ]),
        },
        QuadrantDisasterWeights {
            quadrant: Quadrant::Delta,
            weights: weights(&[
                (SingleAsteroid, 2),
                (MinorRewire, 1),
                (MajorAsteroid, 4),
                (MajorRewire, 4),
                (CatastrophicRewire, 6),
                (ThreeMinors, 5),
                (AsteroidCluster, 7),
                (Sabotage, 5),
            ]),
        },
    ];

    GameContent {
        content_version: "test".to_string(),
        constants: base_constants(),
        navigation,
        disaster_weights,
    }
}

/// Fresh game at 0:00 with Albatross seated and every panel solved.
pub fn base_state(content: &GameContent) -> GameState {
    let mut rng = make_rng();
    let constants = &content.constants;
    let mut engineering = EngineeringState::generate(&mut rng);
    engineering.reset_to(Player::Albatross);
    let targets = targets_for(content, Quadrant::Alpha)
        .cloned()
        .unwrap_or_default();

    GameState {
        meta: MetaState {
            seed: 42,
            schema_version: 1,
            content_version: content.content_version.clone(),
            local_player: Some(Player::Albatross),
            arrived: false,
        },
        clock: crate::GameClock::default(),
        ship: ShipState::new(constants),
        engineering,
        navigation: NavigationState::new(targets, Quadrant::Alpha, Player::Albatross),
        hazards: Vec::new(),
        weapons: WeaponsState::default(),
        fuel: FuelMixtureState::new(&mut rng, constants, 0, 0.0),
        disasters: DisasterSchedule::new(constants),
        alerts: AlertBoard::default(),
        counters: Counters::default(),
    }
}

pub fn make_rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(42)
}
