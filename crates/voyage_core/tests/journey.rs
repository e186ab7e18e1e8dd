//! Long-running invariant checks across several seeds.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use voyage_core::test_fixtures::{base_content, base_state};
use voyage_core::{
    apply_command, tick, Axis, Command, CommandEnvelope, CommandId, GameContent, GameState,
    Player,
};

fn crew_command(state: &GameState, command: Command) -> CommandEnvelope {
    CommandEnvelope {
        id: CommandId(format!("cmd_{:06}", state.counters.next_command_id)),
        issued_by: Player::Albatross,
        issued_at: state.clock.total_seconds(),
        command,
    }
}

/// Re-aims at the current target and leaves any checkpoint break.
fn tend_navigation(state: &mut GameState, content: &GameContent) {
    if !state.ship.on_break {
        return;
    }
    let target = state.navigation.correct.albatross;
    for axis in Axis::ALL {
        let cmd = crew_command(
            state,
            Command::SetNavigationAxis {
                axis,
                value: target.get(axis),
            },
        );
        apply_command(state, &cmd, content);
    }
    let resume = crew_command(state, Command::ResumeJourney);
    apply_command(state, &resume, content);
}

fn assert_invariants(state: &GameState, seed: u64) {
    let now = state.clock.total_seconds();
    for gauge in [
        &state.ship.distance,
        &state.ship.hull_damage,
        &state.ship.oxygen,
        &state.ship.fuel,
        &state.ship.battery,
    ] {
        assert!(
            gauge.current >= 0.0 && gauge.current <= gauge.max,
            "seed {seed} at {now}: gauge out of bounds {gauge:?}"
        );
    }

    for hazard in &state.hazards {
        assert!(!hazard.layers.is_empty(), "seed {seed}: empty hazard registered");
        assert!(hazard.impact_at > hazard.spawned_at);
        assert!(hazard.impact_at > now, "seed {seed}: overdue hazard {}", hazard.id);
    }

    let ids: Vec<&str> = state
        .alerts
        .automatic
        .keys()
        .map(|id| id.0.as_str())
        .collect();
    for family in ["asteroid", "fuel-", "navigation-", "weapons-", "thrust-", "power-"] {
        let count = ids.iter().filter(|id| id.starts_with(family)).count();
        let limit = if family == "power-" { 2 } else { 1 };
        assert!(count <= limit, "seed {seed}: {count} alerts in family {family}");
    }
}

#[test]
fn invariants_hold_over_long_runs() {
    let content = base_content();
    for seed in 1..=5 {
        let mut state = base_state(&content);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut last_traveled = 0.0;
        for _ in 0..900 {
            tend_navigation(&mut state, &content);
            tick(&mut state, &content, &mut rng);
            assert_invariants(&state, seed);

            let traveled = state.ship.distance_traveled();
            assert!(traveled + 1e-9 >= last_traveled, "seed {seed}: ship moved backwards");
            last_traveled = traveled;
        }
        assert!(state.disasters.fired >= 1, "seed {seed}: no disaster fired");
        assert!(
            state.disasters.history.len() <= content.constants.disaster_history_len,
            "seed {seed}: history overflow"
        );
    }
}

#[test]
fn unattended_ship_runs_dry() {
    let content = base_content();
    let mut state = base_state(&content);
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    for _ in 0..300 {
        tick(&mut state, &content, &mut rng);
    }
    assert!(state.ship.fuel.is_empty());
    assert!(state.ship.distance_traveled() < 250.0);
    assert!(state
        .alerts
        .automatic
        .keys()
        .any(|id| id.0 == "fuel-empty"));

    let traveled = state.ship.distance_traveled();
    tick(&mut state, &content, &mut rng);
    assert!((state.ship.distance_traveled() - traveled).abs() < 1e-9);
}
