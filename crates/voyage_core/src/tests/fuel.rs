use super::*;
use crate::fuel::{
    complete_refuel, cooldown_secs, dump_all_layers, dump_layer, generate_target, rotate_targets,
    start_refuel, targets_for_period, transfer_layer, FuelAction,
};

fn cooldowns(penalty: f64) -> (u64, u64, u64) {
    let constants = test_content().constants;
    (
        cooldown_secs(FuelAction::Refuel, penalty, &constants),
        cooldown_secs(FuelAction::Dump, penalty, &constants),
        cooldown_secs(FuelAction::DumpAll, penalty, &constants),
    )
}

#[test]
fn cooldowns_scale_only_above_neutral() {
    assert_eq!(cooldowns(1.0), (20, 3, 20));
    assert_eq!(cooldowns(1.5), (15, 3, 30));
    assert_eq!(cooldowns(2.0), (20, 4, 40));
    assert_eq!(cooldowns(4.0), (40, 8, 80));
}

#[test]
fn target_sequence_is_deterministic() {
    assert_eq!(generate_target(12345, 5), generate_target(12345, 5));
    let short = generate_target(67890, 3);
    let long = generate_target(67890, 5);
    assert_eq!(&long[..3], short.as_slice());

    let targets = targets_for_period(4, 4);
    assert_eq!(targets.albatross, generate_target(12345 + 4, 4));
    assert_eq!(targets.kestrel, generate_target(67890 + 4, 4));
}

#[test]
fn fresh_mixture_remembers_its_own_target() {
    let content = test_content();
    let state = test_state(&content);
    assert_eq!(state.fuel.previous_targets, state.fuel.targets);
    assert_eq!(state.fuel.previous_targets.kestrel.len(), 3);
}

#[test]
fn targets_rotate_each_period() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut events = Vec::new();
    let original = state.fuel.targets.clone();

    state.clock = GameClock::from_total_seconds(29);
    assert!(!rotate_targets(&mut state, &content.constants, &mut events));

    state.clock = GameClock::from_total_seconds(30);
    assert!(rotate_targets(&mut state, &content.constants, &mut events));
    assert_eq!(state.fuel.target_period, 1);
    assert_eq!(state.fuel.previous_targets, original);
    assert_eq!(state.fuel.targets, targets_for_period(1, 3));
}

#[test]
fn previous_target_still_accepted_after_quadrant_change() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut events = Vec::new();
    let old_target = state.fuel.targets.albatross.clone();
    assert_eq!(old_target.len(), 3);

    set_traveled(&mut state, 260.0);
    assert!(rotate_targets(&mut state, &content.constants, &mut events));
    assert_eq!(state.fuel.required_length, 4);

    state.fuel.storage[0] = old_target.iter().rev().copied().collect();
    state.ship.fuel.set(50.0);
    for _ in 0..3 {
        assert!(transfer_layer(
            &mut state,
            0,
            Player::Albatross,
            &content.constants,
            &mut events
        ));
    }

    assert!(state.fuel.active.is_empty());
    assert!((state.ship.fuel.current - 100.0).abs() < 1e-9);
    assert!(has_event(&events, |e| matches!(
        e,
        Event::FuelMixtureAccepted {
            matched_previous: true,
            fuel_added,
        } if (*fuel_added - 50.0).abs() < 1e-9
    )));
}

#[test]
fn full_active_tube_refuses_transfer() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut events = Vec::new();
    state.fuel.targets = PerPlayer {
        albatross: vec![FuelType::Hydrogen; 3],
        kestrel: vec![FuelType::Hydrogen; 3],
    };
    state.fuel.active = vec![FuelType::Xenon; 3];
    let storage_before = state.fuel.storage.clone();

    assert!(!transfer_layer(
        &mut state,
        1,
        Player::Albatross,
        &content.constants,
        &mut events
    ));
    assert_eq!(state.fuel.storage, storage_before);
    assert!(events.is_empty());
}

#[test]
fn transfer_from_missing_or_empty_tube_is_ignored() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut events = Vec::new();
    state.fuel.storage[2].clear();
    assert!(!transfer_layer(&mut state, 2, Player::Albatross, &content.constants, &mut events));
    assert!(!transfer_layer(&mut state, 9, Player::Albatross, &content.constants, &mut events));
    assert!(state.fuel.active.is_empty());
}

#[test]
fn dump_respects_cooldown() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut events = Vec::new();
    state.fuel.active = vec![FuelType::Helium, FuelType::Xenon];

    assert!(dump_layer(&mut state, 1.0, &content.constants, &mut events));
    assert_eq!(state.fuel.active, vec![FuelType::Helium]);
    assert_eq!(state.fuel.dump.ready_at, 3);
    assert!(!dump_layer(&mut state, 1.0, &content.constants, &mut events));

    state.clock = GameClock::from_total_seconds(3);
    assert!(dump_layer(&mut state, 1.0, &content.constants, &mut events));
    assert!(state.fuel.active.is_empty());
}

#[test]
fn dump_all_clears_active_tube() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut events = Vec::new();
    state.fuel.active = vec![FuelType::Plutonium; 2];

    assert!(dump_all_layers(&mut state, 2.0, &content.constants, &mut events));
    assert!(state.fuel.active.is_empty());
    assert_eq!(state.fuel.dump_all.ready_at, 40);
    assert!(has_event(&events, |e| matches!(
        e,
        Event::FuelLayersDumped { count: 2 }
    )));
}

#[test]
fn refuel_cycle_refills_storage() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();
    let mut events = Vec::new();

    assert!(start_refuel(&mut state, 1.0, &content.constants, &mut events));
    assert!(state.fuel.storage.iter().all(Vec::is_empty));
    assert!(state.fuel.refuel_pending);
    assert!(!start_refuel(&mut state, 1.0, &content.constants, &mut events));

    state.clock = GameClock::from_total_seconds(19);
    assert!(!complete_refuel(&mut state, &content.constants, &mut rng, &mut events));

    state.clock = GameClock::from_total_seconds(20);
    assert!(complete_refuel(&mut state, &content.constants, &mut rng, &mut events));
    assert!(!state.fuel.refuel_pending);
    assert_eq!(state.fuel.storage.len(), 4);
    assert!(state.fuel.storage.iter().all(|tube| tube.len() == 5));
}
