use std::collections::VecDeque;

use super::*;
use crate::disaster::{candidate_pool, check_due, draw, fire, BOOTSTRAP_DISASTER};

fn weight(disaster: DisasterKind, weight: u32) -> DisasterWeight {
    DisasterWeight { disaster, weight }
}

fn at(state: &mut GameState, seconds: u64) {
    state.clock = GameClock::from_total_seconds(seconds);
}

#[test]
fn catastrophic_entries_suppressed_after_catastrophic() {
    let weights = vec![
        weight(DisasterKind::MinorRewire, 2),
        weight(DisasterKind::Sabotage, 5),
        weight(DisasterKind::AsteroidCluster, 1),
    ];
    let history = VecDeque::from([DisasterSeverity::Major, DisasterSeverity::Catastrophic]);
    let pool = candidate_pool(&weights, &history);
    assert_eq!(pool, vec![weight(DisasterKind::MinorRewire, 2)]);

    let calm = VecDeque::from([DisasterSeverity::Catastrophic, DisasterSeverity::Minor]);
    assert_eq!(candidate_pool(&weights, &calm).len(), 3);
}

#[test]
fn suppression_falls_back_to_full_pool() {
    let weights = vec![
        weight(DisasterKind::Sabotage, 5),
        weight(DisasterKind::NavMisalign, 0),
    ];
    let history = VecDeque::from([DisasterSeverity::Catastrophic]);
    assert_eq!(candidate_pool(&weights, &history), weights);
}

#[test]
fn draw_respects_zero_weights() {
    let mut rng = make_rng();
    let pool = vec![
        weight(DisasterKind::PowerSurge, 0),
        weight(DisasterKind::MajorRewire, 3),
    ];
    for _ in 0..50 {
        assert_eq!(draw(&pool, &mut rng), Some(DisasterKind::MajorRewire));
    }
    assert_eq!(draw(&[], &mut rng), None);
}

#[test]
fn nothing_fires_before_first_trigger_time() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();
    let mut events = Vec::new();
    at(&mut state, 29);
    assert_eq!(check_due(&mut state, &content, &mut rng, &mut events), None);
    assert!(events.is_empty());
    assert!(!state.disasters.has_fired_first);
}

#[test]
fn bootstrap_disaster_fires_at_thirty_seconds() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();
    let mut events = Vec::new();
    at(&mut state, 30);

    let fired = check_due(&mut state, &content, &mut rng, &mut events);
    assert_eq!(fired, Some(BOOTSTRAP_DISASTER));
    assert_eq!(fired, Some(DisasterKind::MajorAsteroid));
    assert!(state.disasters.has_fired_first);
    assert!((60..=90).contains(&state.disasters.next_fire_at));
    assert!((3..=5).contains(&state.hazards.len()));
    assert_eq!(state.disasters.fired, 1);
    assert!(has_event(&events, |e| matches!(
        e,
        Event::AnimationRequested {
            hint: AnimationHint::Shake
        }
    )));
}

#[test]
fn break_defers_due_disaster_until_resumed() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();
    let mut events = Vec::new();
    state.disasters.has_fired_first = true;
    state.disasters.next_fire_at = 100;
    state.ship.on_break = true;
    at(&mut state, 120);

    assert_eq!(check_due(&mut state, &content, &mut rng, &mut events), None);
    assert_eq!(state.disasters.next_fire_at, 100);
    assert!(events.is_empty());

    state.ship.on_break = false;
    at(&mut state, 121);
    assert!(check_due(&mut state, &content, &mut rng, &mut events).is_some());
    assert!(state.disasters.next_fire_at >= 151);
    assert!(state.disasters.next_fire_at <= 181);
}

#[test]
fn not_due_before_next_fire_time() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();
    let mut events = Vec::new();
    state.disasters.has_fired_first = true;
    state.disasters.next_fire_at = 75;
    at(&mut state, 74);
    assert_eq!(check_due(&mut state, &content, &mut rng, &mut events), None);
}

#[test]
fn history_is_capped() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();
    let mut events = Vec::new();
    for kind in [
        DisasterKind::PowerSurge,
        DisasterKind::MajorAsteroid,
        DisasterKind::NavMisalign,
        DisasterKind::AsteroidCluster,
        DisasterKind::SingleAsteroid,
    ] {
        fire(&mut state, kind, &content, &mut rng, &mut events);
    }
    assert_eq!(state.disasters.fired, 5);
    assert_eq!(
        state.disasters.history,
        VecDeque::from([
            DisasterSeverity::Minor,
            DisasterSeverity::Catastrophic,
            DisasterSeverity::Minor,
        ])
    );
}

#[test]
fn minor_rewire_cuts_two_edges_per_clean_panel() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();
    let mut events = Vec::new();
    fire(&mut state, DisasterKind::MinorRewire, &content, &mut rng, &mut events);

    for panel in state.engineering.panels.values() {
        assert_eq!(panel.connections.len(), 6);
        assert_eq!(panel.last_disruption, Some(DisruptionSource::Minor));
        assert_eq!(panel.incorrect_count(Player::Albatross), 2);
    }
    let disrupted = events
        .iter()
        .filter(|e| matches!(e.event, Event::PanelDisrupted { .. }))
        .count();
    assert_eq!(disrupted, 4);
    assert!(state.hazards.is_empty());
}

#[test]
fn minor_rewire_falls_back_to_hazards() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();
    let mut events = Vec::new();
    for panel in state.engineering.panels.values_mut() {
        panel.last_disruption = Some(DisruptionSource::Major);
    }
    let before = state.engineering.clone();

    fire(&mut state, DisasterKind::MinorRewire, &content, &mut rng, &mut events);
    assert_eq!(state.engineering, before);
    assert!((1..=2).contains(&state.hazards.len()));
    assert!(has_event(&events, |e| matches!(
        e,
        Event::DisasterFallback {
            disaster: DisasterKind::MinorRewire,
            ..
        }
    )));
}

#[test]
fn catastrophic_rewire_touches_three_panels() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();
    let mut events = Vec::new();
    fire(
        &mut state,
        DisasterKind::CatastrophicRewire,
        &content,
        &mut rng,
        &mut events,
    );
    let disrupted = events
        .iter()
        .filter(|e| matches!(e.event, Event::PanelDisrupted { .. }))
        .count();
    assert_eq!(disrupted, 3);
    assert_eq!(
        state.disasters.history.back(),
        Some(&DisasterSeverity::Catastrophic)
    );
}

#[test]
fn sabotage_wipes_every_panel() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();
    let mut events = Vec::new();
    at(&mut state, 200);
    fire(&mut state, DisasterKind::Sabotage, &content, &mut rng, &mut events);

    for panel in state.engineering.panels.values() {
        assert!(panel.connections.is_empty());
        assert_eq!(panel.last_disruption, Some(DisruptionSource::Catastrophic));
    }
    assert_eq!(state.hazards.len(), 5);
    for hazard in &state.hazards {
        assert!((2..=4).contains(&hazard.layers.len()));
        assert!(hazard.impact_at >= 200 + 48);
    }
}

#[test]
fn power_surge_drains_battery_with_floor() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();
    let mut events = Vec::new();
    state.ship.battery.set(20.0);
    fire(&mut state, DisasterKind::PowerSurge, &content, &mut rng, &mut events);
    assert!(state.ship.battery.current.abs() < 1e-9);
    assert!(has_event(&events, |e| matches!(
        e,
        Event::PowerDrained { amount } if (*amount - 20.0).abs() < 1e-9
    )));
}

#[test]
fn misalignment_moves_one_axis_by_one() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();
    let mut events = Vec::new();
    let before = state.navigation.current;
    fire(&mut state, DisasterKind::NavMisalign, &content, &mut rng, &mut events);

    let total_shift: f64 = Axis::ALL
        .iter()
        .map(|axis| (state.navigation.current.get(*axis) - before.get(*axis)).abs())
        .sum();
    assert!((total_shift - 1.0).abs() < 1e-9);
    assert!(has_event(&events, |e| matches!(
        e,
        Event::AnimationRequested {
            hint: AnimationHint::Slide
        }
    )));
}

fn disrupted_panels(events: &[EventEnvelope]) -> Vec<PanelId> {
    events
        .iter()
        .filter_map(|e| match &e.event {
            Event::PanelDisrupted { panel, .. } => Some(panel.clone()),
            _ => None,
        })
        .collect()
}

fn layered_at_least(state: &GameState, layers: usize) -> usize {
    state
        .hazards
        .iter()
        .filter(|h| h.layers.len() >= layers)
        .count()
}

fn impact_delays_within(state: &GameState, now: u64, range: std::ops::RangeInclusive<u64>) -> bool {
    state
        .hazards
        .iter()
        .all(|h| range.contains(&(h.impact_at - now)))
}

#[test]
fn minor_rewire_leaves_player_edited_panel_alone() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();
    let mut events = Vec::new();
    let panel_id = PanelId(PANEL_NAMES[1].to_string());
    let mut wiring = state.engineering.panels[&panel_id].correct.albatross.clone();
    wiring.pop();
    state.engineering.set_connections(
        &panel_id,
        wiring.clone(),
        DisruptionSource::User,
        Player::Albatross,
    );

    fire(&mut state, DisasterKind::MinorRewire, &content, &mut rng, &mut events);

    let panel = &state.engineering.panels[&panel_id];
    assert_eq!(panel.connections, wiring);
    assert_eq!(panel.last_disruption, Some(DisruptionSource::User));
    assert_eq!(disrupted_panels(&events).len(), 3);
    assert!(!disrupted_panels(&events).contains(&panel_id));
}

#[test]
fn minor_rewire_skips_unwired_panels() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();
    let mut events = Vec::new();
    let empty_id = PanelId(PANEL_NAMES[0].to_string());
    state
        .engineering
        .panels
        .get_mut(&empty_id)
        .unwrap()
        .connections
        .clear();

    fire(&mut state, DisasterKind::MinorRewire, &content, &mut rng, &mut events);

    assert_eq!(state.engineering.panels[&empty_id].last_disruption, None);
    assert_eq!(disrupted_panels(&events).len(), 3);
    assert!(state.hazards.is_empty());
}

#[test]
fn minor_rewire_with_only_unwired_panels_spawns_hazards() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();
    let mut events = Vec::new();
    for panel in state.engineering.panels.values_mut() {
        panel.connections.clear();
    }

    fire(&mut state, DisasterKind::MinorRewire, &content, &mut rng, &mut events);

    assert!(disrupted_panels(&events).is_empty());
    assert!((1..=2).contains(&state.hazards.len()));
    assert!(state
        .engineering
        .panels
        .values()
        .all(|p| p.last_disruption.is_none()));
}

#[test]
fn major_rewire_splits_edits_across_two_panels() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();
    let mut events = Vec::new();
    let before = state.engineering.clone();

    fire(&mut state, DisasterKind::MajorRewire, &content, &mut rng, &mut events);

    let touched = disrupted_panels(&events);
    assert_eq!(touched.len(), 2);
    assert_ne!(touched[0], touched[1]);

    // The second panel takes a single edit, which always breaks one edge.
    let single = &state.engineering.panels[&touched[1]];
    assert_eq!(single.incorrect_count(Player::Albatross), 1);
    assert_eq!(single.last_disruption, Some(DisruptionSource::Major));
    assert!(state.engineering.panels[&touched[0]].incorrect_count(Player::Albatross) <= 2);

    for (id, panel) in &state.engineering.panels {
        if !touched.contains(id) {
            assert_eq!(panel, &before.panels[id]);
        }
    }
    assert!(state.hazards.is_empty());
}

#[test]
fn major_rewire_puts_both_edits_on_the_only_eligible_panel() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();
    let mut events = Vec::new();
    let ids: Vec<PanelId> = state.engineering.panels.keys().cloned().collect();
    for id in &ids[1..] {
        state.engineering.panels.get_mut(id).unwrap().last_disruption =
            Some(DisruptionSource::Catastrophic);
    }
    let before = state.engineering.clone();

    fire(&mut state, DisasterKind::MajorRewire, &content, &mut rng, &mut events);

    assert_eq!(disrupted_panels(&events), vec![ids[0].clone()]);
    for id in &ids[1..] {
        assert_eq!(state.engineering.panels[id], before.panels[id]);
    }
    assert!(state.hazards.is_empty());
}

#[test]
fn major_rewire_falls_back_to_one_large_hazard() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();
    let mut events = Vec::new();
    for panel in state.engineering.panels.values_mut() {
        panel.last_disruption = Some(DisruptionSource::Catastrophic);
    }
    let before = state.engineering.clone();

    fire(&mut state, DisasterKind::MajorRewire, &content, &mut rng, &mut events);

    assert_eq!(state.engineering, before);
    assert!((2..=3).contains(&state.hazards.len()));
    // Small hazards carry at most two layers, large ones at least three.
    assert_eq!(layered_at_least(&state, 3), 1);
    assert!(has_event(&events, |e| matches!(
        e,
        Event::DisasterFallback {
            disaster: DisasterKind::MajorRewire,
            ..
        }
    )));
}

#[test]
fn catastrophic_rewire_without_panels_spawns_a_slow_cluster() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();
    let mut events = Vec::new();
    state.engineering.panels.clear();
    at(&mut state, 100);

    fire(
        &mut state,
        DisasterKind::CatastrophicRewire,
        &content,
        &mut rng,
        &mut events,
    );

    assert!((5..=7).contains(&state.hazards.len()));
    assert!((2..=4).contains(&layered_at_least(&state, 3)));
    assert!(layered_at_least(&state, 2) >= 3);
    assert!(impact_delays_within(&state, 100, 52..=117));
    assert!(has_event(&events, |e| matches!(
        e,
        Event::DisasterFallback {
            disaster: DisasterKind::CatastrophicRewire,
            ..
        }
    )));
}

#[test]
fn three_minors_counts_as_one_catastrophic_disaster() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();
    let mut events = Vec::new();

    fire(&mut state, DisasterKind::ThreeMinors, &content, &mut rng, &mut events);

    let triggered: Vec<DisasterKind> = events
        .iter()
        .filter_map(|e| match e.event {
            Event::DisasterTriggered { disaster, .. } => Some(disaster),
            _ => None,
        })
        .collect();
    assert_eq!(triggered, vec![DisasterKind::ThreeMinors]);
    assert_eq!(state.disasters.fired, 1);
    assert_eq!(
        state.disasters.history,
        VecDeque::from([DisasterSeverity::Catastrophic])
    );

    // The trailing pair plus anything the minors dropped, all small.
    assert!((2..=11).contains(&state.hazards.len()));
    assert_eq!(layered_at_least(&state, 3), 0);
    let spawned = events
        .iter()
        .filter(|e| matches!(e.event, Event::HazardSpawned { .. }))
        .count();
    assert_eq!(spawned, state.hazards.len());
}

#[test]
fn asteroid_cluster_mixes_sizes_and_delays_impact() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();
    let mut events = Vec::new();
    at(&mut state, 100);

    fire(
        &mut state,
        DisasterKind::AsteroidCluster,
        &content,
        &mut rng,
        &mut events,
    );

    assert!((7..=10).contains(&state.hazards.len()));
    assert!((2..=6).contains(&layered_at_least(&state, 3)));
    assert!(layered_at_least(&state, 2) >= 3);
    assert!(impact_delays_within(&state, 100, 60..=135));
    assert!(state.engineering.panels.values().all(|p| p.last_disruption.is_none()));
}

#[test]
fn catalog_names_match_the_game_log() {
    assert_eq!(DisasterKind::SingleAsteroid.name(), "Single Asteroid");
    assert_eq!(DisasterKind::MinorRewire.name(), "Minor Engineering Rewire");
    assert_eq!(DisasterKind::MajorAsteroid.name(), "Major Asteroid Swarm");
    assert_eq!(DisasterKind::MajorRewire.name(), "Major Engineering Rewire");
    assert_eq!(
        DisasterKind::CatastrophicRewire.name(),
        "Catastrophic Engineering Failure"
    );
    assert_eq!(DisasterKind::ThreeMinors.name(), "Three Minor Disasters");
}
