use super::*;

fn apply(state: &mut GameState, content: &GameContent, player: Player, cmd: Command) -> Vec<EventEnvelope> {
    let envelope = command(state, player, cmd);
    apply_command(state, &envelope, content)
}

fn first_panel(state: &GameState) -> PanelId {
    state.engineering.panels.keys().next().cloned().unwrap()
}

#[test]
fn selecting_kestrel_resets_to_kestrel_solution() {
    let content = test_content();
    let mut state = test_state(&content);
    let events = apply(&mut state, &content, Player::Kestrel, Command::SelectPlayer);

    assert_eq!(state.meta.local_player, Some(Player::Kestrel));
    assert_eq!(state.active_player(), Player::Kestrel);
    assert_eq!(state.navigation.current, state.navigation.correct.kestrel);
    assert_eq!(state.engineering.total_incorrect(Player::Kestrel), 0);
    assert!(has_event(&events, |e| matches!(
        e,
        Event::PlayerSelected {
            player: Player::Kestrel
        }
    )));
}

#[test]
fn self_loop_wiring_is_rejected() {
    let content = test_content();
    let mut state = test_state(&content);
    let panel = first_panel(&state);
    let before = state.engineering.clone();
    let node = Endpoint::new(NodeKind::Node, 2);

    let events = apply(
        &mut state,
        &content,
        Player::Albatross,
        Command::SetWiringConnections {
            panel,
            connections: vec![Connection::new(node, node)],
        },
    );
    assert!(events.is_empty());
    assert_eq!(state.engineering, before);
}

#[test]
fn out_of_range_endpoint_is_rejected() {
    let content = test_content();
    let mut state = test_state(&content);
    let panel = first_panel(&state);
    let before = state.engineering.clone();

    let events = apply(
        &mut state,
        &content,
        Player::Albatross,
        Command::SetWiringConnections {
            panel,
            connections: vec![Connection::new(
                Endpoint::new(NodeKind::Input, 4),
                Endpoint::new(NodeKind::Node, 0),
            )],
        },
    );
    assert!(events.is_empty());
    assert_eq!(state.engineering, before);
}

#[test]
fn unknown_panel_is_rejected() {
    let content = test_content();
    let mut state = test_state(&content);
    let events = apply(
        &mut state,
        &content,
        Player::Albatross,
        Command::SetWiringConnections {
            panel: PanelId("ZZZZ".to_string()),
            connections: Vec::new(),
        },
    );
    assert!(events.is_empty());
}

#[test]
fn partial_rewire_reports_remaining_errors() {
    let content = test_content();
    let mut state = test_state(&content);
    let panel = first_panel(&state);
    let correct = state.engineering.panels[&panel].correct.albatross.clone();

    let events = apply(
        &mut state,
        &content,
        Player::Albatross,
        Command::SetWiringConnections {
            panel: panel.clone(),
            connections: correct[1..].to_vec(),
        },
    );
    assert!(has_event(&events, |e| matches!(
        e,
        Event::WiringChanged {
            incorrect: 1,
            repaired: false,
            ..
        }
    )));
    assert_eq!(
        state.engineering.panels[&panel].last_disruption,
        Some(DisruptionSource::User)
    );

    let events = apply(
        &mut state,
        &content,
        Player::Albatross,
        Command::SetWiringConnections {
            panel: panel.clone(),
            connections: correct,
        },
    );
    assert!(has_event(&events, |e| matches!(
        e,
        Event::WiringChanged { repaired: true, .. }
    )));
    assert_eq!(state.engineering.panels[&panel].last_disruption, None);
}

#[test]
fn non_finite_navigation_value_is_rejected() {
    let content = test_content();
    let mut state = test_state(&content);
    let before = state.navigation.current;
    for value in [f64::NAN, f64::INFINITY] {
        let events = apply(
            &mut state,
            &content,
            Player::Albatross,
            Command::SetNavigationAxis {
                axis: Axis::Yaw,
                value,
            },
        );
        assert!(events.is_empty());
    }
    assert_eq!(state.navigation.current, before);
}

#[test]
fn resume_outside_break_is_ignored() {
    let content = test_content();
    let mut state = test_state(&content);
    let events = apply(&mut state, &content, Player::Albatross, Command::ResumeJourney);
    assert!(events.is_empty());
}

#[test]
fn raise_and_dismiss_manual_alert() {
    let content = test_content();
    let mut state = test_state(&content);
    let events = apply(
        &mut state,
        &content,
        Player::Kestrel,
        Command::RaiseAlert {
            name: "Smoke in cargo".to_string(),
            description: "Send someone".to_string(),
            severity: AlertSeverity::Warning,
            effects: Vec::new(),
        },
    );
    assert_eq!(events.len(), 1);
    assert_eq!(state.alerts.manual.len(), 1);
    let alert_id = state.alerts.manual[0].id.clone();
    assert_eq!(state.alerts.manual[0].owner, Player::Kestrel);

    let events = apply(
        &mut state,
        &content,
        Player::Albatross,
        Command::DismissAlert {
            alert_id: alert_id.clone(),
        },
    );
    assert!(has_event(&events, |e| matches!(
        e,
        Event::AlertCleared { alert_id: cleared } if *cleared == alert_id
    )));
    assert!(state.alerts.manual.is_empty());

    let again = apply(
        &mut state,
        &content,
        Player::Albatross,
        Command::DismissAlert { alert_id },
    );
    assert!(again.is_empty());
}

#[test]
fn blank_alert_name_is_rejected() {
    let content = test_content();
    let mut state = test_state(&content);
    let events = apply(
        &mut state,
        &content,
        Player::Albatross,
        Command::RaiseAlert {
            name: "   ".to_string(),
            description: String::new(),
            severity: AlertSeverity::Danger,
            effects: Vec::new(),
        },
    );
    assert!(events.is_empty());
    assert!(state.alerts.manual.is_empty());
}

#[test]
fn distance_override_moves_the_ship() {
    let content = test_content();
    let mut state = test_state(&content);
    apply(
        &mut state,
        &content,
        Player::Albatross,
        Command::SetDistanceTraveled { traveled: 600.0 },
    );
    assert!((state.ship.distance_traveled() - 600.0).abs() < 1e-9);

    // Stage catches up on the next tick.
    let mut rng = make_rng();
    state.ship.on_break = true;
    tick(&mut state, &content, &mut rng);
    assert_eq!(state.navigation.stage, Quadrant::Gamma);
}

#[test]
fn batch_applies_in_order() {
    let content = test_content();
    let mut state = test_state(&content);
    let batch = vec![
        command(&state, Player::Kestrel, Command::SelectPlayer),
        command(&state, Player::Albatross, Command::SelectPlayer),
    ];
    let events = apply_commands(&mut state, &batch, &content);
    assert_eq!(events.len(), 2);
    assert_eq!(state.meta.local_player, Some(Player::Albatross));
}
