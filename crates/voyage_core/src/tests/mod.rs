use super::*;
use crate::test_fixtures::{base_content, base_state, make_rng};

mod commands;
mod disaster;
mod fuel;

// --- Shared test helpers ------------------------------------------------

fn test_content() -> GameContent {
    base_content()
}

fn test_state(content: &GameContent) -> GameState {
    base_state(content)
}

fn command(state: &GameState, player: Player, command: Command) -> CommandEnvelope {
    CommandEnvelope {
        id: CommandId(format!("cmd_{:06}", state.counters.next_command_id)),
        issued_by: player,
        issued_at: state.clock.total_seconds(),
        command,
    }
}

/// Drops the first `missing` correct edges from the panel driving `system`
/// for the active ship.
fn break_panel(state: &mut GameState, system: ShipSystem, missing: usize) -> PanelId {
    let player = state.active_player();
    let panel_id = state.engineering.bindings.get(player)[&system].clone();
    let panel = state.engineering.panels.get_mut(&panel_id).unwrap();
    panel.connections = panel.correct.get(player)[missing..].to_vec();
    panel_id
}

fn hazard(id: &str, layers: Vec<MaterialType>, impact_at: u64) -> Hazard {
    let initial_layer_count = layers.len();
    Hazard {
        id: HazardId(id.to_string()),
        layers,
        spawned_at: 0,
        impact_at,
        position: Position { x: 100.0, y: 100.0 },
        size: 50.0,
        initial_layer_count,
    }
}

fn set_traveled(state: &mut GameState, traveled: f64) {
    let max = state.ship.distance.max;
    state.ship.distance.set(max - traveled);
}

fn has_event(events: &[EventEnvelope], predicate: impl Fn(&Event) -> bool) -> bool {
    events.iter().any(|e| predicate(&e.event))
}
