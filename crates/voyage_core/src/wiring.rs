//! Engineering panels: correct wiring per ship, current wiring, and the
//! provenance rules that gate disruptive edits.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::{
    Connection, DisruptionSource, EngineeringState, Endpoint, NodeKind, Panel, PanelId, PerPlayer,
    Player, ShipSystem, ENDPOINTS_PER_CLASS, PANEL_NAMES,
};

impl Connection {
    pub fn new(from: Endpoint, to: Endpoint) -> Self {
        Self { from, to }
    }

    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }

    pub fn endpoints_in_range(&self) -> bool {
        self.from.index < ENDPOINTS_PER_CLASS && self.to.index < ENDPOINTS_PER_CLASS
    }
}

impl Endpoint {
    pub fn new(kind: NodeKind, index: u8) -> Self {
        Self { kind, index }
    }
}

/// Builds one random solution: every input feeds a distinct intermediate node
/// and every intermediate node feeds a distinct output.
pub fn random_correct_wiring(rng: &mut impl Rng) -> Vec<Connection> {
    let mut nodes: Vec<u8> = (0..ENDPOINTS_PER_CLASS).collect();
    let mut outputs: Vec<u8> = (0..ENDPOINTS_PER_CLASS).collect();
    nodes.shuffle(rng);
    outputs.shuffle(rng);

    let mut connections = Vec::with_capacity(usize::from(ENDPOINTS_PER_CLASS) * 2);
    for (input, node) in nodes.iter().enumerate() {
        connections.push(Connection::new(
            Endpoint::new(NodeKind::Input, index_u8(input)),
            Endpoint::new(NodeKind::Node, *node),
        ));
    }
    for (node, output) in outputs.iter().enumerate() {
        connections.push(Connection::new(
            Endpoint::new(NodeKind::Node, index_u8(node)),
            Endpoint::new(NodeKind::Output, *output),
        ));
    }
    connections
}

fn index_u8(index: usize) -> u8 {
    u8::try_from(index).unwrap_or(u8::MAX)
}

/// Whether a disruption of `incoming` may edit a panel last disrupted by
/// `current`. Minor only touches panels with no recorded source; major and
/// catastrophic may stack onto their own rank.
pub fn can_disrupt(current: Option<DisruptionSource>, incoming: DisruptionSource) -> bool {
    let Some(current) = current else {
        return true;
    };
    match incoming {
        DisruptionSource::User | DisruptionSource::Minor => false,
        DisruptionSource::Major | DisruptionSource::Catastrophic => current <= incoming,
    }
}

impl Panel {
    /// Correct edges for `player` that are missing from the current wiring.
    /// Extra edges are not counted.
    pub fn incorrect_count(&self, player: Player) -> u32 {
        let missing = self
            .correct
            .get(player)
            .iter()
            .filter(|edge| !self.connections.contains(edge))
            .count();
        u32::try_from(missing).unwrap_or(u32::MAX)
    }

    pub fn matches_correct(&self, player: Player) -> bool {
        self.connections.len() == self.correct.get(player).len() && self.incorrect_count(player) == 0
    }
}

impl EngineeringState {
    /// Fresh panels with random solutions for both ships and distinct
    /// panel-to-system bindings. Current wiring starts solved for Albatross.
    pub fn generate(rng: &mut impl Rng) -> Self {
        let mut panels = BTreeMap::new();
        for name in PANEL_NAMES {
            let correct = PerPlayer {
                albatross: random_correct_wiring(rng),
                kestrel: random_correct_wiring(rng),
            };
            panels.insert(
                PanelId(name.to_string()),
                Panel {
                    connections: correct.albatross.clone(),
                    correct,
                    last_disruption: None,
                },
            );
        }

        let mut albatross_order: Vec<PanelId> = panels.keys().cloned().collect();
        albatross_order.shuffle(rng);
        let mut kestrel_order = albatross_order.clone();
        kestrel_order.shuffle(rng);
        if kestrel_order == albatross_order {
            kestrel_order.rotate_left(1);
        }

        let bind = |order: Vec<PanelId>| -> BTreeMap<ShipSystem, PanelId> {
            ShipSystem::ALL.into_iter().zip(order).collect()
        };

        Self {
            panels,
            bindings: PerPlayer {
                albatross: bind(albatross_order),
                kestrel: bind(kestrel_order),
            },
        }
    }

    pub fn panel_for(&self, system: ShipSystem, player: Player) -> Option<(&PanelId, &Panel)> {
        let panel_id = self.bindings.get(player).get(&system)?;
        self.panels.get_key_value(panel_id)
    }

    /// Replaces a panel's wiring. A panel that now matches `player`'s solution
    /// is repaired and loses its disruption source; otherwise `source` is
    /// recorded when the hierarchy allows it. Returns `None` for an unknown
    /// panel, else whether the panel ended up repaired.
    pub fn set_connections(
        &mut self,
        panel_id: &PanelId,
        connections: Vec<Connection>,
        source: DisruptionSource,
        player: Player,
    ) -> Option<bool> {
        let panel = self.panels.get_mut(panel_id)?;
        panel.connections = connections;
        if panel.matches_correct(player) {
            panel.last_disruption = None;
            return Some(true);
        }
        if can_disrupt(panel.last_disruption, source) {
            panel.last_disruption = Some(source);
        }
        Some(false)
    }

    /// Panels a disruption of `source` may currently edit, in name order.
    pub fn eligible_panels(&self, source: DisruptionSource) -> Vec<PanelId> {
        self.panels
            .iter()
            .filter(|(_, panel)| can_disrupt(panel.last_disruption, source))
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Restores every panel to `player`'s solution.
    pub fn reset_to(&mut self, player: Player) {
        for panel in self.panels.values_mut() {
            panel.connections.clone_from(panel.correct.get(player));
            panel.last_disruption = None;
        }
    }

    pub fn total_incorrect(&self, player: Player) -> u32 {
        self.panels.values().map(|p| p.incorrect_count(player)).sum()
    }

    pub fn any_errors(&self, player: Player) -> bool {
        self.panels.values().any(|p| p.incorrect_count(player) > 0)
    }
}
