use serde::{Deserialize, Serialize};
use voyage_core::weapons::{countered_material, is_ready, power_cost};
use voyage_core::{
    penalty_for, Axis, Command, CommandEnvelope, CommandId, FuelType, GameContent, GameState,
    Player, ShipSystem, WeaponType,
};

pub trait CommandSource {
    fn generate_commands(
        &mut self,
        state: &GameState,
        content: &GameContent,
        next_command_id: &mut u64,
    ) -> Vec<CommandEnvelope>;
}

/// Tuning for [`AutopilotController`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutopilotConfig {
    /// Seat to take when nobody is seated.
    pub player: Player,
    /// Start assembling a mixture once fuel drops to this percentage.
    pub mix_fuel_below_pct: f64,
    /// Panels rewired per tick.
    pub repairs_per_tick: usize,
    pub fire_weapons: bool,
}

impl Default for AutopilotConfig {
    fn default() -> Self {
        Self {
            player: Player::Albatross,
            mix_fuel_below_pct: 75.0,
            repairs_per_tick: 1,
            fire_weapons: true,
        }
    }
}

/// Plays one ship automatically:
/// 1. Take a seat if none is taken.
/// 2. Steer every axis back onto the current target.
/// 3. Rewire damaged panels, a few per tick.
/// 4. Fire ready weapons that would strip at least one outer layer.
/// 5. Assemble fuel mixtures when the tank runs low, refuelling storage as needed.
/// 6. Resume the journey at checkpoints.
#[derive(Debug, Default)]
pub struct AutopilotController {
    pub config: AutopilotConfig,
}

impl AutopilotController {
    pub fn new(config: AutopilotConfig) -> Self {
        Self { config }
    }
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// Allocates a command ID and builds a `CommandEnvelope`.
fn make_cmd(player: Player, now: u64, next_id: &mut u64, command: Command) -> CommandEnvelope {
    let cmd_id = CommandId(format!("cmd_{:06}", *next_id));
    *next_id += 1;
    CommandEnvelope {
        id: cmd_id,
        issued_by: player,
        issued_at: now,
        command,
    }
}

fn navigation_commands(state: &GameState, content: &GameContent, player: Player) -> Vec<Command> {
    let tolerance = content.constants.speed_nav_tolerance;
    let target = state.navigation.correct.get(player);
    Axis::ALL
        .into_iter()
        .filter(|axis| !state.navigation.current.axis_matches(target, *axis, tolerance))
        .map(|axis| Command::SetNavigationAxis {
            axis,
            value: target.get(axis),
        })
        .collect()
}

/// Rewires the worst panels first.
fn repair_commands(state: &GameState, player: Player, limit: usize) -> Vec<Command> {
    let mut damaged: Vec<_> = state
        .engineering
        .panels
        .iter()
        .filter(|(_, panel)| !panel.matches_correct(player))
        .collect();
    damaged.sort_by_key(|(_, panel)| std::cmp::Reverse(panel.incorrect_count(player)));
    damaged
        .into_iter()
        .take(limit)
        .map(|(panel_id, panel)| Command::SetWiringConnections {
            panel: panel_id.clone(),
            connections: panel.correct.get(player).clone(),
        })
        .collect()
}

fn weapon_commands(state: &GameState, content: &GameContent, player: Player) -> Vec<Command> {
    let penalty = penalty_for(
        ShipSystem::Weapons,
        Some(&state.engineering),
        player,
        &content.constants,
    );
    let cost = power_cost(penalty, &content.constants);
    let mut battery = state.ship.battery.current;
    let mut commands = Vec::new();
    for weapon in WeaponType::ALL {
        let material = countered_material(weapon);
        let has_target = state
            .hazards
            .iter()
            .any(|hazard| hazard.layers.first() == Some(&material));
        if has_target && is_ready(state, weapon) && battery >= cost {
            battery -= cost;
            commands.push(Command::FireWeapon { weapon });
        }
    }
    commands
}

/// Mixture the active tube is building toward: the current target when the
/// tube is a prefix of it, else the previous target.
fn mixture_goal(state: &GameState, player: Player) -> Option<&[FuelType]> {
    let active = &state.fuel.active;
    [state.fuel.targets.get(player), state.fuel.previous_targets.get(player)]
        .into_iter()
        .find(|target| !target.is_empty() && target.starts_with(active))
        .map(Vec::as_slice)
}

fn fuel_command(state: &GameState, config: &AutopilotConfig) -> Option<Command> {
    let fuel = &state.fuel;
    let now = state.clock.total_seconds();
    if state.ship.fuel.percent() > config.mix_fuel_below_pct || fuel.refuel_pending {
        return None;
    }

    let Some(goal) = mixture_goal(state, player_of(state, config)) else {
        if fuel.dump_all.ready_at <= now {
            return Some(Command::DumpAllFuelLayers);
        }
        return (fuel.dump.ready_at <= now).then_some(Command::DumpFuelLayer);
    };

    let needed = goal.get(fuel.active.len())?;
    let tube = fuel
        .storage
        .iter()
        .position(|tube| tube.last() == Some(needed));
    match tube {
        Some(tube) => Some(Command::TransferFuelLayer { tube }),
        None => (fuel.refuel.ready_at <= now).then_some(Command::StartRefuel),
    }
}

fn player_of(state: &GameState, config: &AutopilotConfig) -> Player {
    state.meta.local_player.unwrap_or(config.player)
}

impl CommandSource for AutopilotController {
    fn generate_commands(
        &mut self,
        state: &GameState,
        content: &GameContent,
        next_command_id: &mut u64,
    ) -> Vec<CommandEnvelope> {
        let now = state.clock.total_seconds();
        let player = player_of(state, &self.config);

        if state.meta.local_player.is_none() {
            return vec![make_cmd(player, now, next_command_id, Command::SelectPlayer)];
        }
        if state.meta.arrived {
            return Vec::new();
        }

        let mut commands = navigation_commands(state, content, player);
        commands.extend(repair_commands(state, player, self.config.repairs_per_tick));
        if self.config.fire_weapons {
            commands.extend(weapon_commands(state, content, player));
        }
        commands.extend(fuel_command(state, &self.config));
        if state.ship.on_break {
            commands.push(Command::ResumeJourney);
        }

        commands
            .into_iter()
            .map(|command| make_cmd(player, now, next_command_id, command))
            .collect()
    }
}
