//! Type definitions for `voyage_core`.
//!
//! State, command, event and content types shared by every simulation module.
//! Behaviour lives in the sibling modules; this file only describes shapes.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ID newtypes
// ---------------------------------------------------------------------------

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(PanelId);
string_id!(HazardId);
string_id!(AlertId);
string_id!(CommandId);
string_id!(EventId);

/// Fixed names of the four wiring panels.
pub const PANEL_NAMES: [&str; 4] = ["A1b2", "Xy9Z", "3Fp7", "Q8wS"];

/// Endpoints per node class on every panel.
pub const ENDPOINTS_PER_CLASS: u8 = 4;

// ---------------------------------------------------------------------------
// Core enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Player {
    Albatross,
    Kestrel,
}

impl Player {
    pub const ALL: [Player; 2] = [Player::Albatross, Player::Kestrel];

    pub fn other(self) -> Player {
        match self {
            Player::Albatross => Player::Kestrel,
            Player::Kestrel => Player::Albatross,
        }
    }
}

/// One value per ship.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerPlayer<T> {
    pub albatross: T,
    pub kestrel: T,
}

impl<T> PerPlayer<T> {
    pub fn from_fn(mut f: impl FnMut(Player) -> T) -> Self {
        Self {
            albatross: f(Player::Albatross),
            kestrel: f(Player::Kestrel),
        }
    }

    pub fn get(&self, player: Player) -> &T {
        match player {
            Player::Albatross => &self.albatross,
            Player::Kestrel => &self.kestrel,
        }
    }

    pub fn get_mut(&mut self, player: Player) -> &mut T {
        match player {
            Player::Albatross => &mut self.albatross,
            Player::Kestrel => &mut self.kestrel,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShipSystem {
    Weapons,
    Thrust,
    Fuel,
    Power,
}

impl ShipSystem {
    pub const ALL: [ShipSystem; 4] = [
        ShipSystem::Weapons,
        ShipSystem::Thrust,
        ShipSystem::Fuel,
        ShipSystem::Power,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ShipSystem::Weapons => "Weapons",
            ShipSystem::Thrust => "Thrust",
            ShipSystem::Fuel => "Fuel",
            ShipSystem::Power => "Power",
        }
    }

    /// Lowercase form used in alert ids.
    pub fn key(self) -> &'static str {
        match self {
            ShipSystem::Weapons => "weapons",
            ShipSystem::Thrust => "thrust",
            ShipSystem::Fuel => "fuel",
            ShipSystem::Power => "power",
        }
    }
}

/// Distance band of the journey. Difficulty escalates from Alpha to Delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Quadrant {
    Alpha,
    Beta,
    Gamma,
    Delta,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::Alpha,
        Quadrant::Beta,
        Quadrant::Gamma,
        Quadrant::Delta,
    ];

    pub fn index(self) -> usize {
        match self {
            Quadrant::Alpha => 0,
            Quadrant::Beta => 1,
            Quadrant::Gamma => 2,
            Quadrant::Delta => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Axis {
    Pitch,
    Yaw,
    Roll,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::Pitch, Axis::Yaw, Axis::Roll];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Input,
    Node,
    Output,
}

/// Provenance of the last edit that damaged a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisruptionSource {
    User,
    Minor,
    Major,
    Catastrophic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PenaltyTier {
    None,
    Light,
    Medium,
    Heavy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MaterialType {
    Crystal,
    Alloy,
    Stone,
}

impl MaterialType {
    pub const ALL: [MaterialType; 3] = [
        MaterialType::Crystal,
        MaterialType::Alloy,
        MaterialType::Stone,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WeaponType {
    Phasers,
    Missiles,
    Railgun,
}

impl WeaponType {
    pub const ALL: [WeaponType; 3] = [
        WeaponType::Phasers,
        WeaponType::Missiles,
        WeaponType::Railgun,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FuelType {
    Hydrogen,
    Xenon,
    Plutonium,
    Helium,
}

impl FuelType {
    pub const ALL: [FuelType; 4] = [
        FuelType::Hydrogen,
        FuelType::Xenon,
        FuelType::Plutonium,
        FuelType::Helium,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisasterSeverity {
    Minor,
    Major,
    Catastrophic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisasterKind {
    NavMisalign,
    SingleAsteroid,
    PowerSurge,
    MinorRewire,
    MajorAsteroid,
    MajorRewire,
    CatastrophicRewire,
    ThreeMinors,
    AsteroidCluster,
    Sabotage,
}

/// Presentation cue attached to a disaster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationHint {
    Shake,
    Slide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlertSeverity {
    Warning,
    Danger,
    Critical,
    Success,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertOrigin {
    Manual,
    Automatic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GaugeKind {
    Distance,
    Hull,
    Oxygen,
    Fuel,
    Battery,
}

// ---------------------------------------------------------------------------
// State types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub meta: MetaState,
    pub clock: GameClock,
    pub ship: ShipState,
    pub engineering: EngineeringState,
    pub navigation: NavigationState,
    /// Live hazards in spawn order.
    pub hazards: Vec<Hazard>,
    pub weapons: WeaponsState,
    pub fuel: FuelMixtureState,
    pub disasters: DisasterSchedule,
    pub alerts: AlertBoard,
    pub counters: Counters,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaState {
    pub seed: u64,
    pub schema_version: u32,
    pub content_version: String,
    /// Ship the local view belongs to. `None` until a player is selected.
    pub local_player: Option<Player>,
    pub arrived: bool,
}

/// Elapsed game time. Only the tick loop advances it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GameClock {
    pub minutes_elapsed: u64,
    pub seconds_elapsed: u64,
}

/// Bounded quantity with `0 <= current <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gauge {
    pub current: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipState {
    /// Counts down from the journey length to zero.
    pub distance: Gauge,
    pub hull_damage: Gauge,
    pub oxygen: Gauge,
    pub fuel: Gauge,
    pub battery: Gauge,
    pub on_break: bool,
    /// Power added by the most recent regeneration step.
    pub last_power_restored: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Endpoint {
    pub kind: NodeKind,
    pub index: u8,
}

/// Directed edge between two endpoints of one panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Connection {
    pub from: Endpoint,
    pub to: Endpoint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    pub connections: Vec<Connection>,
    pub correct: PerPlayer<Vec<Connection>>,
    pub last_disruption: Option<DisruptionSource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineeringState {
    pub panels: BTreeMap<PanelId, Panel>,
    /// Which panel drives which system, per ship.
    pub bindings: PerPlayer<BTreeMap<ShipSystem, PanelId>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NavigationValues {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationState {
    pub current: NavigationValues,
    pub correct: PerPlayer<NavigationValues>,
    pub stage: Quadrant,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hazard {
    pub id: HazardId,
    /// Outermost layer first. Never empty while registered.
    pub layers: Vec<MaterialType>,
    pub spawned_at: u64,
    pub impact_at: u64,
    pub position: Position,
    /// Drawn diameter. Shrinks as layers are stripped.
    pub size: f64,
    #[serde(default)]
    pub initial_layer_count: usize,
}

/// Absolute-time cooldown window. Expired when `ready_at <= now`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cooldown {
    pub started_at: u64,
    pub ready_at: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeaponsState {
    pub cooldowns: BTreeMap<WeaponType, Cooldown>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelMixtureState {
    /// Each tube lists layers bottom first; the last entry is on top.
    pub storage: Vec<Vec<FuelType>>,
    pub active: Vec<FuelType>,
    pub targets: PerPlayer<Vec<FuelType>>,
    pub previous_targets: PerPlayer<Vec<FuelType>>,
    pub target_period: u64,
    pub required_length: usize,
    pub refuel: Cooldown,
    pub dump: Cooldown,
    pub dump_all: Cooldown,
    pub refuel_pending: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisasterSchedule {
    pub next_fire_at: u64,
    pub has_fired_first: bool,
    /// Most recent last, capped at `Constants::disaster_history_len`.
    pub history: VecDeque<DisasterSeverity>,
    pub fired: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SystemEffect {
    pub gauge: GaugeKind,
    pub change_per_interval: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: AlertId,
    pub name: String,
    pub severity: AlertSeverity,
    pub first_seen_at: GameClock,
    pub description: String,
    pub owner: Player,
    pub origin: AlertOrigin,
    pub is_active: bool,
    #[serde(default)]
    pub effects: Vec<SystemEffect>,
    /// Effect intervals already applied (manual alerts only).
    #[serde(default)]
    pub intervals_applied: u64,
}

/// Active alerts. `automatic` doubles as the reconciler's memory of the
/// previous tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertBoard {
    pub manual: Vec<Alert>,
    pub automatic: BTreeMap<AlertId, Alert>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Counters {
    pub next_event_id: u64,
    pub next_command_id: u64,
    pub next_hazard_id: u64,
    pub next_alert_id: u64,
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandEnvelope {
    pub id: CommandId,
    pub issued_by: Player,
    pub issued_at: u64,
    pub command: Command,
}

/// Player write interfaces. Invalid commands are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    SelectPlayer,
    SetNavigationAxis {
        axis: Axis,
        value: f64,
    },
    SetWiringConnections {
        panel: PanelId,
        connections: Vec<Connection>,
    },
    FireWeapon {
        weapon: WeaponType,
    },
    TransferFuelLayer {
        tube: usize,
    },
    DumpFuelLayer,
    DumpAllFuelLayers,
    StartRefuel,
    ResumeJourney,
    RaiseAlert {
        name: String,
        description: String,
        severity: AlertSeverity,
        #[serde(default)]
        effects: Vec<SystemEffect>,
    },
    DismissAlert {
        alert_id: AlertId,
    },
    SetDistanceTraveled {
        traveled: f64,
    },
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub id: EventId,
    /// Clock total seconds when the event was emitted.
    pub tick: u64,
    pub event: Event,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    PlayerSelected {
        player: Player,
    },
    NavigationAdjusted {
        axis: Axis,
        value: f64,
    },
    WiringChanged {
        panel: PanelId,
        incorrect: u32,
        repaired: bool,
    },
    PanelDisrupted {
        panel: PanelId,
        source: DisruptionSource,
    },
    WeaponFired {
        weapon: WeaponType,
        power_cost: f64,
        hits: u32,
    },
    HazardSpawned {
        hazard_id: HazardId,
        layers: Vec<MaterialType>,
        impact_at: u64,
    },
    HazardLayerStripped {
        hazard_id: HazardId,
        material: MaterialType,
        remaining: usize,
    },
    HazardDestroyed {
        hazard_id: HazardId,
    },
    HazardImpacted {
        hazard_id: HazardId,
        damage: f64,
    },
    FuelLayerTransferred {
        tube: usize,
        fuel: FuelType,
    },
    FuelLayersDumped {
        count: usize,
    },
    FuelMixtureAccepted {
        matched_previous: bool,
        fuel_added: f64,
    },
    FuelTargetsRotated {
        required_length: usize,
    },
    RefuelStarted {
        ready_at: u64,
    },
    RefuelCompleted,
    PowerDrained {
        amount: f64,
    },
    NavigationNudged {
        axis: Axis,
        delta: f64,
    },
    BreakStarted {
        checkpoint: f64,
    },
    JourneyResumed,
    QuadrantEntered {
        quadrant: Quadrant,
    },
    DestinationReached,
    DistanceOverridden {
        traveled: f64,
    },
    DisasterTriggered {
        disaster: DisasterKind,
        severity: DisasterSeverity,
        quadrant: Quadrant,
    },
    DisasterFallback {
        disaster: DisasterKind,
        hazards_spawned: usize,
    },
    AnimationRequested {
        hint: AnimationHint,
    },
    AlertRaised {
        alert_id: AlertId,
        severity: AlertSeverity,
        name: String,
    },
    AlertCleared {
        alert_id: AlertId,
    },
}

// ---------------------------------------------------------------------------
// Content types (loaded from JSON)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameContent {
    pub content_version: String,
    pub constants: Constants,
    pub navigation: Vec<QuadrantNavigation>,
    pub disaster_weights: Vec<QuadrantDisasterWeights>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuadrantNavigation {
    pub quadrant: Quadrant,
    #[serde(flatten)]
    pub targets: PerPlayer<NavigationValues>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuadrantDisasterWeights {
    pub quadrant: Quadrant,
    pub weights: Vec<DisasterWeight>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisasterWeight {
    pub disaster: DisasterKind,
    pub weight: u32,
}

/// Minimum incorrect-connection counts for each degraded tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierThresholds {
    pub light_min: u32,
    pub medium_min: u32,
    pub heavy_min: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierMultipliers {
    pub none: f64,
    pub light: f64,
    pub medium: f64,
    pub heavy: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PenaltyMultipliers {
    pub weapons: TierMultipliers,
    pub thrust: TierMultipliers,
    pub fuel: TierMultipliers,
    pub power: TierMultipliers,
}

/// Science-station cooldowns. `*_base_secs` scale with a fuel penalty above 1;
/// `*_default_secs` apply otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuelCooldowns {
    pub refuel_default_secs: u64,
    pub refuel_base_secs: u64,
    pub dump_default_secs: u64,
    pub dump_base_secs: u64,
    pub dump_all_default_secs: u64,
    pub dump_all_base_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constants {
    pub journey_length: f64,
    pub quadrant_length: f64,
    pub break_points: Vec<f64>,
    pub hull_max: f64,
    pub oxygen_max: f64,
    pub fuel_max: f64,
    pub battery_max: f64,
    pub penalty_tiers: TierThresholds,
    pub penalty_multipliers: PenaltyMultipliers,
    pub thrust_boost_floor: f64,
    pub power_regen_base: f64,
    pub low_power_ratio: f64,
    pub fuel_burn_per_tick: f64,
    pub base_speed: f64,
    pub low_fuel_fraction: f64,
    pub speed_nav_tolerance: f64,
    pub alert_nav_tolerance: f64,
    pub hazard_imminent_secs: u64,
    pub hazard_nearby_secs: u64,
    pub fuel_alert_critical_pct: f64,
    pub fuel_alert_danger_pct: f64,
    pub fuel_alert_warning_pct: f64,
    pub engineering_alert_warning: f64,
    pub engineering_alert_danger: f64,
    pub engineering_alert_critical: f64,
    pub first_disaster_at_secs: u64,
    pub disaster_refire_min_secs: u64,
    pub disaster_refire_max_secs: u64,
    pub disaster_history_len: usize,
    pub power_surge_drain: f64,
    pub weapon_power_cost: f64,
    pub weapon_hit_cooldown_secs: f64,
    pub weapon_miss_cooldown_secs: f64,
    pub hazard_impact_base_secs: f64,
    pub hazard_impact_spread_secs: f64,
    pub hazard_base_damage: f64,
    pub fuel_per_mixture: f64,
    pub fuel_target_period_secs: u64,
    pub storage_tube_count: usize,
    pub storage_tube_layers: usize,
    pub mixture_length_by_quadrant: [usize; 4],
    pub fuel_cooldowns: FuelCooldowns,
    pub manual_alert_effect_interval_secs: u64,
}
