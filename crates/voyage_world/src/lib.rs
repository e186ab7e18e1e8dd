//! Content loading and initial world construction shared between voyage_cli,
//! voyage_daemon and voyage_bench.

use anyhow::{Context, Result};
use rand::Rng;
use serde::Deserialize;
use voyage_core::disaster::CATALOG;
use voyage_core::navigation::targets_for;
use voyage_core::{
    AlertBoard, Constants, Counters, DisasterSchedule, EngineeringState, FuelMixtureState,
    GameClock, GameContent, GameState, MetaState, NavigationState, Player, Quadrant,
    QuadrantDisasterWeights, QuadrantNavigation, ShipState, WeaponsState,
};
use std::collections::HashSet;
use std::path::Path;

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Deserialize)]
struct NavigationFile {
    content_version: String,
    quadrants: Vec<QuadrantNavigation>,
}

#[derive(Deserialize)]
struct DisastersFile {
    quadrants: Vec<QuadrantDisasterWeights>,
}

/// Validates loaded content, panicking on any authoring error.
///
/// Catches mistakes like a quadrant with no navigation targets, a weight table
/// that can never fire, or checkpoints listed out of order.
pub fn validate_content(content: &GameContent) {
    let c = &content.constants;

    for quadrant in Quadrant::ALL {
        let navigation = content
            .navigation
            .iter()
            .filter(|entry| entry.quadrant == quadrant)
            .count();
        assert!(
            navigation == 1,
            "quadrant {quadrant:?} has {navigation} navigation entries, expected exactly one",
        );

        let weights = content
            .disaster_weights
            .iter()
            .find(|entry| entry.quadrant == quadrant);
        let Some(weights) = weights else {
            panic!("quadrant {quadrant:?} has no disaster weight table");
        };
        assert!(
            weights.weights.iter().any(|w| w.weight > 0),
            "quadrant {quadrant:?} disaster weights are all zero",
        );
        let mut seen = HashSet::new();
        for entry in &weights.weights {
            assert!(
                seen.insert(entry.disaster),
                "quadrant {quadrant:?} lists disaster {:?} twice",
                entry.disaster,
            );
            assert!(
                CATALOG.iter().any(|def| def.kind == entry.disaster),
                "quadrant {quadrant:?} weight references unknown disaster {:?}",
                entry.disaster,
            );
        }
    }

    for entry in &content.navigation {
        for player in Player::ALL {
            let target = entry.targets.get(player);
            assert!(
                target.pitch.is_finite() && target.yaw.is_finite() && target.roll.is_finite(),
                "quadrant {:?} navigation target for {player:?} is not finite",
                entry.quadrant,
            );
        }
    }

    let tiers = &c.penalty_tiers;
    assert!(
        0 < tiers.light_min && tiers.light_min < tiers.medium_min && tiers.medium_min < tiers.heavy_min,
        "penalty tier thresholds must be strictly increasing and above zero",
    );
    assert!(
        c.break_points.windows(2).all(|pair| pair[0] < pair[1]),
        "break points must be strictly ascending",
    );
    assert!(
        c.break_points
            .iter()
            .all(|bp| *bp > 0.0 && *bp < c.journey_length),
        "break points must lie inside the journey",
    );
    assert!(
        c.quadrant_length > 0.0 && c.journey_length > 0.0,
        "journey and quadrant lengths must be positive",
    );
    assert!(
        c.disaster_refire_min_secs <= c.disaster_refire_max_secs,
        "disaster refire window is inverted",
    );
    assert!(
        c.fuel_target_period_secs > 0,
        "fuel_target_period_secs must be positive",
    );
    assert!(
        c.mixture_length_by_quadrant.iter().all(|len| *len > 0),
        "mixture lengths must be positive",
    );
}

fn read_json<T: serde::de::DeserializeOwned>(dir: &Path, file: &str) -> Result<T> {
    let text = std::fs::read_to_string(dir.join(file)).with_context(|| format!("reading {file}"))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {file}"))
}

pub fn load_content(content_dir: &str) -> Result<GameContent> {
    let dir = Path::new(content_dir);
    let constants: Constants = read_json(dir, "constants.json")?;
    let navigation: NavigationFile = read_json(dir, "navigation.json")?;
    let disasters: DisastersFile = read_json(dir, "disasters.json")?;
    let content = GameContent {
        content_version: navigation.content_version,
        constants,
        navigation: navigation.quadrants,
        disaster_weights: disasters.quadrants,
    };
    validate_content(&content);
    Ok(content)
}

/// Fresh game at 0:00: random wiring solutions, Alpha navigation targets,
/// random storage tubes, and no seat taken yet.
pub fn build_initial_state(content: &GameContent, seed: u64, rng: &mut impl Rng) -> GameState {
    let c = &content.constants;
    let mut engineering = EngineeringState::generate(rng);
    engineering.reset_to(Player::Albatross);
    let targets = targets_for(content, Quadrant::Alpha)
        .cloned()
        .unwrap_or_default();

    GameState {
        meta: MetaState {
            seed,
            schema_version: SCHEMA_VERSION,
            content_version: content.content_version.clone(),
            local_player: None,
            arrived: false,
        },
        clock: GameClock::default(),
        ship: ShipState::new(c),
        engineering,
        navigation: NavigationState::new(targets, Quadrant::Alpha, Player::Albatross),
        hazards: Vec::new(),
        weapons: WeaponsState::default(),
        fuel: FuelMixtureState::new(rng, c, 0, 0.0),
        disasters: DisasterSchedule::new(c),
        alerts: AlertBoard::default(),
        counters: Counters::default(),
    }
}

/// `YYYYMMDD_HHMMSS_seed{seed}` in UTC.
pub fn generate_run_id(seed: u64) -> String {
    let now = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    format!("{now}_seed{seed}")
}

pub fn write_run_info(
    dir: &Path,
    run_id: &str,
    seed: u64,
    content_version: &str,
    metrics_every: u64,
    args: serde_json::Value,
) -> Result<()> {
    let info = serde_json::json!({
        "run_id": run_id,
        "seed": seed,
        "start_time": chrono::Utc::now().to_rfc3339(),
        "content_version": content_version,
        "schema_version": SCHEMA_VERSION,
        "metrics_every": metrics_every,
        "args": args,
    });
    let path = dir.join("run_info.json");
    let file =
        std::fs::File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(file, &info)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
