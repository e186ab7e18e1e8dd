use crate::run_result::{self, EventTallies, Outcome, RunResult, SummaryMetrics};
use anyhow::{Context, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use uuid::Uuid;
use voyage_control::{AutopilotConfig, AutopilotController, CommandSource};
use voyage_core::{GameContent, GameState, MetricsSnapshot};

/// Everything shared by the seeds of one scenario.
pub struct RunSpec<'a> {
    pub content: &'a GameContent,
    pub ticks: u64,
    pub metrics_every: u64,
    pub scenario_name: &'a str,
    pub scenario_params: &'a serde_json::Value,
    pub autopilot: &'a AutopilotConfig,
    pub base_state: Option<&'a GameState>,
}

pub struct SeedResult {
    pub seed: u64,
    pub final_snapshot: MetricsSnapshot,
    pub outcome: Outcome,
    pub tallies: EventTallies,
    pub run_id: String,
}

/// One row of `seeds.csv`.
#[derive(Debug, Serialize)]
pub struct SeedRow {
    pub seed: u64,
    pub run_id: String,
    pub outcome: Outcome,
    pub tick_end: u64,
    pub distance_traveled: f64,
    pub hull_damage: f64,
    pub fuel: f64,
    pub disasters_fired: u64,
    pub hazards_destroyed: u64,
    pub hazard_impacts: u64,
    pub mixtures_accepted: u64,
}

impl From<&SeedResult> for SeedRow {
    fn from(result: &SeedResult) -> Self {
        Self {
            seed: result.seed,
            run_id: result.run_id.clone(),
            outcome: result.outcome,
            tick_end: result.final_snapshot.tick,
            distance_traveled: result.final_snapshot.distance_traveled,
            hull_damage: result.final_snapshot.hull_damage,
            fuel: result.final_snapshot.fuel,
            disasters_fired: result.final_snapshot.disasters_fired,
            hazards_destroyed: result.tallies.hazards_destroyed,
            hazard_impacts: result.tallies.hazard_impacts,
            mixtures_accepted: result.tallies.mixtures_accepted,
        }
    }
}

fn initial_state(spec: &RunSpec<'_>, seed: u64, rng: &mut ChaCha8Rng) -> GameState {
    match spec.base_state {
        Some(base) => {
            let mut state = base.clone();
            state.meta.seed = seed;
            state
        }
        None => voyage_world::build_initial_state(spec.content, seed, rng),
    }
}

pub fn run_seed(spec: &RunSpec<'_>, seed: u64, seed_dir: &Path) -> Result<SeedResult> {
    let content = spec.content;
    let run_id = Uuid::new_v4().to_string();
    let start = Instant::now();

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut state = initial_state(spec, seed, &mut rng);
    let mut autopilot = AutopilotController::new(spec.autopilot.clone());
    let mut next_command_id = 0u64;
    let mut tallies = EventTallies::default();

    std::fs::create_dir_all(seed_dir)
        .with_context(|| format!("creating seed directory: {}", seed_dir.display()))?;

    voyage_world::write_run_info(
        seed_dir,
        &format!("seed_{seed}"),
        seed,
        &content.content_version,
        spec.metrics_every,
        serde_json::json!({
            "runner": "voyage_bench",
            "ticks": spec.ticks,
        }),
    )?;

    let mut metrics_writer = voyage_core::MetricsFileWriter::new(seed_dir.to_path_buf())
        .with_context(|| format!("opening metrics CSV in {}", seed_dir.display()))?;

    for _ in 0..spec.ticks {
        let commands = autopilot.generate_commands(&state, content, &mut next_command_id);
        let mut events = voyage_core::apply_commands(&mut state, &commands, content);
        events.extend(voyage_core::tick(&mut state, content, &mut rng));
        for envelope in &events {
            tallies.record(envelope);
        }

        if state.clock.total_seconds() % spec.metrics_every == 0 {
            let snapshot = voyage_core::compute_metrics(&state, content);
            metrics_writer
                .write_row(&snapshot)
                .context("writing metrics row")?;
        }
        if state.meta.arrived {
            break;
        }
    }

    // Always capture final snapshot
    let final_snapshot = voyage_core::compute_metrics(&state, content);
    if state.clock.total_seconds() % spec.metrics_every != 0 {
        metrics_writer
            .write_row(&final_snapshot)
            .context("writing final metrics row")?;
    }
    metrics_writer.flush().context("flushing metrics")?;

    #[allow(clippy::cast_possible_truncation)]
    let wall_time_ms = start.elapsed().as_millis() as u64;
    let sim_ticks_per_second = if wall_time_ms > 0 {
        (final_snapshot.tick as f64) / (wall_time_ms as f64 / 1000.0)
    } else {
        0.0
    };
    let outcome = run_result::detect_outcome(&final_snapshot);

    let run_result = RunResult {
        run_schema_version: 1,
        run_status: "completed".to_string(),
        run_id: run_id.clone(),
        git_sha: run_result::git_sha(),
        git_dirty: run_result::git_dirty(),
        seed,
        scenario_name: spec.scenario_name.to_string(),
        scenario_params: spec.scenario_params.clone(),
        tick_end: final_snapshot.tick,
        total_ticks: spec.ticks,
        wall_time_ms,
        sim_ticks_per_second,
        outcome,
        summary_metrics: Some(SummaryMetrics::from_snapshot(&final_snapshot)),
        tallies,
        metrics_path: "metrics_000.csv".to_string(),
    };

    run_result
        .write_atomic(&seed_dir.join("run_result.json"))
        .context("writing run_result.json")?;

    Ok(SeedResult {
        seed,
        final_snapshot,
        outcome,
        tallies: run_result.tallies,
        run_id,
    })
}
