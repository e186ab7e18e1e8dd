use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::path::{Path, PathBuf};
use voyage_control::{AutopilotConfig, AutopilotController, CommandSource};
use voyage_core::{Event, GameState, Player};
use voyage_world::{build_initial_state, generate_run_id, load_content, write_run_info};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "voyage_cli", about = "Two-ship voyage simulator CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Seat {
    Albatross,
    Kestrel,
}

impl From<Seat> for Player {
    fn from(seat: Seat) -> Self {
        match seat {
            Seat::Albatross => Player::Albatross,
            Seat::Kestrel => Player::Kestrel,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the simulation for a fixed number of seconds of game time.
    Run {
        #[arg(long)]
        ticks: u64,
        /// Generate the world with this seed. Mutually exclusive with --state.
        #[arg(long, conflicts_with = "state_file")]
        seed: Option<u64>,
        /// Load initial GameState from a JSON file. Mutually exclusive with --seed.
        #[arg(long = "state", conflicts_with = "seed")]
        state_file: Option<String>,
        #[arg(long, default_value = "./content")]
        content_dir: String,
        #[arg(long, default_value_t = 60)]
        print_every: u64,
        /// Sample metrics every N ticks.
        #[arg(long, default_value_t = 10)]
        metrics_every: u64,
        /// Disable automatic metrics collection to runs/ directory.
        #[arg(long)]
        no_metrics: bool,
        /// Seat the autopilot takes.
        #[arg(long, value_enum, default_value_t = Seat::Albatross)]
        player: Seat,
        /// Let the ship drift with nobody at the controls.
        #[arg(long)]
        no_autopilot: bool,
    },
}

struct RunOptions {
    ticks: u64,
    seed: Option<u64>,
    state_file: Option<String>,
    content_dir: String,
    print_every: u64,
    metrics_every: u64,
    no_metrics: bool,
    player: Player,
    autopilot: bool,
}

#[derive(Debug, Serialize)]
struct RunSummary {
    seed: u64,
    ticks_run: u64,
    arrived: bool,
    distance_traveled: f64,
    hull_damage: f64,
    fuel: f64,
    disasters_fired: u64,
    hazards_destroyed: u64,
    hazard_impacts: u64,
}

impl RunSummary {
    fn new(seed: u64) -> Self {
        Self {
            seed,
            ticks_run: 0,
            arrived: false,
            distance_traveled: 0.0,
            hull_damage: 0.0,
            fuel: 0.0,
            disasters_fired: 0,
            hazards_destroyed: 0,
            hazard_impacts: 0,
        }
    }

    fn record(&mut self, event: &Event) {
        match event {
            Event::HazardDestroyed { .. } => self.hazards_destroyed += 1,
            Event::HazardImpacted { .. } => self.hazard_impacts += 1,
            _ => {}
        }
    }

    fn finish(&mut self, state: &GameState) {
        self.arrived = state.meta.arrived;
        self.distance_traveled = state.ship.distance_traveled();
        self.hull_damage = state.ship.hull_damage.current;
        self.fuel = state.ship.fuel.current;
        self.disasters_fired = state.disasters.fired;
    }
}

// ---------------------------------------------------------------------------
// Run loop
// ---------------------------------------------------------------------------

fn create_run_dir(run_id: &str) -> Result<PathBuf> {
    let dir = PathBuf::from("runs").join(run_id);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating run directory: {}", dir.display()))?;
    Ok(dir)
}

fn write_summary(dir: &Path, summary: &RunSummary) -> Result<()> {
    let path = dir.join("summary.json");
    let file =
        std::fs::File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(file, summary)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn initial_state(
    content: &voyage_core::GameContent,
    seed: Option<u64>,
    state_file: Option<String>,
) -> Result<(GameState, ChaCha8Rng)> {
    if let Some(path) = state_file {
        let json = std::fs::read_to_string(&path)
            .with_context(|| format!("reading state file: {path}"))?;
        let loaded: GameState =
            serde_json::from_str(&json).with_context(|| format!("parsing state file: {path}"))?;
        let rng_seed = loaded.meta.seed;
        return Ok((loaded, ChaCha8Rng::seed_from_u64(rng_seed)));
    }
    let resolved_seed = seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(resolved_seed);
    let state = build_initial_state(content, resolved_seed, &mut rng);
    Ok((state, rng))
}

fn announce(event: &Event, state: &GameState) {
    let at = state.clock;
    match event {
        Event::DisasterTriggered {
            disaster, quadrant, ..
        } => println!("*** [{at}] DISASTER: {} in {quadrant:?} ***", disaster.name()),
        Event::BreakStarted { checkpoint } => {
            println!("*** [{at}] CHECKPOINT {checkpoint:.0} reached, holding ***");
        }
        Event::QuadrantEntered { quadrant } => println!("*** [{at}] ENTERED {quadrant:?} ***"),
        Event::DestinationReached => println!("*** [{at}] DESTINATION REACHED ***"),
        _ => {}
    }
}

/// Creates `runs/<run_id>/` with `run_info.json` and an open metrics CSV.
fn open_metrics(
    options: &RunOptions,
    state: &GameState,
    content: &voyage_core::GameContent,
) -> Result<(PathBuf, voyage_core::MetricsFileWriter)> {
    let run_id = generate_run_id(state.meta.seed);
    let dir = create_run_dir(&run_id)?;
    write_run_info(
        &dir,
        &run_id,
        state.meta.seed,
        &content.content_version,
        options.metrics_every,
        serde_json::json!({
            "runner": "voyage_cli",
            "ticks": options.ticks,
            "print_every": options.print_every,
            "autopilot": options.autopilot,
        }),
    )?;
    let writer = voyage_core::MetricsFileWriter::new(dir.clone())
        .with_context(|| format!("opening metrics CSV in {}", dir.display()))?;
    println!("Run directory: {}", dir.display());
    Ok((dir, writer))
}

fn run(options: RunOptions) -> Result<()> {
    let content = load_content(&options.content_dir)?;
    let (mut state, mut rng) = initial_state(&content, options.seed, options.state_file.clone())?;

    let mut metrics = if options.no_metrics {
        None
    } else {
        Some(open_metrics(&options, &state, &content)?)
    };

    let mut autopilot = AutopilotController::new(AutopilotConfig {
        player: options.player,
        ..AutopilotConfig::default()
    });
    let mut next_command_id = 0u64;
    let mut summary = RunSummary::new(state.meta.seed);

    println!(
        "Starting voyage: ticks={} seed={} content_version={}",
        options.ticks, state.meta.seed, content.content_version,
    );
    println!("{}", "-".repeat(80));

    for _ in 0..options.ticks {
        let mut events = Vec::new();
        if options.autopilot {
            let commands = autopilot.generate_commands(&state, &content, &mut next_command_id);
            events.extend(voyage_core::apply_commands(&mut state, &commands, &content));
        }
        events.extend(voyage_core::tick(&mut state, &content, &mut rng));
        summary.ticks_run += 1;

        for envelope in &events {
            summary.record(&envelope.event);
            announce(&envelope.event, &state);
        }

        let now = state.clock.total_seconds();
        if options.print_every > 0 && now % options.print_every == 0 {
            print_status(&state);
        }

        if let Some((_, ref mut writer)) = metrics {
            if now % options.metrics_every.max(1) == 0 {
                let snapshot = voyage_core::compute_metrics(&state, &content);
                writer.write_row(&snapshot).context("writing metrics row")?;
            }
        }

        if state.meta.arrived {
            break;
        }
    }

    println!("{}", "-".repeat(80));
    println!("Done. Final state at {}:", state.clock);
    print_status(&state);

    summary.finish(&state);
    if let Some((dir, mut writer)) = metrics {
        writer.flush().context("final metrics flush")?;
        write_summary(&dir, &summary)?;
        println!("Metrics written to {}.", dir.display());
    }

    Ok(())
}

fn print_status(state: &GameState) {
    let ship = &state.ship;
    let alerts = state.alerts.active();
    let critical = alerts
        .iter()
        .filter(|a| a.severity == voyage_core::AlertSeverity::Critical)
        .count();
    let status = if state.meta.arrived {
        "ARRIVED"
    } else if ship.on_break {
        "BREAK"
    } else {
        "CRUISE"
    };

    println!(
        "[{clock:>6}]  {status:<7} {stage:?}  traveled={traveled:6.1}  hull={hull:5.1}  \
         o2={o2:5.1}  fuel={fuel:5.1}  battery={battery:5.1}  hazards={hazards:2}  \
         alerts={alerts:2} (critical={critical})",
        clock = state.clock.to_string(),
        stage = state.navigation.stage,
        traveled = ship.distance_traveled(),
        hull = ship.hull_damage.current,
        o2 = ship.oxygen.current,
        fuel = ship.fuel.current,
        battery = ship.battery.current,
        hazards = state.hazards.len(),
        alerts = alerts.len(),
    );
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            ticks,
            seed,
            state_file,
            content_dir,
            print_every,
            metrics_every,
            no_metrics,
            player,
            no_autopilot,
        } => run(RunOptions {
            ticks,
            seed,
            state_file,
            content_dir,
            print_every,
            metrics_every,
            no_metrics,
            player: player.into(),
            autopilot: !no_autopilot,
        })?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_written_as_json() {
        let dir = tempfile::tempdir().unwrap();
        let mut summary = RunSummary::new(42);
        summary.ticks_run = 10;
        summary.record(&Event::DestinationReached);
        summary.record(&Event::HazardDestroyed {
            hazard_id: voyage_core::HazardId("haz_000001".to_string()),
        });
        write_summary(dir.path(), &summary).unwrap();
        let text = std::fs::read_to_string(dir.path().join("summary.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["seed"], 42);
        assert_eq!(value["ticks_run"], 10);
        assert_eq!(value["hazards_destroyed"], 1);
        assert_eq!(value["hazard_impacts"], 0);
    }

    #[test]
    fn test_state_file_seeds_rng_from_meta() {
        let content = voyage_core::test_fixtures::base_content();
        let state = voyage_core::test_fixtures::base_state(&content);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, serde_json::to_string(&state).unwrap()).unwrap();

        let (loaded, _) =
            initial_state(&content, None, Some(path.display().to_string())).unwrap();
        assert_eq!(loaded.meta.seed, 42);
    }

    #[test]
    fn test_cli_parses_run_flags() {
        let cli = Cli::try_parse_from([
            "voyage_cli",
            "run",
            "--ticks",
            "30",
            "--seed",
            "7",
            "--player",
            "kestrel",
            "--no-metrics",
        ])
        .unwrap();
        let Commands::Run {
            ticks,
            seed,
            player,
            no_metrics,
            ..
        } = cli.command;
        assert_eq!(ticks, 30);
        assert_eq!(seed, Some(7));
        assert_eq!(Player::from(player), Player::Kestrel);
        assert!(no_metrics);
    }
}
