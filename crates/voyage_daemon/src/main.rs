mod routes;
mod state;
mod tick_loop;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use voyage_control::{AutopilotConfig, AutopilotController};
use voyage_core::Player;

use crate::routes::make_router_with_cors;
use crate::state::{AppState, SimState};
use crate::tick_loop::TickScheduler;

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

#[derive(Parser)]
#[command(name = "voyage_daemon", about = "Voyage session host with HTTP API")]
struct Cli {
    #[arg(long, default_value = "./content")]
    content_dir: String,
    /// World seed. Random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value_t = 3001)]
    port: u16,
    /// Game seconds advanced per real second.
    #[arg(long, default_value_t = 1.0)]
    ticks_per_sec: f64,
    /// Stop ticking after this many game seconds.
    #[arg(long)]
    max_ticks: Option<u64>,
    #[arg(long, default_value_t = 10)]
    metrics_every: u64,
    /// Seat the autopilot takes.
    #[arg(long, value_enum, default_value_t = Seat::Albatross)]
    player: Seat,
    /// Leave the controls to HTTP clients.
    #[arg(long)]
    no_autopilot: bool,
    #[arg(long, default_value = "http://localhost:5173")]
    cors_origin: String,
}

fn build_app(cli: &Cli) -> Result<AppState> {
    if !(cli.ticks_per_sec.is_finite() && cli.ticks_per_sec > 0.0) {
        bail!("--ticks-per-sec must be a positive number, got {}", cli.ticks_per_sec);
    }
    let content = voyage_world::load_content(&cli.content_dir)?;
    let seed = cli.seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let game_state = voyage_world::build_initial_state(&content, seed, &mut rng);
    let autopilot = (!cli.no_autopilot).then(|| {
        AutopilotController::new(AutopilotConfig {
            player: cli.player.into(),
            ..AutopilotConfig::default()
        })
    });

    tracing::info!(
        seed,
        content_version = %content.content_version,
        autopilot = autopilot.is_some(),
        "world ready"
    );
    let sim = SimState::new(game_state, content, rng, autopilot, cli.metrics_every);
    Ok(AppState::new(sim, cli.ticks_per_sec))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "voyage_daemon=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let app_state = build_app(&cli)?;
    let router = make_router_with_cors(app_state.clone(), &cli.cors_origin);

    let mut scheduler = TickScheduler::start(app_state, cli.max_ticks);

    let addr = format!("0.0.0.0:{}", cli.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!("listening on http://{addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!("ctrl-c handler failed: {err}");
            }
        })
        .await
        .context("serving HTTP")?;

    scheduler.stop().await;
    Ok(())
}
