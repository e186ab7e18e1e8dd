use crate::state::{AppState, SimState};
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use voyage_control::CommandSource;
use voyage_core::EventEnvelope;

/// Runs one game second: autopilot commands first, then the tick, then a
/// metrics sample when due.
pub fn step(sim: &mut SimState) -> Vec<EventEnvelope> {
    let SimState {
        game_state,
        content,
        rng,
        autopilot,
        next_command_id,
        ..
    } = sim;

    let mut events = Vec::new();
    if let Some(autopilot) = autopilot {
        let commands = autopilot.generate_commands(game_state, content, next_command_id);
        events.extend(voyage_core::apply_commands(game_state, &commands, content));
    }
    events.extend(voyage_core::tick(game_state, content, rng));

    let now = sim.game_state.clock.total_seconds();
    if sim.metrics_every > 0 && now % sim.metrics_every == 0 {
        let snapshot = voyage_core::compute_metrics(&sim.game_state, &sim.content);
        sim.push_metrics(snapshot);
    }
    events
}

/// Owns the background task that advances the game once per period.
///
/// A tick that overruns its period delays the next one; missed ticks are
/// never replayed.
pub struct TickScheduler {
    shutdown: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl TickScheduler {
    pub fn start(app: AppState, max_ticks: Option<u64>) -> Self {
        let period = Duration::from_secs_f64(1.0 / app.ticks_per_sec.max(f64::EPSILON));
        let (shutdown, shutdown_rx) = watch::channel(false);
        tracing::info!(?period, ?max_ticks, "tick loop starting");
        let handle = tokio::spawn(run_tick_loop(app, period, max_ticks, shutdown_rx));
        Self {
            shutdown,
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Stops the loop and waits for the in-flight tick to finish. Calling it
    /// again is a no-op.
    pub async fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        let _ = self.shutdown.send(true);
        if let Err(err) = handle.await {
            tracing::error!("tick loop task failed: {err}");
        }
    }
}

async fn run_tick_loop(
    app: AppState,
    period: Duration,
    max_ticks: Option<u64>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = shutdown.changed() => break,
        }
        if app.paused.load(Ordering::Relaxed) {
            continue;
        }

        let (events, done) = {
            let mut sim = app.sim.lock();
            let events = step(&mut sim);
            let now = sim.game_state.clock.total_seconds();
            let done = sim.game_state.meta.arrived || max_ticks.is_some_and(|max| now >= max);
            (events, done)
        };

        tracing::debug!(events = events.len(), "tick");
        let _ = app.event_tx.send(events);

        if done {
            break;
        }
    }
    tracing::info!("tick loop stopped");
}
