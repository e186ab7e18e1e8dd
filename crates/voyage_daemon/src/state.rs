use parking_lot::Mutex;
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio::sync::broadcast;
use voyage_control::AutopilotController;
use voyage_core::{EventEnvelope, GameContent, GameState, MetricsSnapshot};

/// Snapshots kept for `/api/v1/metrics`.
pub const METRICS_HISTORY_LEN: usize = 600;

pub struct SimState {
    pub game_state: GameState,
    pub content: GameContent,
    pub rng: ChaCha8Rng,
    /// `None` when a human crew drives the ship through `/api/v1/command`.
    pub autopilot: Option<AutopilotController>,
    pub next_command_id: u64,
    pub metrics_every: u64,
    pub metrics_history: VecDeque<MetricsSnapshot>,
}

impl SimState {
    pub fn new(
        game_state: GameState,
        content: GameContent,
        rng: ChaCha8Rng,
        autopilot: Option<AutopilotController>,
        metrics_every: u64,
    ) -> Self {
        Self {
            game_state,
            content,
            rng,
            autopilot,
            next_command_id: 0,
            metrics_every,
            metrics_history: VecDeque::with_capacity(METRICS_HISTORY_LEN),
        }
    }

    pub fn push_metrics(&mut self, snapshot: MetricsSnapshot) {
        if self.metrics_history.len() >= METRICS_HISTORY_LEN {
            self.metrics_history.pop_front();
        }
        self.metrics_history.push_back(snapshot);
    }
}

pub type SharedSim = Arc<Mutex<SimState>>;
pub type EventTx = broadcast::Sender<Vec<EventEnvelope>>;

#[derive(Clone)]
pub struct AppState {
    pub sim: SharedSim,
    pub event_tx: EventTx,
    pub paused: Arc<AtomicBool>,
    pub ticks_per_sec: f64,
}

impl AppState {
    pub fn new(sim: SimState, ticks_per_sec: f64) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self {
            sim: Arc::new(Mutex::new(sim)),
            event_tx,
            paused: Arc::new(AtomicBool::new(false)),
            ticks_per_sec,
        }
    }
}
