//! `voyage_core`: deterministic simulation of the two-ship voyage.
//!
//! No IO, no network. All randomness via the passed-in Rng.

pub mod alerts;
mod clock;
mod commands;
pub mod disaster;
mod engine;
pub mod fuel;
mod gauge;
pub mod hazards;
pub mod metrics;
pub mod navigation;
pub mod penalty;
mod speed;
#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;
mod types;
pub mod weapons;
pub mod wiring;

pub use commands::{apply_command, apply_commands};
pub use engine::tick;
pub use metrics::{compute_metrics, MetricsFileWriter, MetricsSnapshot};
pub use penalty::{penalty_for, SystemPenalties};
pub use speed::compute_speed;
pub use types::*;

pub(crate) fn emit(counters: &mut Counters, tick: u64, event: Event) -> EventEnvelope {
    let id = EventId(format!("evt_{:06}", counters.next_event_id));
    counters.next_event_id += 1;
    EventEnvelope { id, tick, event }
}

impl GameState {
    /// Ship whose view drives penalties and speed. Albatross until a player
    /// is selected.
    pub fn active_player(&self) -> Player {
        self.meta.local_player.unwrap_or(Player::Albatross)
    }
}

#[cfg(test)]
mod tests;
