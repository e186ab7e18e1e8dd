use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use voyage_core::{MetricsSnapshot, Quadrant};

/// How a seed's voyage ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Arrived,
    /// Tank empty short of the destination; the ship can no longer move.
    Stranded,
    InFlight,
}

#[derive(Debug, Serialize)]
pub struct RunResult {
    pub run_schema_version: u32,
    pub run_status: String,
    pub run_id: String,
    pub git_sha: String,
    pub git_dirty: bool,
    pub seed: u64,
    pub scenario_name: String,
    pub scenario_params: serde_json::Value,
    pub tick_end: u64,
    pub total_ticks: u64,
    pub wall_time_ms: u64,
    pub sim_ticks_per_second: f64,
    pub outcome: Outcome,
    pub summary_metrics: Option<SummaryMetrics>,
    pub tallies: EventTallies,
    pub metrics_path: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryMetrics {
    pub distance_traveled: f64,
    pub hull_damage: f64,
    pub oxygen: f64,
    pub fuel: f64,
    pub battery: f64,
    pub hazards_active: usize,
    pub alerts_active: usize,
    pub alerts_critical: usize,
    pub disasters_fired: u64,
    pub incorrect_connections: u32,
    pub quadrant: Quadrant,
}

impl SummaryMetrics {
    pub fn from_snapshot(snapshot: &MetricsSnapshot) -> Self {
        Self {
            distance_traveled: snapshot.distance_traveled,
            hull_damage: snapshot.hull_damage,
            oxygen: snapshot.oxygen,
            fuel: snapshot.fuel,
            battery: snapshot.battery,
            hazards_active: snapshot.hazards_active,
            alerts_active: snapshot.alerts_active,
            alerts_critical: snapshot.alerts_critical,
            disasters_fired: snapshot.disasters_fired,
            incorrect_connections: snapshot.incorrect_connections,
            quadrant: snapshot.quadrant,
        }
    }
}

/// Counts gathered from the event stream while a seed runs.
#[derive(Debug, Default, Serialize)]
pub struct EventTallies {
    pub hazards_destroyed: u64,
    pub hazard_impacts: u64,
    pub mixtures_accepted: u64,
    pub breaks_taken: u64,
    pub disasters_by_kind: BTreeMap<String, u64>,
    pub alert_counts_by_name: BTreeMap<String, u64>,
    pub alert_first_tick_by_name: BTreeMap<String, u64>,
}

impl EventTallies {
    pub fn record(&mut self, envelope: &voyage_core::EventEnvelope) {
        use voyage_core::Event;
        match &envelope.event {
            Event::HazardDestroyed { .. } => self.hazards_destroyed += 1,
            Event::HazardImpacted { .. } => self.hazard_impacts += 1,
            Event::FuelMixtureAccepted { .. } => self.mixtures_accepted += 1,
            Event::BreakStarted { .. } => self.breaks_taken += 1,
            Event::DisasterTriggered { disaster, .. } => {
                *self
                    .disasters_by_kind
                    .entry(disaster.name().to_string())
                    .or_default() += 1;
            }
            Event::AlertRaised { name, .. } => {
                *self.alert_counts_by_name.entry(name.clone()).or_default() += 1;
                self.alert_first_tick_by_name
                    .entry(name.clone())
                    .or_insert(envelope.tick);
            }
            _ => {}
        }
    }
}

impl RunResult {
    /// Write JSON atomically: write to `.tmp` then rename.
    pub fn write_atomic(&self, path: &Path) -> anyhow::Result<()> {
        let tmp_path = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(self)?;
        let mut file = std::fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        std::fs::rename(&tmp_path, path)?;
        Ok(())
    }
}

pub fn detect_outcome(snapshot: &MetricsSnapshot) -> Outcome {
    if snapshot.arrived {
        Outcome::Arrived
    } else if snapshot.fuel <= 0.0 {
        Outcome::Stranded
    } else {
        Outcome::InFlight
    }
}

pub fn git_sha() -> String {
    env!("GIT_SHA").to_string()
}

pub fn git_dirty() -> bool {
    env!("GIT_DIRTY") == "true"
}
