//! Per-tick metrics snapshots and the rotating CSV writer.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::penalty::SystemPenalties;
use crate::{AlertSeverity, GameContent, GameState, Quadrant};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub tick: u64,
    pub distance_traveled: f64,
    pub hull_damage: f64,
    pub oxygen: f64,
    pub fuel: f64,
    pub battery: f64,
    pub hazards_active: usize,
    pub alerts_active: usize,
    pub alerts_critical: usize,
    pub disasters_fired: u64,
    pub weapons_penalty: f64,
    pub thrust_penalty: f64,
    pub fuel_penalty: f64,
    pub power_penalty: f64,
    pub incorrect_connections: u32,
    pub quadrant: Quadrant,
    pub on_break: bool,
    pub arrived: bool,
}

pub fn compute_metrics(state: &GameState, content: &GameContent) -> MetricsSnapshot {
    let player = state.active_player();
    let penalties = SystemPenalties::derive(Some(&state.engineering), player, &content.constants);
    MetricsSnapshot {
        tick: state.clock.total_seconds(),
        distance_traveled: state.ship.distance_traveled(),
        hull_damage: state.ship.hull_damage.current,
        oxygen: state.ship.oxygen.current,
        fuel: state.ship.fuel.current,
        battery: state.ship.battery.current,
        hazards_active: state.hazards.len(),
        alerts_active: state.alerts.active().len(),
        alerts_critical: state.alerts.count_with_severity(AlertSeverity::Critical),
        disasters_fired: state.disasters.fired,
        weapons_penalty: penalties.weapons,
        thrust_penalty: penalties.thrust,
        fuel_penalty: penalties.fuel,
        power_penalty: penalties.power,
        incorrect_connections: state.engineering.total_incorrect(player),
        quadrant: state.navigation.stage,
        on_break: state.ship.on_break,
        arrived: state.meta.arrived,
    }
}

const HEADER: &str = "tick,distance_traveled,hull_damage,oxygen,fuel,battery,hazards_active,\
alerts_active,alerts_critical,disasters_fired,weapons_penalty,thrust_penalty,fuel_penalty,\
power_penalty,incorrect_connections,quadrant,on_break,arrived";

fn write_row(out: &mut impl Write, s: &MetricsSnapshot) -> std::io::Result<()> {
    writeln!(
        out,
        "{},{:.1},{:.1},{:.1},{:.1},{:.1},{},{},{},{},{:.2},{:.2},{:.2},{:.2},{},{:?},{},{}",
        s.tick,
        s.distance_traveled,
        s.hull_damage,
        s.oxygen,
        s.fuel,
        s.battery,
        s.hazards_active,
        s.alerts_active,
        s.alerts_critical,
        s.disasters_fired,
        s.weapons_penalty,
        s.thrust_penalty,
        s.fuel_penalty,
        s.power_penalty,
        s.incorrect_connections,
        s.quadrant,
        s.on_break,
        s.arrived,
    )
}

const MAX_ROWS_PER_FILE: usize = 50_000;

/// Appends snapshots to `metrics_000.csv`, rolling over to `metrics_001.csv`
/// and so on every [`MAX_ROWS_PER_FILE`] rows.
pub struct MetricsFileWriter {
    dir: PathBuf,
    index: u32,
    rows: usize,
    writer: std::io::BufWriter<std::fs::File>,
}

impl MetricsFileWriter {
    pub fn new(dir: PathBuf) -> std::io::Result<Self> {
        let writer = open_file(&dir, 0)?;
        Ok(Self {
            dir,
            index: 0,
            rows: 0,
            writer,
        })
    }

    pub fn write_row(&mut self, snapshot: &MetricsSnapshot) -> std::io::Result<()> {
        if self.rows >= MAX_ROWS_PER_FILE {
            self.writer.flush()?;
            self.index += 1;
            self.writer = open_file(&self.dir, self.index)?;
            self.rows = 0;
        }
        write_row(&mut self.writer, snapshot)?;
        self.rows += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

fn open_file(dir: &Path, index: u32) -> std::io::Result<std::io::BufWriter<std::fs::File>> {
    let file = std::fs::File::create(dir.join(format!("metrics_{index:03}.csv")))?;
    let mut writer = std::io::BufWriter::new(file);
    writeln!(writer, "{HEADER}")?;
    Ok(writer)
}
