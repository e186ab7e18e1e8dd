use crate::run_result::Outcome;
use crate::runner::{SeedResult, SeedRow};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use voyage_core::MetricsSnapshot;

type Extractor = (&'static str, fn(&MetricsSnapshot) -> f64);

const EXTRACTORS: &[Extractor] = &[
    ("distance_traveled", |s| s.distance_traveled),
    ("hull_damage", |s| s.hull_damage),
    ("oxygen", |s| s.oxygen),
    ("fuel", |s| s.fuel),
    ("battery", |s| s.battery),
    ("hazards_active", |s| s.hazards_active as f64),
    ("alerts_active", |s| s.alerts_active as f64),
    ("alerts_critical", |s| s.alerts_critical as f64),
    ("disasters_fired", |s| s.disasters_fired as f64),
    ("incorrect_connections", |s| f64::from(s.incorrect_connections)),
    ("weapons_penalty", |s| s.weapons_penalty),
    ("thrust_penalty", |s| s.thrust_penalty),
];

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub seed_count: usize,
    pub arrived_count: usize,
    pub stranded_count: usize,
    pub metrics: Vec<MetricSummary>,
}

#[derive(Debug, Serialize)]
pub struct MetricSummary {
    pub name: String,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub stddev: f64,
}

pub fn compute_summary(results: &[(Outcome, &MetricsSnapshot)]) -> SummaryStats {
    let count_outcome = |outcome| results.iter().filter(|(o, _)| *o == outcome).count();
    let metrics = EXTRACTORS
        .iter()
        .map(|(name, extract)| {
            let values: Vec<f64> = results.iter().map(|(_, s)| extract(s)).collect();
            compute_metric_summary(name, &values)
        })
        .collect();

    SummaryStats {
        seed_count: results.len(),
        arrived_count: count_outcome(Outcome::Arrived),
        stranded_count: count_outcome(Outcome::Stranded),
        metrics,
    }
}

fn compute_metric_summary(name: &str, values: &[f64]) -> MetricSummary {
    let count = values.len() as f64;
    let mean = values.iter().sum::<f64>() / count;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count;
    let stddev = variance.sqrt();

    MetricSummary {
        name: name.to_string(),
        mean,
        min,
        max,
        stddev,
    }
}

/// Aggregated metrics keyed by name:
/// `{ "key": { "mean": ..., "min": ..., "max": ..., "stddev": ... }, ... }`
pub fn build_aggregated_metrics(stats: &SummaryStats) -> serde_json::Value {
    let map = stats
        .metrics
        .iter()
        .map(|m| {
            (
                m.name.clone(),
                serde_json::json!({
                    "mean": m.mean,
                    "min": m.min,
                    "max": m.max,
                    "stddev": m.stddev,
                }),
            )
        })
        .collect();
    serde_json::Value::Object(map)
}

/// Writes one CSV row per seed.
pub fn write_seed_table(path: &Path, results: &[SeedResult]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    for result in results {
        writer
            .serialize(SeedRow::from(result))
            .with_context(|| format!("writing seed {} to {}", result.seed, path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("flushing {}", path.display()))?;
    Ok(())
}

pub fn print_summary(scenario_name: &str, ticks: u64, stats: &SummaryStats) {
    println!(
        "\n=== {} ({} seeds, {} ticks each) ===\n",
        scenario_name, stats.seed_count, ticks
    );
    println!(
        "{:<30} {:>8} {:>8} {:>8} {:>8}",
        "Metric", "Mean", "Min", "Max", "StdDev"
    );
    println!("{}", "-".repeat(70));
    for metric in &stats.metrics {
        println!(
            "{:<30} {:>8.2} {:>8.2} {:>8.2} {:>8.2}",
            metric.name, metric.mean, metric.min, metric.max, metric.stddev
        );
    }
    println!(
        "{:<30} {}/{}",
        "arrival_rate", stats.arrived_count, stats.seed_count
    );
    println!(
        "{:<30} {}/{}",
        "stranded_rate", stats.stranded_count, stats.seed_count
    );
}
