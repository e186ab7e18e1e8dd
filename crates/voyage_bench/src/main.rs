use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

mod overrides;
mod run_result;
mod runner;
mod scenario;
mod summary;

#[derive(Parser)]
#[command(
    name = "voyage_bench",
    about = "Multi-seed scenario runner for voyage balancing"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario file across multiple seeds.
    Run {
        /// Path to the scenario JSON file.
        #[arg(long)]
        scenario: String,
        /// Output directory (default: runs/).
        #[arg(long, default_value = "runs")]
        output_dir: String,
    },
}

fn load_base_state(path: Option<&str>) -> Result<Option<voyage_core::GameState>> {
    let Some(state_path) = path else {
        return Ok(None);
    };
    let json = std::fs::read_to_string(state_path)
        .with_context(|| format!("reading state file: {state_path}"))?;
    let loaded: voyage_core::GameState = serde_json::from_str(&json)
        .with_context(|| format!("parsing state file: {state_path}"))?;
    println!("Using state file: {state_path}");
    Ok(Some(loaded))
}

fn write_json_atomic(path: &Path, value: &serde_json::Value) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string_pretty(value).context("serializing batch summary")?;
    let mut file =
        std::fs::File::create(&tmp).with_context(|| format!("creating {}", tmp.display()))?;
    file.write_all(json.as_bytes())
        .with_context(|| format!("writing {}", tmp.display()))?;
    file.sync_all()?;
    std::fs::rename(&tmp, path).with_context(|| format!("renaming {}", tmp.display()))?;
    Ok(())
}

fn run(scenario_path: &str, output_dir: &str) -> Result<()> {
    let scenario = scenario::load_scenario(Path::new(scenario_path))?;
    let seeds = scenario.seeds.expand();

    println!(
        "Loading scenario '{}': {} seeds × {} ticks",
        scenario.name,
        seeds.len(),
        scenario.ticks
    );

    let mut content = voyage_world::load_content(&scenario.content_dir)?;
    overrides::apply_overrides(&mut content.constants, &scenario.overrides)?;
    let base_state = load_base_state(scenario.state.as_deref())?;

    let scenario_params = serde_json::json!({
        "ticks": scenario.ticks,
        "metrics_every": scenario.metrics_every,
        "content_dir": scenario.content_dir,
        "state": scenario.state,
        "overrides": scenario.overrides,
        "autopilot": serde_json::to_value(&scenario.autopilot).context("serializing autopilot")?,
    });

    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let run_dir = PathBuf::from(output_dir).join(format!("{}_{}", scenario.name, timestamp));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("creating output directory: {}", run_dir.display()))?;
    std::fs::copy(scenario_path, run_dir.join("scenario.json")).context("copying scenario file")?;

    println!("Output: {}", run_dir.display());
    println!("Running {} seeds in parallel...", seeds.len());

    let spec = runner::RunSpec {
        content: &content,
        ticks: scenario.ticks,
        metrics_every: scenario.metrics_every,
        scenario_name: &scenario.name,
        scenario_params: &scenario_params,
        autopilot: &scenario.autopilot,
        base_state: base_state.as_ref(),
    };
    let results: Vec<Result<runner::SeedResult>> = seeds
        .par_iter()
        .map(|&seed| runner::run_seed(&spec, seed, &run_dir.join(format!("seed_{seed}"))))
        .collect();

    let mut seed_results = Vec::new();
    for result in results {
        match result {
            Ok(seed_result) => seed_results.push(seed_result),
            Err(err) => eprintln!("Seed failed: {err:#}"),
        }
    }
    if seed_results.is_empty() {
        anyhow::bail!("all seeds failed");
    }

    let outcome_refs: Vec<_> = seed_results
        .iter()
        .map(|r| (r.outcome, &r.final_snapshot))
        .collect();
    let stats = summary::compute_summary(&outcome_refs);
    summary::print_summary(&scenario.name, scenario.ticks, &stats);

    let summary_path = run_dir.join("summary.json");
    let summary_json = serde_json::to_string_pretty(&stats).context("serializing summary")?;
    std::fs::write(&summary_path, summary_json)
        .with_context(|| format!("writing {}", summary_path.display()))?;

    let table_path = run_dir.join("seeds.csv");
    summary::write_seed_table(&table_path, &seed_results)?;

    let run_ids: Vec<&str> = seed_results.iter().map(|r| r.run_id.as_str()).collect();
    let batch_summary = serde_json::json!({
        "batch_schema_version": 1,
        "batch_id": Uuid::new_v4().to_string(),
        "scenario_name": scenario.name,
        "scenario_params": scenario_params,
        "seed_count": seed_results.len(),
        "run_ids": run_ids,
        "arrived_count": stats.arrived_count,
        "stranded_count": stats.stranded_count,
        "aggregated_metrics": summary::build_aggregated_metrics(&stats),
    });
    let batch_path = run_dir.join("batch_summary.json");
    write_json_atomic(&batch_path, &batch_summary)?;

    println!("Summary written to {}", summary_path.display());
    println!("Seed table written to {}", table_path.display());
    println!("Batch summary written to {}", batch_path.display());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            scenario,
            output_dir,
        } => run(&scenario, &output_dir)?,
    }
    Ok(())
}
