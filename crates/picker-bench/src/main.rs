use std::path::PathBuf;

use clap::Parser;

use picker_bench::config::{BenchmarkConfig, ResolvedOutputs};
use picker_bench::logging::init_logging;
use picker_bench::simulation::SimulationRunner;

/// Benchmarking harness for pair-selection policies.
#[derive(Debug, Parser)]
#[command(
    name = "picker-bench",
    author,
    version,
    about = "Deterministic pair-selection benchmark against a simulated evaluator"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/picker.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the seed for the population and every arm.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Override the number of pairs shown per arm.
    #[arg(long, value_name = "COUNT")]
    comparisons: Option<usize>,

    /// Override the population size.
    #[arg(long, value_name = "COUNT")]
    items: Option<usize>,

    /// Exit after validating the configuration (no simulation is run).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = BenchmarkConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(seed) = cli.seed {
        config.population.seed = Some(seed);
    }

    if let Some(comparisons) = cli.comparisons {
        config.comparisons = comparisons;
    }

    if let Some(items) = cli.items {
        config.population.items = items;
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let arm_count = config.arms.len();
    let run_id = config.run_id.clone();
    let items = config.population.items;
    let comparisons = config.comparisons;

    println!(
        "Loaded configuration '{run_id}' with {arm_count} arm{} ({items} items, {comparisons} comparisons per arm)",
        if arm_count == 1 { "" } else { "s" }
    );

    let logging_guard = init_logging(&config.logging, &outputs)?;
    let runner = SimulationRunner::new(config, outputs)?;

    if cli.validate_only {
        println!("Validation-only mode: simulation skipped.");
        return Ok(());
    }

    let summary = runner.run()?;
    println!(
        "Simulation complete for '{run_id}': {} arms × {} comparisons → {} rows at {}",
        summary.arms,
        summary.comparisons,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(best) = summary.best_arm.as_ref() {
        println!("Best arm by Kendall τ: {best}");
    }
    if let Some(guard) = logging_guard.as_ref() {
        println!("Telemetry log: {}", guard.telemetry_path.display());
    }

    Ok(())
}
