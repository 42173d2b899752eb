mod evaluator;
mod population;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::thread;

use picker_core::{
    CollectionRegistry, Item, ItemId, Outcome, PickerError, Selection, Selector,
};
use rand::{Rng, RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

use crate::analytics::{AnalyticsCollector, AnalyticsError};
use crate::config::{ArmConfig, BenchmarkConfig, ResolvedOutputs};

pub use evaluator::SimulatedEvaluator;
pub use population::Population;

/// Primary entry point for replaying selection policies against a synthetic evaluator.
pub struct SimulationRunner {
    config: BenchmarkConfig,
    outputs: ResolvedOutputs,
    arms: Vec<ArmBlueprint>,
    evaluator: SimulatedEvaluator,
    logging_enabled: bool,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub arms: usize,
    pub comparisons: usize,
    pub rows_written: usize,
    pub best_arm: Option<String>,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
}

struct ArmBlueprint {
    name: String,
    selector: Selector,
}

/// Everything one arm produced, kept in memory until the arms are joined.
pub struct ArmTrace {
    pub name: String,
    pub rows: Vec<ComparisonRow>,
    pub items: Vec<Item>,
    pub distinct_pairs: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonRow {
    pub run_id: String,
    pub arm: String,
    pub step: usize,
    pub left: ItemId,
    pub right: ItemId,
    pub outcome: Outcome,
    pub edelta: f64,
    pub score: f64,
    pub source: &'static str,
    pub cooldown_relaxed: bool,
    pub mean_sigma: f64,
}

impl SimulationRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: BenchmarkConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        let arms = ArmBlueprint::from_configs(&config.arms, &config)?;
        let evaluator = SimulatedEvaluator::new(&config.evaluator)?;
        Ok(Self {
            logging_enabled: config.logging.enable_structured,
            config,
            outputs,
            arms,
            evaluator,
        })
    }

    /// Run every arm, stream JSONL rows to disk and write the Markdown summary.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let seed = self.config.population.seed.unwrap_or(0);
        let population = Population::generate(&self.config.population, seed)?;
        let registry = CollectionRegistry::new(self.config.rating)?;

        let arm_seeds = arm_seeds(seed, self.arms.len());

        let traces = thread::scope(|scope| {
            let handles: Vec<_> = self
                .arms
                .iter()
                .zip(arm_seeds.iter().copied())
                .map(|(arm, arm_seed)| {
                    let registry = &registry;
                    let population = &population;
                    scope.spawn(move || self.run_arm(arm, arm_seed, registry, population))
                })
                .collect();

            handles
                .into_iter()
                .zip(&self.arms)
                .map(|(handle, arm)| {
                    handle.join().unwrap_or_else(|_| {
                        Err(RunnerError::WorkerPanicked {
                            arm: arm.name.clone(),
                        })
                    })
                })
                .collect::<Result<Vec<_>, _>>()
        })?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut rows_written = 0usize;
        let mut analytics = AnalyticsCollector::new(&self.config)?;
        for trace in &traces {
            for row in &trace.rows {
                serde_json::to_writer(&mut writer, row)?;
                writer.write_all(b"\n")?;
                rows_written += 1;
            }
            analytics.record_arm(trace, &population)?;
        }
        writer.flush()?;

        let summary = analytics.finalize()?;
        summary.write_markdown(&self.outputs.summary_md)?;

        Ok(RunSummary {
            arms: traces.len(),
            comparisons: self.config.comparisons,
            rows_written,
            best_arm: summary.best_arm().map(str::to_string),
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
        })
    }

    fn run_arm(
        &self,
        arm: &ArmBlueprint,
        seed: u64,
        registry: &CollectionRegistry,
        population: &Population,
    ) -> Result<ArmTrace, RunnerError> {
        let handle = registry.get_or_create(&arm.name);
        let mut collection = handle.lock();
        for id in population.ids() {
            collection.insert_item(id);
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut rows = Vec::with_capacity(self.config.comparisons);
        for step in 0..self.config.comparisons {
            let selection = collection.next_pair(&arm.selector, &mut rng)?;
            let (left, right) = orient(&selection, &mut rng);
            let outcome = self.evaluator.judge(
                appeal_of(population, left)?,
                appeal_of(population, right)?,
                &mut rng,
            );
            collection.apply(left, right, outcome)?;

            rows.push(ComparisonRow {
                run_id: self.config.run_id.clone(),
                arm: arm.name.clone(),
                step,
                left,
                right,
                outcome,
                edelta: selection.expected_reduction,
                score: selection.score,
                source: selection.source.as_str(),
                cooldown_relaxed: selection.cooldown_relaxed,
                mean_sigma: collection.total_uncertainty() / collection.len() as f64,
            });
        }

        if self.logging_enabled && tracing::enabled!(Level::INFO) {
            event!(
                target: "picker_bench::arm",
                Level::INFO,
                run_id = %self.config.run_id,
                arm = %arm.name,
                comparisons = rows.len(),
                skips = collection.log().count_outcome(Outcome::Skip),
                mean_sigma = collection.total_uncertainty() / collection.len() as f64,
            );
        }

        Ok(ArmTrace {
            name: arm.name.clone(),
            rows,
            items: collection.items().to_vec(),
            distinct_pairs: collection.log().distinct_pairs(),
        })
    }
}

impl ArmBlueprint {
    fn from_configs(
        arms: &[ArmConfig],
        config: &BenchmarkConfig,
    ) -> Result<Vec<Self>, RunnerError> {
        arms.iter()
            .map(|arm| {
                Ok(Self {
                    name: arm.name.clone(),
                    selector: Selector::new(arm.policy, config.rating)?,
                })
            })
            .collect()
    }
}

/// Keeps the per-arm streams apart from the one that drew the hidden appeal.
const ARM_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

fn arm_seeds(seed: u64, count: usize) -> Vec<u64> {
    let mut seeder = StdRng::seed_from_u64(seed ^ ARM_SEED_SALT);
    (0..count).map(|_| seeder.next_u64()).collect()
}

/// The selector returns an unordered pair; the screen shows it in a random orientation.
fn orient<R: Rng + ?Sized>(selection: &Selection, rng: &mut R) -> (ItemId, ItemId) {
    let (low, high) = (selection.pair.low(), selection.pair.high());
    if rng.gen_bool(0.5) {
        (high, low)
    } else {
        (low, high)
    }
}

fn appeal_of(population: &Population, id: ItemId) -> Result<f64, RunnerError> {
    population
        .appeal(id)
        .ok_or_else(|| RunnerError::Simulation {
            message: format!("item {id} has no hidden appeal"),
        })
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("rating engine error: {0}")]
    Engine(#[from] PickerError),
    #[error("simulation failed: {message}")]
    Simulation { message: String },
    #[error("worker for arm '{arm}' panicked")]
    WorkerPanicked { arm: String },
    #[error("analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use picker_core::PairKey;
    use picker_core::select::CandidateSource;

    #[test]
    fn arm_seeds_do_not_reuse_the_population_stream() {
        let seed = 20_251_018;
        let seeds = arm_seeds(seed, 4);
        assert_eq!(seeds, arm_seeds(seed, 4));

        let mut population_stream = StdRng::seed_from_u64(seed);
        let population_draws: Vec<u64> = (0..4).map(|_| population_stream.next_u64()).collect();
        assert!(seeds.iter().all(|s| !population_draws.contains(s)));
        assert_ne!(arm_seeds(seed + 1, 4), seeds);
    }

    #[test]
    fn orientation_covers_both_sides() {
        let selection = Selection {
            pair: PairKey::new(ItemId(1), ItemId(2)).unwrap(),
            score: 0.0,
            expected_reduction: 0.0,
            repeat_count: 0,
            source: CandidateSource::Exhaustive,
            candidates: 1,
            cooldown_relaxed: false,
        };
        let mut rng = StdRng::seed_from_u64(10);
        let mut seen_swapped = false;
        let mut seen_straight = false;
        for _ in 0..64 {
            match orient(&selection, &mut rng) {
                (ItemId(2), ItemId(1)) => seen_swapped = true,
                (ItemId(1), ItemId(2)) => seen_straight = true,
                other => panic!("unexpected orientation {other:?}"),
            }
        }
        assert!(seen_swapped && seen_straight);
    }
}
