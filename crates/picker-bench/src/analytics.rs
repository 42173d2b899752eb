use std::fs;
use std::path::Path;

use picker_core::{Item, ItemId, Outcome, SelectionMode};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use thiserror::Error;

use crate::config::BenchmarkConfig;
use crate::simulation::{ArmTrace, Population};

const CONFIDENCE_LEVEL: f64 = 0.95;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("baseline arm '{0}' not present in simulation results")]
    MissingBaseline(String),
    #[error("arm '{0}' produced results but is missing from configuration")]
    UnknownArm(String),
    #[error("item {0} has no hidden appeal in the population")]
    UnknownItem(ItemId),
    #[error("statistics error: {0}")]
    Statistics(String),
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

pub struct AnalyticsCollector {
    run_id: String,
    baseline: String,
    arms: Vec<(String, SelectionMode)>,
    conservative_k: f64,
    leaderboard_size: usize,
    reports: Vec<ArmReport>,
    leaderboards: Vec<Vec<LeaderboardRow>>,
    z_critical: f64,
}

impl AnalyticsCollector {
    pub fn new(config: &BenchmarkConfig) -> Result<Self, AnalyticsError> {
        let baseline = config
            .baseline()
            .map(str::to_string)
            .ok_or_else(|| AnalyticsError::MissingBaseline("<unset>".into()))?;
        let normal =
            Normal::new(0.0, 1.0).map_err(|err| AnalyticsError::Statistics(err.to_string()))?;

        Ok(Self {
            run_id: config.run_id.clone(),
            baseline,
            arms: config
                .arms
                .iter()
                .map(|arm| (arm.name.clone(), arm.policy.mode))
                .collect(),
            conservative_k: config.metrics.conservative_k,
            leaderboard_size: config.metrics.leaderboard_size,
            reports: Vec::new(),
            leaderboards: Vec::new(),
            z_critical: normal.inverse_cdf(0.5 + CONFIDENCE_LEVEL / 2.0),
        })
    }

    pub fn record_arm(
        &mut self,
        trace: &ArmTrace,
        population: &Population,
    ) -> Result<(), AnalyticsError> {
        let mode = self
            .arms
            .iter()
            .find(|(name, _)| *name == trace.name)
            .map(|(_, mode)| *mode)
            .ok_or_else(|| AnalyticsError::UnknownArm(trace.name.clone()))?;

        let mut estimated = Vec::with_capacity(trace.items.len());
        let mut truth = Vec::with_capacity(trace.items.len());
        for item in &trace.items {
            estimated.push(item.belief.conservative(self.conservative_k));
            truth.push(
                population
                    .appeal(item.id)
                    .ok_or(AnalyticsError::UnknownItem(item.id))?,
            );
        }

        let spearman_rho = spearman_rho(&estimated, &truth);
        let count = |outcome: Outcome| trace.rows.iter().filter(|r| r.outcome == outcome).count();
        let mean_sigma = if trace.items.is_empty() {
            0.0
        } else {
            trace.items.iter().map(|item| item.belief.sigma).sum::<f64>() / trace.items.len() as f64
        };

        self.reports.push(ArmReport {
            name: trace.name.clone(),
            mode,
            comparisons: trace.rows.len(),
            kendall_tau: kendall_tau(&estimated, &truth),
            spearman_rho,
            rho_ci95: fisher_interval(spearman_rho, estimated.len(), self.z_critical),
            mean_sigma,
            distinct_pairs: trace.distinct_pairs,
            skips: count(Outcome::Skip),
            draws: count(Outcome::Draw),
            cooldown_relaxations: trace.rows.iter().filter(|r| r.cooldown_relaxed).count(),
            thompson_passes: trace.rows.iter().filter(|r| r.source == "thompson").count(),
            delta_tau_vs_baseline: 0.0,
        });
        self.leaderboards.push(leaderboard(
            &trace.items,
            &truth,
            self.conservative_k,
            self.leaderboard_size,
        ));
        Ok(())
    }

    pub fn finalize(self) -> Result<AnalyticsSummary, AnalyticsError> {
        let baseline_tau = self
            .reports
            .iter()
            .find(|report| report.name == self.baseline)
            .map(|report| report.kendall_tau)
            .ok_or_else(|| AnalyticsError::MissingBaseline(self.baseline.clone()))?;

        let mut arms = self.reports;
        for report in &mut arms {
            report.delta_tau_vs_baseline = report.kendall_tau - baseline_tau;
        }

        let best = arms
            .iter()
            .enumerate()
            .max_by(|(ia, a), (ib, b)| {
                a.kendall_tau
                    .total_cmp(&b.kendall_tau)
                    .then_with(|| ib.cmp(ia))
            })
            .map(|(idx, _)| idx);
        let leaderboard = best
            .and_then(|idx| self.leaderboards.into_iter().nth(idx))
            .unwrap_or_default();

        Ok(AnalyticsSummary {
            run_id: self.run_id,
            baseline: self.baseline,
            conservative_k: self.conservative_k,
            best_arm: best.map(|idx| arms[idx].name.clone()),
            arms,
            leaderboard,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ArmReport {
    pub name: String,
    pub mode: SelectionMode,
    pub comparisons: usize,
    pub kendall_tau: f64,
    pub spearman_rho: f64,
    pub rho_ci95: (f64, f64),
    pub mean_sigma: f64,
    pub distinct_pairs: usize,
    pub skips: usize,
    pub draws: usize,
    pub cooldown_relaxations: usize,
    pub thompson_passes: usize,
    #[serde(skip)]
    pub delta_tau_vs_baseline: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardRow {
    pub rank: usize,
    pub item: ItemId,
    pub mu: f64,
    pub sigma: f64,
    pub conservative: f64,
    pub true_rank: usize,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsSummary {
    pub run_id: String,
    pub baseline: String,
    pub conservative_k: f64,
    pub best_arm: Option<String>,
    pub arms: Vec<ArmReport>,
    pub leaderboard: Vec<LeaderboardRow>,
}

impl AnalyticsSummary {
    pub fn best_arm(&self) -> Option<&str> {
        self.best_arm.as_deref()
    }

    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), AnalyticsError> {
        let mut rows = String::new();
        rows.push_str("# Selection Benchmark Summary\n\n");
        rows.push_str(&format!(
            "Run `{}`: items ranked by `mu - {:.1}·sigma`, compared with hidden appeal; baseline arm `{}`.\n\n",
            self.run_id, self.conservative_k, self.baseline
        ));
        rows.push_str("| Arm | Mode | Comparisons | Kendall τ | Δτ vs baseline | Spearman ρ | ρ 95% CI | Mean σ | Distinct pairs | Skips | Draws | Thompson passes | Cooldown relaxed |\n");
        rows.push_str("|-----|------|-------------|-----------|-----------------|------------|----------|--------|----------------|-------|-------|-----------------|------------------|\n");

        for arm in &self.arms {
            rows.push_str(&format!(
                "| {name} | {mode} | {comparisons} | {tau:.3} | {delta:+.3} | {rho:.3} | [{lo:.3}, {hi:.3}] | {sigma:.3} | {pairs} | {skips} | {draws} | {thompson} | {relaxed} |\n",
                name = arm.name,
                mode = arm.mode,
                comparisons = arm.comparisons,
                tau = arm.kendall_tau,
                delta = arm.delta_tau_vs_baseline,
                rho = arm.spearman_rho,
                lo = arm.rho_ci95.0,
                hi = arm.rho_ci95.1,
                sigma = arm.mean_sigma,
                pairs = arm.distinct_pairs,
                skips = arm.skips,
                draws = arm.draws,
                thompson = arm.thompson_passes,
                relaxed = arm.cooldown_relaxations,
            ));
        }

        if let Some(best) = self.best_arm() {
            rows.push_str(&format!("\n## Leaderboard ({best})\n\n"));
            rows.push_str("| Rank | Item | μ | σ | Conservative | True rank |\n");
            rows.push_str("|------|------|---|---|--------------|-----------|\n");
            for row in &self.leaderboard {
                rows.push_str(&format!(
                    "| {} | {} | {:.3} | {:.3} | {:.3} | {} |\n",
                    row.rank, row.item, row.mu, row.sigma, row.conservative, row.true_rank
                ));
            }
        }

        fs::write(path.as_ref(), rows).map_err(|e| AnalyticsError::Io {
            context: "writing summary markdown",
            source: e,
        })?;
        Ok(())
    }
}

fn leaderboard(items: &[Item], truth: &[f64], k: f64, size: usize) -> Vec<LeaderboardRow> {
    let true_ranks = descending_ranks(truth);
    let mut order: Vec<usize> = (0..items.len()).collect();
    order.sort_by(|&a, &b| {
        items[b]
            .belief
            .conservative(k)
            .total_cmp(&items[a].belief.conservative(k))
            .then_with(|| items[a].id.cmp(&items[b].id))
    });
    order
        .into_iter()
        .take(size)
        .enumerate()
        .map(|(rank, idx)| LeaderboardRow {
            rank: rank + 1,
            item: items[idx].id,
            mu: items[idx].belief.mu,
            sigma: items[idx].belief.sigma,
            conservative: items[idx].belief.conservative(k),
            true_rank: true_ranks[idx],
        })
        .collect()
}

/// 1-based positions when sorted by descending value; ties keep input order.
fn descending_ranks(values: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[b].total_cmp(&values[a]).then_with(|| a.cmp(&b)));
    let mut ranks = vec![0; values.len()];
    for (position, idx) in order.into_iter().enumerate() {
        ranks[idx] = position + 1;
    }
    ranks
}

/// Kendall's tau-b; tied pairs count as neither concordant nor discordant.
pub fn kendall_tau(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    let (mut concordant, mut discordant) = (0i64, 0i64);
    let (mut ties_a, mut ties_b) = (0i64, 0i64);
    for i in 0..n {
        for j in (i + 1)..n {
            let da = a[i] - a[j];
            let db = b[i] - b[j];
            if da == 0.0 && db == 0.0 {
                continue;
            } else if da == 0.0 {
                ties_a += 1;
            } else if db == 0.0 {
                ties_b += 1;
            } else if (da > 0.0) == (db > 0.0) {
                concordant += 1;
            } else {
                discordant += 1;
            }
        }
    }
    let untied_a = (concordant + discordant + ties_b) as f64;
    let untied_b = (concordant + discordant + ties_a) as f64;
    let denominator = (untied_a * untied_b).sqrt();
    if denominator == 0.0 {
        return 0.0;
    }
    (concordant - discordant) as f64 / denominator
}

pub fn spearman_rho(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n < 2 {
        return 0.0;
    }
    pearson(&average_ranks(&a[..n]), &average_ranks(&b[..n]))
}

/// Ascending ranks with tied values sharing their mean rank.
fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&x, &y| values[x].total_cmp(&values[y]));

    let mut ranks = vec![0.0; values.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        let rank = (i + j + 2) as f64 / 2.0;
        for &idx in &order[i..=j] {
            ranks[idx] = rank;
        }
        i = j + 1;
    }
    ranks
}

fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;
    let (mut cov, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
    for (x, y) in a.iter().zip(b) {
        cov += (x - mean_a) * (y - mean_b);
        var_a += (x - mean_a).powi(2);
        var_b += (y - mean_b).powi(2);
    }
    if var_a == 0.0 || var_b == 0.0 {
        return 0.0;
    }
    cov / (var_a * var_b).sqrt()
}

/// Fisher z-transform interval for a rank correlation over `n` items.
fn fisher_interval(rho: f64, n: usize, z_critical: f64) -> (f64, f64) {
    if n <= 3 {
        return (-1.0, 1.0);
    }
    let clamped = rho.clamp(-0.999_999, 0.999_999);
    let z = clamped.atanh();
    let margin = z_critical / ((n - 3) as f64).sqrt();
    ((z - margin).tanh(), (z + margin).tanh())
}
