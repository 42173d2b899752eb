use super::policy::{ExhaustiveLimit, SelectionMode, SelectionPolicy};
use super::scorer::InformationScorer;
use super::thompson::ThompsonSampler;
use crate::error::PickerError;
use crate::model::{ComparisonLog, Item, ItemId, PairKey};
use crate::rating::RatingEnv;
use core::fmt;
use rand::Rng;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tracing::{Level, event};

/// Scores closer than this are treated as tied.
const SCORE_TIE_TOLERANCE: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateSource {
    Exhaustive,
    Thompson,
}

impl CandidateSource {
    pub const fn as_str(self) -> &'static str {
        match self {
            CandidateSource::Exhaustive => "exhaustive",
            CandidateSource::Thompson => "thompson",
        }
    }
}

impl fmt::Display for CandidateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The pair chosen for the next comparison and how it was chosen.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub pair: PairKey,
    pub score: f64,
    pub expected_reduction: f64,
    pub repeat_count: u32,
    pub source: CandidateSource,
    /// Number of pairs that were scored.
    pub candidates: usize,
    /// True when every candidate was on cooldown and the filter was dropped.
    pub cooldown_relaxed: bool,
}

#[derive(Debug, Clone, Copy)]
struct Scored {
    pair: PairKey,
    score: f64,
    expected_reduction: f64,
    repeat_count: u32,
    games: u32,
}

impl Scored {
    /// `Greater` means `self` should be picked over `other`.
    fn rank_against(&self, other: &Scored) -> Ordering {
        if (self.score - other.score).abs() > SCORE_TIE_TOLERANCE {
            return self.score.total_cmp(&other.score);
        }
        other
            .games
            .cmp(&self.games)
            .then_with(|| other.pair.cmp(&self.pair))
    }
}

/// Picks the next pair to show, balancing expected information against repeats.
#[derive(Debug, Clone)]
pub struct Selector {
    policy: SelectionPolicy,
    env: RatingEnv,
    scorer: InformationScorer,
}

impl Selector {
    /// Validates the configuration once; selections never re-check it.
    pub fn new(policy: SelectionPolicy, env: RatingEnv) -> Result<Self, PickerError> {
        policy.validate()?;
        env.validate()?;
        Ok(Self {
            policy,
            env,
            scorer: InformationScorer::new(env),
        })
    }

    pub fn policy(&self) -> &SelectionPolicy {
        &self.policy
    }

    /// Rating parameters the scorer predicts and simulates updates with.
    pub fn env(&self) -> &RatingEnv {
        &self.env
    }

    pub fn select<R: Rng + ?Sized>(
        &self,
        items: &[Item],
        log: &ComparisonLog,
        rng: &mut R,
    ) -> Result<Selection, PickerError> {
        if items.len() < 2 {
            return Err(PickerError::InsufficientItems { found: items.len() });
        }
        let by_id = index_items(items)?;

        let source = match self.policy.mode {
            SelectionMode::Edelta => CandidateSource::Exhaustive,
            SelectionMode::Thompson => CandidateSource::Thompson,
            SelectionMode::Hybrid => {
                if rng.gen_range(0.0..1.0) < self.policy.ts_prob {
                    CandidateSource::Thompson
                } else {
                    CandidateSource::Exhaustive
                }
            }
        };

        let candidates = match source {
            CandidateSource::Exhaustive => exhaustive_pairs(items, self.policy.exhaustive_limit),
            CandidateSource::Thompson => ThompsonSampler::candidates(items, rng),
        };

        let cooldown = log.cooldown_keys(self.policy.cooldown);
        let (candidates, cooldown_relaxed) = apply_cooldown(candidates, &cooldown);

        let repeats = log.repeat_counts();
        let mut best: Option<Scored> = None;
        for pair in &candidates {
            let low = by_id[&pair.low()];
            let high = by_id[&pair.high()];
            let expected_reduction = self.scorer.expected_reduction(low.belief, high.belief);
            let repeat_count = repeats.get(pair).copied().unwrap_or(0);
            let scored = Scored {
                pair: *pair,
                score: expected_reduction - self.policy.repeat_penalty * f64::from(repeat_count),
                expected_reduction,
                repeat_count,
                games: low.games + high.games,
            };
            best = match best {
                Some(current) if current.rank_against(&scored) != Ordering::Less => Some(current),
                _ => Some(scored),
            };
        }

        let Some(best) = best else {
            return Err(PickerError::InsufficientItems { found: items.len() });
        };

        let selection = Selection {
            pair: best.pair,
            score: best.score,
            expected_reduction: best.expected_reduction,
            repeat_count: best.repeat_count,
            source,
            candidates: candidates.len(),
            cooldown_relaxed,
        };
        log_selection(&self.policy, &selection);
        Ok(selection)
    }
}

fn index_items(items: &[Item]) -> Result<HashMap<ItemId, &Item>, PickerError> {
    let mut by_id = HashMap::with_capacity(items.len());
    for item in items {
        item.belief.validate(item.id)?;
        if by_id.insert(item.id, item).is_some() {
            return Err(PickerError::DuplicateItem { item: item.id });
        }
    }
    Ok(by_id)
}

fn exhaustive_pairs(items: &[Item], limit: Option<ExhaustiveLimit>) -> Vec<PairKey> {
    let Some(limit) = limit else {
        let mut pairs = Vec::with_capacity(items.len() * (items.len() - 1) / 2);
        for (idx, a) in items.iter().enumerate() {
            for b in &items[idx + 1..] {
                pairs.push(PairKey::ordered(a.id, b.id));
            }
        }
        return pairs;
    };

    let mut by_uncertainty: Vec<&Item> = items.iter().collect();
    by_uncertainty.sort_by(|a, b| {
        b.belief
            .sigma
            .total_cmp(&a.belief.sigma)
            .then_with(|| a.id.cmp(&b.id))
    });
    let left = limit.left.min(by_uncertainty.len());
    let right = limit.right.min(by_uncertainty.len());
    let mut pairs = Vec::new();
    for i in 0..left {
        for j in (i + 1)..right {
            pairs.push(PairKey::ordered(by_uncertainty[i].id, by_uncertainty[j].id));
        }
    }
    pairs
}

fn apply_cooldown(candidates: Vec<PairKey>, cooldown: &HashSet<PairKey>) -> (Vec<PairKey>, bool) {
    if cooldown.is_empty() {
        return (candidates, false);
    }
    let allowed: Vec<PairKey> = candidates
        .iter()
        .copied()
        .filter(|pair| !cooldown.contains(pair))
        .collect();
    if allowed.is_empty() {
        (candidates, true)
    } else {
        (allowed, false)
    }
}

fn log_selection(policy: &SelectionPolicy, selection: &Selection) {
    if selection.cooldown_relaxed {
        event!(
            target: "picker_core::select",
            Level::WARN,
            pair = %selection.pair,
            candidates = selection.candidates,
            "every candidate was on cooldown; filter relaxed"
        );
    }

    if !tracing::enabled!(Level::DEBUG) {
        return;
    }

    event!(
        target: "picker_core::select",
        Level::DEBUG,
        mode = policy.mode.as_str(),
        source = selection.source.as_str(),
        pair = %selection.pair,
        score = selection.score,
        expected_reduction = selection.expected_reduction,
        repeat_count = selection.repeat_count,
        candidates = selection.candidates,
    );
}
