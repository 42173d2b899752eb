//! Posterior-sampling candidate generation.

use crate::model::{Item, ItemId, PairKey};
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

/// Ranks items by one posterior draw each and proposes adjacent pairs.
///
/// The sampler keeps no state: every pass is a pure function of the items and
/// the state of the supplied random source.
#[derive(Debug, Default)]
pub struct ThompsonSampler;

impl ThompsonSampler {
    /// Draws `s_i ~ Normal(mu_i, sigma_i)` in input order and returns ids sorted by
    /// descending sample; equal samples fall back to ascending id.
    pub fn sample_ranking<R: Rng + ?Sized>(items: &[Item], rng: &mut R) -> Vec<ItemId> {
        let mut draws: Vec<(f64, ItemId)> = items
            .iter()
            .map(|item| {
                let z: f64 = StandardNormal.sample(rng);
                (item.belief.mu + item.belief.sigma * z, item.id)
            })
            .collect();
        draws.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        draws.into_iter().map(|(_, id)| id).collect()
    }

    /// Yields the `n - 1` pairs of adjacent ranks from one sampling pass.
    pub fn candidates<R: Rng + ?Sized>(items: &[Item], rng: &mut R) -> Vec<PairKey> {
        Self::sample_ranking(items, rng)
            .windows(2)
            .map(|pair| PairKey::ordered(pair[0], pair[1]))
            .collect()
    }
}
