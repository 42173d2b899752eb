use crate::model::{Belief, Verdict};
use crate::rating::{BeliefUpdater, OutcomeModel, OutcomeProbabilities, RatingEnv};

/// Expected-uncertainty-reduction estimate for one pair, with its parts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InformationBreakdown {
    pub probabilities: OutcomeProbabilities,
    /// Reduction of `sigma_left + sigma_right` under each verdict, in `Verdict::ALL` order.
    pub reductions: [f64; 3],
    pub expected_reduction: f64,
}

/// Scores pairs by the combined sigma a comparison is expected to remove.
#[derive(Debug, Clone, Copy)]
pub struct InformationScorer {
    model: OutcomeModel,
    updater: BeliefUpdater,
    sigma_floor: f64,
}

impl InformationScorer {
    pub const fn new(env: RatingEnv) -> Self {
        Self {
            model: OutcomeModel::new(env),
            updater: BeliefUpdater::new(env),
            sigma_floor: env.sigma_floor,
        }
    }

    pub fn expected_reduction(&self, left: Belief, right: Belief) -> f64 {
        self.breakdown(left, right).expected_reduction
    }

    pub fn breakdown(&self, left: Belief, right: Belief) -> InformationBreakdown {
        let left = left.clamped(self.sigma_floor);
        let right = right.clamped(self.sigma_floor);
        let probabilities = self.model.predict(left, right);
        let before = left.sigma + right.sigma;

        let mut reductions = [0.0; 3];
        let mut expected = 0.0;
        for (slot, verdict) in reductions.iter_mut().zip(Verdict::ALL) {
            let (l, r) = self.updater.update(left, right, verdict);
            *slot = (before - (l.sigma + r.sigma)).max(0.0);
            expected += probabilities.of(verdict) * *slot;
        }

        InformationBreakdown {
            probabilities,
            reductions,
            expected_reduction: expected,
        }
    }
}
