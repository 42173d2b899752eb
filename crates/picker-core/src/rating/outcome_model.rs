use super::env::{DrawModel, RatingEnv};
use super::gaussian::cdf;
use crate::model::{Belief, Verdict};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutcomeProbabilities {
    pub left: f64,
    pub right: f64,
    pub draw: f64,
}

impl OutcomeProbabilities {
    pub fn of(&self, verdict: Verdict) -> f64 {
        match verdict {
            Verdict::LeftWins => self.left,
            Verdict::RightWins => self.right,
            Verdict::Draw => self.draw,
        }
    }

    pub fn total(&self) -> f64 {
        self.left + self.right + self.draw
    }
}

/// Predicts how a comparison between two beliefs is likely to go.
#[derive(Debug, Clone, Copy)]
pub struct OutcomeModel {
    env: RatingEnv,
}

impl OutcomeModel {
    pub const fn new(env: RatingEnv) -> Self {
        Self { env }
    }

    pub fn predict(&self, left: Belief, right: Belief) -> OutcomeProbabilities {
        let left = left.clamped(self.env.sigma_floor);
        let right = right.clamped(self.env.sigma_floor);
        let c2 = self.env.difference_variance(left, right);
        let c = c2.sqrt();
        let delta = left.mu - right.mu;

        let left_nondraw = cdf(delta / c);
        let draw = self.draw_probability(delta, c2).clamp(0.0, 1.0);

        OutcomeProbabilities {
            left: left_nondraw * (1.0 - draw),
            right: (1.0 - left_nondraw) * (1.0 - draw),
            draw,
        }
    }

    /// Closed-form draw chance for a mean gap `delta` and difference variance `c2`.
    pub fn draw_probability(&self, delta: f64, c2: f64) -> f64 {
        match self.env.draw_model {
            DrawModel::Margin => {
                let c = c2.sqrt();
                let margin = self.env.draw_margin();
                cdf((margin - delta) / c) - cdf((-margin - delta) / c)
            }
            DrawModel::MatchQuality => {
                let beta2 = self.env.beta * self.env.beta;
                (2.0 * beta2 / c2).sqrt() * (-(delta * delta) / (2.0 * c2)).exp()
            }
        }
    }
}
