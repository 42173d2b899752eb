use super::gaussian;
use crate::error::PickerError;
use crate::model::Belief;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MU: f64 = 25.0;
pub const DEFAULT_SIGMA: f64 = DEFAULT_MU / 3.0;
pub const DEFAULT_BETA: f64 = DEFAULT_SIGMA / 2.0;
pub const DEFAULT_DRAW_PROBABILITY: f64 = 0.10;
pub const DEFAULT_SIGMA_FLOOR: f64 = 1e-6;

/// How the outcome model estimates the chance of a draw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawModel {
    /// Two-player match quality `sqrt(2β²/c²)·exp(−δ²/2c²)`, independent of the draw margin.
    #[default]
    MatchQuality,
    /// Probability that the performance gap lands inside the draw margin.
    Margin,
}

/// Immutable rating configuration shared by the outcome model and the updater.
///
/// Each collection carries its own value, so several collections with different
/// parameters can be active at once.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingEnv {
    pub mu: f64,
    pub sigma: f64,
    /// Performance noise around an item's appeal.
    pub beta: f64,
    pub draw_probability: f64,
    pub draw_model: DrawModel,
    pub sigma_floor: f64,
}

impl Default for RatingEnv {
    fn default() -> Self {
        Self {
            mu: DEFAULT_MU,
            sigma: DEFAULT_SIGMA,
            beta: DEFAULT_BETA,
            draw_probability: DEFAULT_DRAW_PROBABILITY,
            draw_model: DrawModel::MatchQuality,
            sigma_floor: DEFAULT_SIGMA_FLOOR,
        }
    }
}

impl RatingEnv {
    /// Builds a validated environment with the default prior.
    pub fn new(beta: f64, draw_probability: f64) -> Result<Self, PickerError> {
        let env = Self {
            beta,
            draw_probability,
            ..Self::default()
        };
        env.validate()?;
        Ok(env)
    }

    pub fn with_draw_model(self, draw_model: DrawModel) -> Self {
        Self { draw_model, ..self }
    }

    pub fn validate(&self) -> Result<(), PickerError> {
        if !self.mu.is_finite() {
            return Err(PickerError::config("rating.mu", "prior mean must be finite"));
        }
        if !(self.sigma.is_finite() && self.sigma > 0.0) {
            return Err(PickerError::config(
                "rating.sigma",
                "prior sigma must be finite and greater than zero",
            ));
        }
        if !(self.beta.is_finite() && self.beta > 0.0) {
            return Err(PickerError::config(
                "rating.beta",
                "beta must be finite and greater than zero",
            ));
        }
        if !(0.0..1.0).contains(&self.draw_probability) {
            return Err(PickerError::config(
                "rating.draw_probability",
                "draw probability must lie in [0, 1)",
            ));
        }
        if !(self.sigma_floor.is_finite() && self.sigma_floor > 0.0) {
            return Err(PickerError::config(
                "rating.sigma_floor",
                "sigma floor must be finite and greater than zero",
            ));
        }
        Ok(())
    }

    /// Belief assigned to an item the first time it is seen.
    pub fn prior(&self) -> Belief {
        Belief::new(self.mu, self.sigma)
    }

    /// Draw margin on the performance scale.
    pub fn draw_margin(&self) -> f64 {
        gaussian::draw_margin(self.draw_probability, self.beta)
    }

    /// Total variance of the performance difference between `a` and `b`.
    pub(crate) fn difference_variance(&self, a: Belief, b: Belief) -> f64 {
        2.0 * self.beta * self.beta + a.variance() + b.variance()
    }
}
