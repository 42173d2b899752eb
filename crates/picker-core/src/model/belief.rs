use super::item::ItemId;
use crate::error::PickerError;
use serde::{Deserialize, Serialize};

/// Independent Gaussian estimate of one item's appeal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Belief {
    pub mu: f64,
    pub sigma: f64,
}

impl Belief {
    pub const fn new(mu: f64, sigma: f64) -> Self {
        Self { mu, sigma }
    }

    /// Rejects beliefs that a correct update could never have produced.
    pub fn validate(&self, item: ItemId) -> Result<(), PickerError> {
        if !self.mu.is_finite() || !self.sigma.is_finite() || self.sigma <= 0.0 {
            return Err(PickerError::InvalidBelief {
                item,
                mu: self.mu,
                sigma: self.sigma,
            });
        }
        Ok(())
    }

    /// Returns a copy whose sigma is raised to at least `floor`.
    pub fn clamped(self, floor: f64) -> Self {
        Self {
            mu: self.mu,
            sigma: self.sigma.max(floor),
        }
    }

    pub fn variance(&self) -> f64 {
        self.sigma * self.sigma
    }

    /// Pessimistic display score `mu - k * sigma`.
    pub fn conservative(&self, k: f64) -> f64 {
        self.mu - k * self.sigma
    }
}
