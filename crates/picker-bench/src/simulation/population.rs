use picker_core::ItemId;
use rand::{SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, Normal};

use super::RunnerError;
use crate::config::PopulationConfig;

/// Synthetic items whose hidden appeal the arms try to recover.
#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    appeal: Vec<f64>,
}

impl Population {
    pub fn generate(config: &PopulationConfig, seed: u64) -> Result<Self, RunnerError> {
        let normal = Normal::new(config.mean, config.spread).map_err(|err| {
            RunnerError::Simulation {
                message: format!("population distribution: {err}"),
            }
        })?;
        let mut rng = StdRng::seed_from_u64(seed);
        let appeal = (0..config.items).map(|_| normal.sample(&mut rng)).collect();
        Ok(Self { appeal })
    }

    pub fn from_appeal(appeal: Vec<f64>) -> Self {
        Self { appeal }
    }

    pub fn len(&self) -> usize {
        self.appeal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.appeal.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        (0..self.appeal.len() as u64).map(ItemId)
    }

    pub fn appeal(&self, id: ItemId) -> Option<f64> {
        usize::try_from(id.0)
            .ok()
            .and_then(|idx| self.appeal.get(idx).copied())
    }
}
