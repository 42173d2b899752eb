//! Gaussian appeal model for two-item comparisons.
//!
//! - `env`: the immutable rating configuration threaded through every call.
//! - `gaussian`: normal distribution helpers and truncated-Gaussian corrections.
//! - `outcome_model`: win/draw/loss probabilities for a pair of beliefs.
//! - `updater`: the single-step moment-matching belief update.

mod env;
pub mod gaussian;
mod outcome_model;
mod updater;

pub use env::{
    DEFAULT_BETA, DEFAULT_DRAW_PROBABILITY, DEFAULT_MU, DEFAULT_SIGMA, DEFAULT_SIGMA_FLOOR,
    DrawModel, RatingEnv,
};
pub use outcome_model::{OutcomeModel, OutcomeProbabilities};
pub use updater::BeliefUpdater;
