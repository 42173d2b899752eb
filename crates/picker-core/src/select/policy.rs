use crate::error::PickerError;
use core::fmt;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TS_PROB: f64 = 0.25;
pub const DEFAULT_REPEAT_PENALTY: f64 = 0.5;
pub const DEFAULT_COOLDOWN: usize = 2;

/// Where the selector draws its candidate pairs from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// Exhaustive scoring, with a Thompson pass taken with probability `ts_prob`.
    #[default]
    Hybrid,
    /// Always score every pair.
    Edelta,
    /// Always score the adjacent pairs of one posterior sample.
    Thompson,
}

impl SelectionMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            SelectionMode::Hybrid => "hybrid",
            SelectionMode::Edelta => "edelta",
            SelectionMode::Thompson => "thompson",
        }
    }
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bounds exhaustive scoring to the most uncertain items.
///
/// Items are ordered by descending sigma; only pairs `(i, j)` with `i < left`
/// and `i < j < right` are scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExhaustiveLimit {
    pub left: usize,
    pub right: usize,
}

/// Caller-facing selection configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionPolicy {
    pub mode: SelectionMode,
    pub ts_prob: f64,
    pub repeat_penalty: f64,
    /// Number of most recent comparisons whose skipped or drawn pairs are held back.
    pub cooldown: usize,
    pub exhaustive_limit: Option<ExhaustiveLimit>,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            mode: SelectionMode::Hybrid,
            ts_prob: DEFAULT_TS_PROB,
            repeat_penalty: DEFAULT_REPEAT_PENALTY,
            cooldown: DEFAULT_COOLDOWN,
            exhaustive_limit: None,
        }
    }
}

impl SelectionPolicy {
    pub fn with_mode(mode: SelectionMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), PickerError> {
        if !(0.0..=1.0).contains(&self.ts_prob) {
            return Err(PickerError::config(
                "policy.ts_prob",
                "Thompson probability must lie in [0, 1]",
            ));
        }
        if !(self.repeat_penalty.is_finite() && self.repeat_penalty >= 0.0) {
            return Err(PickerError::config(
                "policy.repeat_penalty",
                "repeat penalty must be finite and non-negative",
            ));
        }
        if let Some(limit) = self.exhaustive_limit {
            if limit.left == 0 || limit.right < 2 {
                return Err(PickerError::config(
                    "policy.exhaustive_limit",
                    "window must admit at least one pair",
                ));
            }
        }
        Ok(())
    }
}
