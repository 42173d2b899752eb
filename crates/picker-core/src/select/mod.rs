//! Pair selection: expected-information scoring, posterior sampling and the
//! policy that combines them with repeat penalties and cooldowns.

mod policy;
mod scorer;
mod selector;
mod thompson;

pub use policy::{
    DEFAULT_COOLDOWN, DEFAULT_REPEAT_PENALTY, DEFAULT_TS_PROB, ExhaustiveLimit, SelectionMode,
    SelectionPolicy,
};
pub use scorer::{InformationBreakdown, InformationScorer};
pub use selector::{CandidateSource, Selection, Selector};
pub use thompson::ThompsonSampler;
