#![deny(warnings)]
//! Bayesian pairwise appeal ranking: Gaussian beliefs per item, a TrueSkill-style
//! update for each comparison, and a selector that picks the next most
//! informative pair to show.

pub mod collection;
pub mod error;
pub mod model;
pub mod rating;
pub mod registry;
pub mod select;

pub use collection::{AppliedComparison, Collection};
pub use error::PickerError;
pub use model::{Belief, ComparisonLog, ComparisonRecord, Item, ItemId, Outcome, PairKey, Verdict};
pub use rating::{BeliefUpdater, DrawModel, OutcomeModel, OutcomeProbabilities, RatingEnv};
pub use registry::{CollectionHandle, CollectionRegistry};
pub use select::{
    CandidateSource, ExhaustiveLimit, InformationScorer, Selection, SelectionMode,
    SelectionPolicy, Selector, ThompsonSampler,
};

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "picker"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}
