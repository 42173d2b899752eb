pub mod belief;
pub mod comparison;
pub mod item;
pub mod outcome;
pub mod pair;

pub use belief::Belief;
pub use comparison::{ComparisonLog, ComparisonRecord};
pub use item::{Item, ItemId};
pub use outcome::{Outcome, ParseOutcomeError, Verdict};
pub use pair::PairKey;
