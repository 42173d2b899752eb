use crate::model::item::ItemId;
use thiserror::Error;

/// Errors surfaced by the rating and selection engines.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PickerError {
    #[error("at least 2 items are required to select a pair, found {found}")]
    InsufficientItems { found: usize },
    #[error("item {item} has an invalid belief (mu={mu}, sigma={sigma})")]
    InvalidBelief { item: ItemId, mu: f64, sigma: f64 },
    #[error("{field}: {message}")]
    Configuration { field: String, message: String },
    #[error("item {item} is not part of this collection")]
    UnknownItem { item: ItemId },
    #[error("item {item} cannot be compared against itself")]
    SelfComparison { item: ItemId },
    #[error("item {item} appears more than once")]
    DuplicateItem { item: ItemId },
}

impl PickerError {
    pub(crate) fn config(field: &str, message: impl Into<String>) -> Self {
        PickerError::Configuration {
            field: field.to_string(),
            message: message.into(),
        }
    }
}
