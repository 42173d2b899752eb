//! Append-only comparison history and the selection state derived from it.

use super::item::ItemId;
use super::outcome::Outcome;
use super::pair::PairKey;
use crate::error::PickerError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonRecord {
    pub sequence: u64,
    pub key: PairKey,
    pub shown_left: ItemId,
    pub shown_right: ItemId,
    pub outcome: Outcome,
}

/// Ordered log of every pair shown to the evaluator, skips included.
///
/// Records are always held in sequence order, including after deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredLog")]
pub struct ComparisonLog {
    records: Vec<ComparisonRecord>,
}

#[derive(Deserialize)]
struct StoredLog {
    records: Vec<ComparisonRecord>,
}

impl From<StoredLog> for ComparisonLog {
    fn from(stored: StoredLog) -> Self {
        Self::from_records(stored.records)
    }
}

impl ComparisonLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a log from persisted records, ordering them by sequence.
    pub fn from_records(mut records: Vec<ComparisonRecord>) -> Self {
        records.sort_by_key(|record| record.sequence);
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ComparisonRecord] {
        &self.records
    }

    pub fn last(&self) -> Option<&ComparisonRecord> {
        self.records.last()
    }

    fn next_sequence(&self) -> u64 {
        self.records.last().map_or(0, |record| record.sequence + 1)
    }

    /// Appends a record for the pair as it was displayed.
    pub fn append(
        &mut self,
        shown_left: ItemId,
        shown_right: ItemId,
        outcome: Outcome,
    ) -> Result<&ComparisonRecord, PickerError> {
        let key = PairKey::new(shown_left, shown_right)?;
        let sequence = self.next_sequence();
        self.records.push(ComparisonRecord {
            sequence,
            key,
            shown_left,
            shown_right,
            outcome,
        });
        Ok(&self.records[self.records.len() - 1])
    }

    /// Keys of skipped or drawn pairs among the last `window` records.
    pub fn cooldown_keys(&self, window: usize) -> HashSet<PairKey> {
        self.records
            .iter()
            .rev()
            .take(window)
            .filter(|record| record.outcome.cools_down())
            .map(|record| record.key)
            .collect()
    }

    /// How many times each pair has been shown, regardless of outcome.
    pub fn repeat_counts(&self) -> HashMap<PairKey, u32> {
        let mut counts = HashMap::new();
        for record in &self.records {
            *counts.entry(record.key).or_insert(0) += 1;
        }
        counts
    }

    pub fn distinct_pairs(&self) -> usize {
        self.records
            .iter()
            .map(|record| record.key)
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn count_outcome(&self, outcome: Outcome) -> usize {
        self.records
            .iter()
            .filter(|record| record.outcome == outcome)
            .count()
    }
}
