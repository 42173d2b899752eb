//! A ranked collection: item beliefs plus the comparison history that produced them.

use crate::error::PickerError;
use crate::model::{Belief, ComparisonLog, ComparisonRecord, Item, ItemId, Outcome, PairKey};
use crate::rating::{BeliefUpdater, RatingEnv};
use crate::select::{Selection, Selector};
use rand::Rng;
use std::collections::HashMap;
use tracing::{Level, event};

/// What a persistence collaborator needs to write back after one decision.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedComparison {
    pub record: ComparisonRecord,
    /// Belief of the item shown on the left, after the update.
    pub left: Belief,
    pub right: Belief,
}

#[derive(Debug, Clone)]
pub struct Collection {
    env: RatingEnv,
    updater: BeliefUpdater,
    items: Vec<Item>,
    index: HashMap<ItemId, usize>,
    log: ComparisonLog,
}

impl Collection {
    pub fn new(env: RatingEnv) -> Result<Self, PickerError> {
        env.validate()?;
        Ok(Self::empty(env))
    }

    pub(crate) fn empty(env: RatingEnv) -> Self {
        Self {
            env,
            updater: BeliefUpdater::new(env),
            items: Vec::new(),
            index: HashMap::new(),
            log: ComparisonLog::new(),
        }
    }

    /// Rebuilds a collection from stored items and history.
    ///
    /// Every belief is validated, ids must be unique, and every logged pair must
    /// reference known items.
    pub fn from_parts(
        env: RatingEnv,
        items: Vec<Item>,
        log: ComparisonLog,
    ) -> Result<Self, PickerError> {
        env.validate()?;
        let mut index = HashMap::with_capacity(items.len());
        for (position, item) in items.iter().enumerate() {
            item.belief.validate(item.id)?;
            if index.insert(item.id, position).is_some() {
                return Err(PickerError::DuplicateItem { item: item.id });
            }
        }
        for record in log.records() {
            for id in [record.key.low(), record.key.high()] {
                if !index.contains_key(&id) {
                    return Err(PickerError::UnknownItem { item: id });
                }
            }
        }
        Ok(Self {
            env,
            updater: BeliefUpdater::new(env),
            items,
            index,
            log,
        })
    }

    /// Registers `id` with the prior belief. Existing items are returned untouched.
    pub fn insert_item(&mut self, id: ItemId) -> &Item {
        let position = match self.index.get(&id) {
            Some(position) => *position,
            None => {
                self.items.push(Item::new(id, self.env.prior()));
                let position = self.items.len() - 1;
                self.index.insert(id, position);
                position
            }
        };
        &self.items[position]
    }

    pub fn env(&self) -> &RatingEnv {
        &self.env
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.index.get(&id).map(|position| &self.items[*position])
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn log(&self) -> &ComparisonLog {
        &self.log
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Proposes the next pair to show.
    ///
    /// The selector must score with this collection's rating parameters, or its
    /// predictions would disagree with the updates `apply` performs.
    pub fn next_pair<R: Rng + ?Sized>(
        &self,
        selector: &Selector,
        rng: &mut R,
    ) -> Result<Selection, PickerError> {
        if *selector.env() != self.env {
            return Err(PickerError::config(
                "selector.env",
                "selector rating parameters differ from the collection's",
            ));
        }
        selector.select(&self.items, &self.log, rng)
    }

    /// Records the evaluator's decision for a displayed pair and revises both beliefs.
    ///
    /// A skip is logged (it feeds cooldown and repeat counts) but leaves beliefs
    /// and counters as they were.
    pub fn apply(
        &mut self,
        shown_left: ItemId,
        shown_right: ItemId,
        outcome: Outcome,
    ) -> Result<AppliedComparison, PickerError> {
        let left_at = self.position(shown_left)?;
        let right_at = self.position(shown_right)?;
        let record = self.log.append(shown_left, shown_right, outcome)?.clone();

        let before = (self.items[left_at].belief, self.items[right_at].belief);
        let (left, right) = match outcome.verdict() {
            Some(verdict) => {
                let (left, right) = self.updater.update(before.0, before.1, verdict);
                self.items[left_at].settle(left, verdict, true);
                self.items[right_at].settle(right, verdict, false);
                (left, right)
            }
            None => before,
        };

        if tracing::enabled!(Level::TRACE) {
            event!(
                target: "picker_core::update",
                Level::TRACE,
                sequence = record.sequence,
                left = %shown_left,
                right = %shown_right,
                outcome = outcome.as_str(),
                left_mu = left.mu,
                left_sigma = left.sigma,
                right_mu = right.mu,
                right_sigma = right.sigma,
            );
        }

        Ok(AppliedComparison {
            record,
            left,
            right,
        })
    }

    /// Sum of every item's sigma; the quantity pair selection works to shrink.
    pub fn total_uncertainty(&self) -> f64 {
        self.items.iter().map(|item| item.belief.sigma).sum()
    }

    pub fn times_shown(&self, pair: PairKey) -> usize {
        self.log
            .records()
            .iter()
            .filter(|record| record.key == pair)
            .count()
    }

    fn position(&self, id: ItemId) -> Result<usize, PickerError> {
        self.index
            .get(&id)
            .copied()
            .ok_or(PickerError::UnknownItem { item: id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::select::{SelectionMode, SelectionPolicy};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn seeded(count: u64) -> Collection {
        let mut collection = Collection::new(RatingEnv::default()).unwrap();
        for id in 0..count {
            collection.insert_item(ItemId(id));
        }
        collection
    }

    #[test]
    fn insert_item_uses_prior_and_is_idempotent() {
        let mut collection = seeded(2);
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.item(ItemId(0)).unwrap().belief, RatingEnv::default().prior());

        collection.apply(ItemId(0), ItemId(1), Outcome::LeftWins).unwrap();
        let revised = collection.item(ItemId(0)).unwrap().belief;
        let again = collection.insert_item(ItemId(0));
        assert_eq!(again.belief, revised);
        assert_eq!(collection.len(), 2);
    }

    #[test]
    fn apply_revises_both_sides_and_logs() {
        let mut collection = seeded(3);
        let applied = collection
            .apply(ItemId(2), ItemId(0), Outcome::RightWins)
            .unwrap();
        assert_eq!(applied.record.sequence, 0);
        assert_eq!(applied.record.shown_left, ItemId(2));
        assert!(applied.right.mu > 25.0);
        assert!(applied.left.mu < 25.0);

        let winner = collection.item(ItemId(0)).unwrap();
        assert_eq!((winner.games, winner.wins), (1, 1));
        let loser = collection.item(ItemId(2)).unwrap();
        assert_eq!((loser.games, loser.losses), (1, 1));
        assert_eq!(collection.item(ItemId(1)).unwrap().games, 0);
        assert_eq!(collection.log().len(), 1);
    }

    #[test]
    fn skip_is_logged_without_touching_beliefs() {
        let mut collection = seeded(2);
        let applied = collection.apply(ItemId(0), ItemId(1), Outcome::Skip).unwrap();
        assert_eq!(applied.left, RatingEnv::default().prior());
        assert_eq!(applied.right, RatingEnv::default().prior());
        assert_eq!(collection.item(ItemId(0)).unwrap().games, 0);
        assert_eq!(collection.log().count_outcome(Outcome::Skip), 1);
        assert_eq!(
            collection.times_shown(PairKey::new(ItemId(1), ItemId(0)).unwrap()),
            1
        );
    }

    #[test]
    fn rejects_unknown_and_self_pairs_without_side_effects() {
        let mut collection = seeded(2);
        assert_eq!(
            collection.apply(ItemId(0), ItemId(9), Outcome::Draw),
            Err(PickerError::UnknownItem { item: ItemId(9) })
        );
        assert_eq!(
            collection.apply(ItemId(1), ItemId(1), Outcome::LeftWins),
            Err(PickerError::SelfComparison { item: ItemId(1) })
        );
        assert!(collection.log().is_empty());
        assert_eq!(collection.item(ItemId(1)).unwrap().games, 0);
    }

    #[test]
    fn from_parts_validates_rows() {
        let env = RatingEnv::default();
        let good = vec![
            Item::new(ItemId(1), Belief::new(27.0, 6.0)),
            Item::new(ItemId(2), Belief::new(22.0, 6.0)),
        ];
        let mut log = ComparisonLog::new();
        log.append(ItemId(1), ItemId(2), Outcome::LeftWins).unwrap();
        let rebuilt = Collection::from_parts(env, good.clone(), log.clone()).unwrap();
        assert_eq!(rebuilt.log().len(), 1);
        assert_eq!(rebuilt.item(ItemId(2)).unwrap().belief.mu, 22.0);

        let mut bad_belief = good.clone();
        bad_belief[0].belief.sigma = -1.0;
        assert!(matches!(
            Collection::from_parts(env, bad_belief, ComparisonLog::new()),
            Err(PickerError::InvalidBelief { .. })
        ));

        let duplicated = vec![good[0].clone(), good[0].clone()];
        assert_eq!(
            Collection::from_parts(env, duplicated, ComparisonLog::new()).unwrap_err(),
            PickerError::DuplicateItem { item: ItemId(1) }
        );

        assert_eq!(
            Collection::from_parts(env, good[..1].to_vec(), log).unwrap_err(),
            PickerError::UnknownItem { item: ItemId(2) }
        );
    }

    #[test]
    fn selection_loop_shrinks_total_uncertainty() {
        let mut collection = seeded(6);
        let selector =
            Selector::new(SelectionPolicy::with_mode(SelectionMode::Hybrid), *collection.env())
                .unwrap();
        let mut rng = SmallRng::seed_from_u64(17);
        let start = collection.total_uncertainty();
        for step in 0..30u64 {
            let selection = collection.next_pair(&selector, &mut rng).unwrap();
            let outcome = if step % 5 == 0 {
                Outcome::Skip
            } else if step % 2 == 0 {
                Outcome::LeftWins
            } else {
                Outcome::RightWins
            };
            collection
                .apply(selection.pair.low(), selection.pair.high(), outcome)
                .unwrap();
        }
        assert_eq!(collection.log().len(), 30);
        assert!(collection.total_uncertainty() < start);
    }

    #[test]
    fn next_pair_requires_matching_rating_parameters() {
        let collection = seeded(3);
        let other = RatingEnv::default().with_draw_model(crate::rating::DrawModel::Margin);
        let selector = Selector::new(SelectionPolicy::default(), other).unwrap();
        let mut rng = SmallRng::seed_from_u64(2);
        assert!(matches!(
            collection.next_pair(&selector, &mut rng),
            Err(PickerError::Configuration { ref field, .. }) if field == "selector.env"
        ));

        let matching = Selector::new(SelectionPolicy::default(), *collection.env()).unwrap();
        assert!(collection.next_pair(&matching, &mut rng).is_ok());
    }
}
