use super::belief::Belief;
use super::outcome::Verdict;
use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An item being ranked, with its current belief and comparison counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub belief: Belief,
    /// Number of non-skip comparisons this item took part in.
    pub games: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
}

impl Item {
    pub fn new(id: ItemId, belief: Belief) -> Self {
        Self {
            id,
            belief,
            games: 0,
            wins: 0,
            losses: 0,
            draws: 0,
        }
    }

    /// Stores a revised belief and bumps the counters for `verdict` seen from this item's side.
    pub(crate) fn settle(&mut self, belief: Belief, verdict: Verdict, on_left: bool) {
        self.belief = belief;
        self.games += 1;
        match (verdict, on_left) {
            (Verdict::Draw, _) => self.draws += 1,
            (Verdict::LeftWins, true) | (Verdict::RightWins, false) => self.wins += 1,
            (Verdict::LeftWins, false) | (Verdict::RightWins, true) => self.losses += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settle_tracks_side_specific_counters() {
        let mut left = Item::new(ItemId(1), Belief::new(25.0, 8.0));
        let mut right = Item::new(ItemId(2), Belief::new(25.0, 8.0));

        left.settle(Belief::new(27.0, 7.0), Verdict::LeftWins, true);
        right.settle(Belief::new(23.0, 7.0), Verdict::LeftWins, false);
        left.settle(Belief::new(27.0, 6.5), Verdict::Draw, true);

        assert_eq!((left.games, left.wins, left.losses, left.draws), (2, 1, 0, 1));
        assert_eq!((right.games, right.wins, right.losses), (1, 0, 1));
        assert_eq!(left.belief, Belief::new(27.0, 6.5));
    }

    #[test]
    fn id_displays_with_hash_prefix() {
        assert_eq!(ItemId(42).to_string(), "#42");
    }
}
