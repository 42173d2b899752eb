use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// Result of presenting one pair to the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    LeftWins,
    RightWins,
    Draw,
    Skip,
}

impl Outcome {
    pub const ALL: [Outcome; 4] = [
        Outcome::LeftWins,
        Outcome::RightWins,
        Outcome::Draw,
        Outcome::Skip,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Outcome::LeftWins => "L",
            Outcome::RightWins => "R",
            Outcome::Draw => "D",
            Outcome::Skip => "S",
        }
    }

    /// The belief-changing part of the outcome; `None` for a skip.
    pub const fn verdict(self) -> Option<Verdict> {
        match self {
            Outcome::LeftWins => Some(Verdict::LeftWins),
            Outcome::RightWins => Some(Verdict::RightWins),
            Outcome::Draw => Some(Verdict::Draw),
            Outcome::Skip => None,
        }
    }

    /// Skips and draws put a pair on cooldown.
    pub const fn cools_down(self) -> bool {
        matches!(self, Outcome::Draw | Outcome::Skip)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutcomeError(String);

impl fmt::Display for ParseOutcomeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown outcome '{}'", self.0)
    }
}

impl std::error::Error for ParseOutcomeError {}

impl FromStr for Outcome {
    type Err = ParseOutcomeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "l" | "left" | "left_wins" => Ok(Outcome::LeftWins),
            "r" | "right" | "right_wins" => Ok(Outcome::RightWins),
            "d" | "draw" => Ok(Outcome::Draw),
            "s" | "skip" => Ok(Outcome::Skip),
            _ => Err(ParseOutcomeError(s.to_string())),
        }
    }
}

/// A non-skip outcome, the only kind the belief updater accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    LeftWins,
    RightWins,
    Draw,
}

impl Verdict {
    pub const ALL: [Verdict; 3] = [Verdict::LeftWins, Verdict::RightWins, Verdict::Draw];
}

impl From<Verdict> for Outcome {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::LeftWins => Outcome::LeftWins,
            Verdict::RightWins => Outcome::RightWins,
            Verdict::Draw => Outcome::Draw,
        }
    }
}
