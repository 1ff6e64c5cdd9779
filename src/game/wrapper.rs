//! Phase-erased round wrapper.

use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use super::error::RoundError;
use super::hints::Fact;
use super::round::{GuessResult, HintOutcome, RevealFraction, RoundInProgress, RoundSolved};
use crate::catalog::Creature;
use crate::stats::RoundOutcome;

/// Phase of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundPhase {
    /// Accepting guesses.
    InProgress,
    /// Creature named.
    Solved,
}

/// Report of one guess, for callers outside the round controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GuessOutcome {
    /// The guess named the creature.
    Correct {
        /// Points awarded.
        points: i32,
        /// Attempts taken, including this one.
        attempts: i32,
        /// The creature's name.
        answer: String,
    },
    /// The guess was wrong.
    Incorrect {
        /// Attempts taken so far.
        attempts: i32,
        /// Visible fraction after the automatic reveal.
        reveal: RevealFraction,
        /// Visible facts.
        facts: Vec<Fact>,
    },
}

/// A round in either phase.
///
/// Typestate phases can't be stored side by side, so live rounds are kept in
/// this enum and unwrapped for each transition.
#[derive(Debug, Clone)]
pub enum AnyRound {
    /// Round in progress.
    InProgress(RoundInProgress),
    /// Round solved.
    Solved(RoundSolved),
}

impl From<RoundInProgress> for AnyRound {
    fn from(round: RoundInProgress) -> Self {
        AnyRound::InProgress(round)
    }
}

impl From<RoundSolved> for AnyRound {
    fn from(round: RoundSolved) -> Self {
        AnyRound::Solved(round)
    }
}

impl AnyRound {
    /// Submits a guess, returning the next state and the report.
    ///
    /// A guess on a solved round is rejected and leaves it untouched.
    #[instrument(skip(self))]
    pub fn submit_guess(self, text: &str) -> (Self, Result<GuessOutcome, RoundError>) {
        match self {
            AnyRound::InProgress(round) => match round.guess(text) {
                GuessResult::Correct(solved) => {
                    let outcome = GuessOutcome::Correct {
                        points: *solved.points(),
                        attempts: *solved.attempts(),
                        answer: solved.answer().to_string(),
                    };
                    (solved.into(), Ok(outcome))
                }
                GuessResult::Incorrect(round) => {
                    let outcome = GuessOutcome::Incorrect {
                        attempts: *round.attempts(),
                        reveal: round.reveal_fraction(),
                        facts: round.revealed_facts(),
                    };
                    (round.into(), Ok(outcome))
                }
            },
            AnyRound::Solved(solved) => {
                warn!("Guess submitted to a solved round");
                (solved.into(), Err(RoundError::AlreadySolved))
            }
        }
    }

    /// Requests a hint. A no-op on a solved round.
    #[instrument(skip(self))]
    pub fn request_hint(&mut self) -> HintOutcome {
        match self {
            AnyRound::InProgress(round) => round.request_hint(),
            AnyRound::Solved(_) => HintOutcome::AlreadySolved,
        }
    }

    /// Ends the round, producing the outcome to fold into stats.
    pub fn into_outcome(self) -> RoundOutcome {
        match self {
            AnyRound::InProgress(round) => round.abandon(),
            AnyRound::Solved(solved) => solved.outcome(),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> RoundPhase {
        match self {
            AnyRound::InProgress(_) => RoundPhase::InProgress,
            AnyRound::Solved(_) => RoundPhase::Solved,
        }
    }

    /// Target creature.
    pub fn creature(&self) -> &Creature {
        match self {
            AnyRound::InProgress(round) => round.creature(),
            AnyRound::Solved(solved) => solved.creature(),
        }
    }

    /// Attempts taken so far.
    pub fn attempts(&self) -> i32 {
        match self {
            AnyRound::InProgress(round) => *round.attempts(),
            AnyRound::Solved(solved) => *solved.attempts(),
        }
    }

    /// Points awarded, once solved.
    pub fn points(&self) -> Option<i32> {
        match self {
            AnyRound::InProgress(_) => None,
            AnyRound::Solved(solved) => Some(*solved.points()),
        }
    }

    /// The answer, once solved.
    pub fn revealed_answer(&self) -> Option<&str> {
        match self {
            AnyRound::InProgress(_) => None,
            AnyRound::Solved(solved) => Some(solved.answer()),
        }
    }

    /// Visible facts.
    pub fn revealed_facts(&self) -> Vec<Fact> {
        match self {
            AnyRound::InProgress(round) => round.revealed_facts(),
            AnyRound::Solved(solved) => solved.revealed_facts(),
        }
    }

    /// Visible fraction of facts.
    pub fn reveal_fraction(&self) -> RevealFraction {
        match self {
            AnyRound::InProgress(round) => round.reveal_fraction(),
            AnyRound::Solved(solved) => solved.reveal_fraction(),
        }
    }
}
