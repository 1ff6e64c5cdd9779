//! Round errors.

use crate::game::RoundId;

/// Error raised by the round controller or the round manager.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum RoundError {
    /// The pool of creatures to draw from was empty.
    #[display("No creatures available to start a round")]
    EmptyPool,

    /// The round was already solved; guesses are rejected.
    #[display("Round is already solved")]
    AlreadySolved,

    /// No live round has this id.
    #[display("Round {} not found", _0)]
    NotFound(RoundId),
}

impl std::error::Error for RoundError {}
