//! Round controller, hint scheduler and live round management.

mod error;
pub mod hints;
mod manager;
mod round;
mod wrapper;

pub use error::RoundError;
pub use hints::{FACT_COUNT, Fact, FactKind, shuffle};
pub use manager::{RoundId, RoundManager};
pub use round::{
    GuessResult, HintOutcome, MAX_POINTS, MIN_POINTS, RevealFraction, RoundInProgress,
    RoundSettings, RoundSolved, normalize_guess, points_for_attempt,
};
pub use wrapper::{AnyRound, GuessOutcome, RoundPhase};
