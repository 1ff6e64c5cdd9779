//! Phase-specific round types.
//!
//! A round is either in progress or solved, and each phase is its own type:
//! only [`RoundInProgress`] accepts guesses, and only [`RoundSolved`] carries
//! the points awarded. Transitions consume the round, so a guess is applied
//! completely or not at all.

use derive_getters::Getters;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::catalog::{Creature, Locale};
use crate::game::RoundError;
use crate::game::hints::{FACT_COUNT, Fact, FactKind, render_facts, reveal_order};
use crate::stats::RoundOutcome;

/// Points awarded for a correct first guess.
pub const MAX_POINTS: i32 = 10;

/// Points awarded for a correct guess no matter how late.
pub const MIN_POINTS: i32 = 1;

/// Points for a correct answer on the given (1-based) attempt.
///
/// The first attempt earns [`MAX_POINTS`], each later attempt one less, and
/// the tenth attempt onward earns [`MIN_POINTS`].
pub fn points_for_attempt(attempt: i32) -> i32 {
    (MAX_POINTS - (attempt - 1)).max(MIN_POINTS)
}

/// Normalizes a name for comparison: trims whitespace and case-folds.
pub fn normalize_guess(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Per-round configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct RoundSettings {
    initial_hints: usize,
    locale: Locale,
}

impl RoundSettings {
    /// Creates settings; `initial_hints` is clamped to [`FACT_COUNT`].
    #[instrument]
    pub fn new(initial_hints: usize, locale: Locale) -> Self {
        Self {
            initial_hints: initial_hints.min(FACT_COUNT),
            locale,
        }
    }
}

impl Default for RoundSettings {
    fn default() -> Self {
        Self::new(1, Locale::default())
    }
}

/// How much of the hint set is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Getters, derive_more::Display)]
#[display("{}/{}", revealed, total)]
pub struct RevealFraction {
    revealed: usize,
    total: usize,
}

impl RevealFraction {
    /// Creates a fraction of `revealed` out of [`FACT_COUNT`].
    pub fn of(revealed: usize) -> Self {
        Self {
            revealed,
            total: FACT_COUNT,
        }
    }
}

/// Result of a manual hint request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HintOutcome {
    /// One more fact was revealed; carries every fact now visible.
    Revealed {
        /// Visible facts in reveal order.
        facts: Vec<Fact>,
    },
    /// Every fact is already visible. Informational, not an error.
    NoMoreHints,
    /// The round is solved; nothing changed.
    AlreadySolved,
}

// ─────────────────────────────────────────────────────────────
//  InProgress Phase
// ─────────────────────────────────────────────────────────────

/// A round that still accepts guesses and hint requests.
#[derive(Debug, Clone, Getters)]
pub struct RoundInProgress {
    creature: Creature,
    locale: Locale,
    attempts: i32,
    hints_revealed: usize,
    order: Vec<FactKind>,
}

impl RoundInProgress {
    /// Starts a round on a creature drawn uniformly from `pool`.
    ///
    /// # Errors
    ///
    /// Returns [`RoundError::EmptyPool`] if `pool` is empty.
    #[instrument(skip(pool, rng), fields(pool_size = pool.len()))]
    pub fn start<R: Rng + ?Sized>(
        pool: &[Creature],
        settings: &RoundSettings,
        rng: &mut R,
    ) -> Result<Self, RoundError> {
        let creature = pool.choose(rng).ok_or_else(|| {
            warn!("Cannot start a round from an empty pool");
            RoundError::EmptyPool
        })?;

        let round = Self {
            creature: creature.clone(),
            locale: *settings.locale(),
            attempts: 0,
            hints_revealed: *settings.initial_hints(),
            order: reveal_order(rng),
        };

        info!(
            creature_id = round.creature.id(),
            hints_revealed = round.hints_revealed,
            "Round started"
        );
        Ok(round)
    }

    /// The name a guess must match, in the round's locale.
    pub fn answer(&self) -> &str {
        self.creature.name().get(self.locale)
    }

    /// Submits a guess, consuming the round.
    ///
    /// The attempt counter always increases. A wrong guess also reveals one
    /// more fact while any remain.
    #[instrument(skip(self), fields(creature_id = self.creature.id(), attempts = self.attempts))]
    pub fn guess(mut self, text: &str) -> GuessResult {
        self.attempts += 1;

        if normalize_guess(text) == normalize_guess(self.answer()) {
            let points = points_for_attempt(self.attempts);
            info!(attempts = self.attempts, points, "Correct guess");
            return GuessResult::Correct(RoundSolved {
                creature: self.creature,
                locale: self.locale,
                attempts: self.attempts,
                hints_revealed: self.hints_revealed,
                order: self.order,
                points,
            });
        }

        if self.hints_revealed < FACT_COUNT {
            self.hints_revealed += 1;
        }
        debug!(
            attempts = self.attempts,
            hints_revealed = self.hints_revealed,
            "Incorrect guess"
        );
        GuessResult::Incorrect(self)
    }

    /// Reveals one more fact, if any remain.
    #[instrument(skip(self), fields(hints_revealed = self.hints_revealed))]
    pub fn request_hint(&mut self) -> HintOutcome {
        if self.hints_revealed >= FACT_COUNT {
            debug!("All hints already revealed");
            return HintOutcome::NoMoreHints;
        }
        self.hints_revealed += 1;
        HintOutcome::Revealed {
            facts: self.revealed_facts(),
        }
    }

    /// Facts visible so far, in this round's reveal order.
    pub fn revealed_facts(&self) -> Vec<Fact> {
        render_facts(&self.creature, self.locale, &self.order, self.hints_revealed)
    }

    /// Fraction of facts visible.
    pub fn reveal_fraction(&self) -> RevealFraction {
        RevealFraction::of(self.hints_revealed)
    }

    /// Leaves the round unsolved.
    #[instrument(skip(self), fields(creature_id = self.creature.id()))]
    pub fn abandon(self) -> RoundOutcome {
        info!(attempts = self.attempts, "Round abandoned");
        RoundOutcome::new(false, self.attempts, 0)
    }
}

// ─────────────────────────────────────────────────────────────
//  Solved Phase
// ─────────────────────────────────────────────────────────────

/// A round whose creature was named. Terminal.
#[derive(Debug, Clone, Getters)]
pub struct RoundSolved {
    creature: Creature,
    locale: Locale,
    attempts: i32,
    hints_revealed: usize,
    order: Vec<FactKind>,
    points: i32,
}

impl RoundSolved {
    /// The name that solved the round.
    pub fn answer(&self) -> &str {
        self.creature.name().get(self.locale)
    }

    /// Facts that were visible when the round was solved.
    pub fn revealed_facts(&self) -> Vec<Fact> {
        render_facts(&self.creature, self.locale, &self.order, self.hints_revealed)
    }

    /// Fraction of facts that were visible.
    pub fn reveal_fraction(&self) -> RevealFraction {
        RevealFraction::of(self.hints_revealed)
    }

    /// The outcome to fold into the player's stats.
    pub fn outcome(&self) -> RoundOutcome {
        RoundOutcome::new(true, self.attempts, self.points)
    }
}

// ─────────────────────────────────────────────────────────────
//  Result Type
// ─────────────────────────────────────────────────────────────

/// Result of a guess.
#[derive(Debug, Clone)]
pub enum GuessResult {
    /// The guess named the creature.
    Correct(RoundSolved),
    /// The guess was wrong; the round continues.
    Incorrect(RoundInProgress),
}
