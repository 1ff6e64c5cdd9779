//! Cumulative per-user statistics and the round fold.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Result of one finished round, as seen by the stats aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
#[serde(rename_all = "camelCase")]
pub struct RoundOutcome {
    correct: bool,
    attempts: i32,
    points_gained: i32,
}

/// Cumulative game statistics for one account.
///
/// Invariants after every [`UserStats::fold_round`]:
/// - `best_streak >= streak_correct`
/// - `winrate` lies in `0..=100`
/// - `average_attempts_per_creature >= 1.0` whenever `correct_answers > 0`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Getters, new)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    total_attempts: i32,
    correct_answers: i32,
    total_score: i32,
    streak_correct: i32,
    best_streak: i32,
    #[serde(rename = "averageAttemptsPerPokemon")]
    average_attempts_per_creature: f64,
    winrate: i32,
    last_game_date: Option<NaiveDateTime>,
}

impl UserStats {
    /// Folds one finished round into these stats, returning the new snapshot.
    ///
    /// Pure: the same snapshot and outcome always give the same result, so a
    /// caller that loses an optimistic-concurrency race can reload and fold
    /// again.
    #[instrument(skip(self), fields(total_attempts = self.total_attempts, correct_answers = self.correct_answers))]
    pub fn fold_round(&self, outcome: &RoundOutcome, now: NaiveDateTime) -> Self {
        debug_assert!(
            !outcome.correct || outcome.attempts >= 1,
            "a correct round takes at least one attempt"
        );

        let mut next = self.clone();
        next.total_attempts += outcome.attempts;

        if outcome.correct {
            next.correct_answers += 1;
            next.streak_correct += 1;
            next.best_streak = next.best_streak.max(next.streak_correct);
        } else {
            next.streak_correct = 0;
        }

        next.total_score += outcome.points_gained;
        next.last_game_date = Some(now);

        if next.correct_answers > 0 {
            next.average_attempts_per_creature =
                f64::from(next.total_attempts) / f64::from(next.correct_answers);
        }
        if next.total_attempts > 0 {
            next.winrate = (100.0 * f64::from(next.correct_answers)
                / f64::from(next.total_attempts))
            .round() as i32;
        }

        debug!(
            total_attempts = next.total_attempts,
            correct_answers = next.correct_answers,
            total_score = next.total_score,
            streak = next.streak_correct,
            best_streak = next.best_streak,
            winrate = next.winrate,
            "Round folded into stats"
        );
        next
    }
}
