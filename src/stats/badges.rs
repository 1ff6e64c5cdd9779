//! Achievements: a read-side projection over [`UserStats`].
//!
//! Nothing here is persisted. Badges are recomputed from the current stats
//! every time they are shown.

use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator};
use tracing::instrument;

use crate::stats::UserStats;

/// A badge earned by crossing a stats threshold.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Achievement {
    /// Named 10 creatures.
    Novice,
    /// Named 25 creatures.
    Confirmed,
    /// Named 50 creatures.
    Champion,
    /// Win rate of 80% or more.
    Sharpshooter,
    /// Best streak of 5.
    OnFire,
    /// Best streak of 10.
    Infallible,
    /// At most 1.5 attempts per named creature.
    Lightning,
    /// 1000 total points.
    Master,
}

impl Achievement {
    /// Display title.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Novice => "Novice",
            Self::Confirmed => "Confirmed",
            Self::Champion => "Champion",
            Self::Sharpshooter => "Sharpshooter",
            Self::OnFire => "On Fire",
            Self::Infallible => "Infallible",
            Self::Lightning => "Lightning",
            Self::Master => "Master",
        }
    }

    /// One-line description of the threshold.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Novice => "Found 10 creatures",
            Self::Confirmed => "Found 25 creatures",
            Self::Champion => "Found 50 creatures",
            Self::Sharpshooter => "Win rate of 80% or more",
            Self::OnFire => "Best streak of 5 creatures",
            Self::Infallible => "Best streak of 10 creatures",
            Self::Lightning => "Average of 1.5 attempts per creature",
            Self::Master => "Total score of 1000 points",
        }
    }

    /// Whether `stats` satisfies this badge's threshold.
    pub fn is_earned(&self, stats: &UserStats) -> bool {
        match self {
            Self::Novice => *stats.correct_answers() >= 10,
            Self::Confirmed => *stats.correct_answers() >= 25,
            Self::Champion => *stats.correct_answers() >= 50,
            Self::Sharpshooter => *stats.winrate() >= 80,
            Self::OnFire => *stats.best_streak() >= 5,
            Self::Infallible => *stats.best_streak() >= 10,
            // An account with no correct answers has a placeholder average of 0.
            Self::Lightning => {
                *stats.correct_answers() > 0 && *stats.average_attempts_per_creature() <= 1.5
            }
            Self::Master => *stats.total_score() >= 1000,
        }
    }
}

/// Returns every badge `stats` has earned, in table order.
#[instrument(skip(stats))]
pub fn achievements(stats: &UserStats) -> Vec<Achievement> {
    Achievement::iter().filter(|a| a.is_earned(stats)).collect()
}
