//! Request and response bodies of the REST API.
//!
//! Response types also derive `Deserialize` so the terminal client can read
//! them back.

use chrono::NaiveDateTime;
use derive_new::new;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::{AnyRound, Fact, RevealFraction, RoundId, RoundPhase};
use crate::profile_service::Profile;
use crate::stats::{Achievement, RoundOutcome, UserStats};

/// Error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct ErrorBody {
    /// Human-readable message.
    pub error: String,
}

/// Body of `/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthView {
    /// Always `"ok"`.
    pub status: String,
}

/// Username and password, as submitted. Missing fields are reported as 400.
#[derive(Debug, Clone, Default, Serialize, Deserialize, new)]
pub struct CredentialsRequest {
    /// Account name.
    #[serde(default)]
    pub username: Option<String>,
    /// Plaintext password.
    #[serde(default)]
    pub password: Option<String>,
}

/// Body of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterView {
    /// Confirmation text.
    pub message: String,
    /// The registered username.
    pub username: String,
}

/// Body of a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenView {
    /// Bearer token.
    pub token: String,
}

/// A badge with its display text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementView {
    /// Stable identifier.
    pub id: Achievement,
    /// Display title.
    pub title: String,
    /// What earned it.
    pub description: String,
}

impl From<Achievement> for AchievementView {
    fn from(achievement: Achievement) -> Self {
        Self {
            id: achievement,
            title: achievement.title().to_string(),
            description: achievement.description().to_string(),
        }
    }
}

fn achievement_views(achievements: &[Achievement]) -> Vec<AchievementView> {
    achievements.iter().copied().map(AchievementView::from).collect()
}

/// Body of `/api/auth/profile`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    /// Account id.
    pub id: i32,
    /// Account name.
    pub username: String,
    /// Registration time.
    pub created_at: NaiveDateTime,
    /// Cumulative stats.
    pub game_stats: UserStats,
    /// Earned badges.
    pub achievements: Vec<AchievementView>,
}

impl From<&Profile> for ProfileView {
    fn from(profile: &Profile) -> Self {
        Self {
            id: *profile.user().id(),
            username: profile.user().username().clone(),
            created_at: *profile.user().created_at(),
            game_stats: profile.stats().clone(),
            achievements: achievement_views(profile.achievements()),
        }
    }
}

/// Optional body of `POST /api/game/rounds`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StartRoundRequest {
    /// Restricts the pool to one type tag.
    #[serde(rename = "type", default)]
    pub creature_type: Option<String>,
}

/// Body of `POST /api/game/rounds/{id}/guess`.
#[derive(Debug, Clone, Serialize, Deserialize, new)]
pub struct GuessRequest {
    /// The guessed name.
    pub guess: String,
}

/// Public view of a live round. The answer is only shown once solved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundView {
    /// Round id.
    pub id: Uuid,
    /// Current phase.
    pub phase: RoundPhase,
    /// Attempts so far.
    pub attempts: i32,
    /// Visible share of the facts.
    pub reveal: RevealFraction,
    /// Visible facts in reveal order.
    pub facts: Vec<Fact>,
    /// Points awarded, once solved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<i32>,
    /// Creature name, once solved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    /// Creature image, once solved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl RoundView {
    /// Builds the view of `round`.
    pub fn new(id: RoundId, round: &AnyRound) -> Self {
        let solved = round.phase() == RoundPhase::Solved;
        Self {
            id,
            phase: round.phase(),
            attempts: round.attempts(),
            reveal: round.reveal_fraction(),
            facts: round.revealed_facts(),
            points: round.points(),
            answer: round.revealed_answer().map(str::to_string),
            image: solved.then(|| round.creature().image().clone()).flatten(),
        }
    }
}

/// Body of `POST /api/game/rounds/{id}/complete`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteView {
    /// What was folded into the stats.
    pub outcome: RoundOutcome,
    /// Stats after the fold.
    pub game_stats: UserStats,
    /// Badges earned with the new stats.
    pub achievements: Vec<AchievementView>,
}

impl CompleteView {
    /// Builds the view from the folded stats.
    pub fn new(outcome: RoundOutcome, game_stats: UserStats) -> Self {
        let achievements = achievement_views(&crate::stats::achievements(&game_stats));
        Self {
            outcome,
            game_stats,
            achievements,
        }
    }
}

/// Query parameters of `GET /api/creatures`.
///
/// Numbers are taken as text so malformed values fall back to defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListParams {
    /// Type tag filter.
    #[serde(rename = "type")]
    pub creature_type: Option<String>,
    /// Name substring filter.
    pub name: Option<String>,
    /// Sort field, `-` prefixed for descending.
    pub sort: Option<String>,
    /// One-based page.
    pub page: Option<String>,
    /// Page size.
    pub limit: Option<String>,
}
