//! Row models and their conversions to domain types.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use tracing::instrument;

use crate::catalog::{BaseStats, Creature, LocalizedNames};
use crate::db::{DbError, schema};
use crate::stats::UserStats;

/// Separates locales inside [`CreatureRow::name_search`].
const NAME_SEPARATOR: char = '\n';

/// Lowercased names in every locale, for case-insensitive search.
fn name_search_key(name: &LocalizedNames) -> String {
    [name.french(), name.english(), name.japanese(), name.chinese()]
        .map(|n| n.to_lowercase())
        .join(&NAME_SEPARATOR.to_string())
}

/// Catalog row. Types are stored as a JSON array.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset, Identifiable)]
#[diesel(table_name = schema::creatures)]
#[diesel(treat_none_as_null = true)]
pub struct CreatureRow {
    pub(crate) id: i32,
    pub(crate) name_french: String,
    pub(crate) name_english: String,
    pub(crate) name_japanese: String,
    pub(crate) name_chinese: String,
    pub(crate) types: String,
    pub(crate) hp: i32,
    pub(crate) attack: i32,
    pub(crate) defense: i32,
    pub(crate) special_attack: i32,
    pub(crate) special_defense: i32,
    pub(crate) speed: i32,
    pub(crate) image: Option<String>,
    /// Derived from the names on every write; never read back.
    pub(crate) name_search: String,
}

impl TryFrom<&Creature> for CreatureRow {
    type Error = DbError;

    fn try_from(creature: &Creature) -> Result<Self, Self::Error> {
        let name = creature.name();
        let base = creature.base();
        Ok(Self {
            id: *creature.id(),
            name_french: name.french().clone(),
            name_english: name.english().clone(),
            name_japanese: name.japanese().clone(),
            name_chinese: name.chinese().clone(),
            types: serde_json::to_string(creature.types())?,
            hp: *base.hp(),
            attack: *base.attack(),
            defense: *base.defense(),
            special_attack: *base.special_attack(),
            special_defense: *base.special_defense(),
            speed: *base.speed(),
            image: creature.image().clone(),
            name_search: name_search_key(name),
        })
    }
}

impl TryFrom<CreatureRow> for Creature {
    type Error = DbError;

    #[instrument(skip(row), fields(id = row.id))]
    fn try_from(row: CreatureRow) -> Result<Self, Self::Error> {
        let types: Vec<String> = serde_json::from_str(&row.types)?;
        Ok(Creature::new(
            row.id,
            LocalizedNames::new(
                row.name_french,
                row.name_english,
                row.name_japanese,
                row.name_chinese,
            ),
            types,
            BaseStats::new(
                row.hp,
                row.attack,
                row.defense,
                row.special_attack,
                row.special_defense,
                row.speed,
            ),
            row.image,
        ))
    }
}

/// Account database model.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::users)]
pub struct User {
    id: i32,
    username: String,
    password_hash: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

/// Insertable account model.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::users)]
pub struct NewUser {
    username: String,
    password_hash: String,
}

/// Stored statistics row.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = schema::user_stats)]
#[diesel(primary_key(user_id))]
#[diesel(belongs_to(User))]
pub struct StatsRow {
    user_id: i32,
    total_attempts: i32,
    correct_answers: i32,
    total_score: i32,
    streak_correct: i32,
    best_streak: i32,
    average_attempts: f64,
    winrate: i32,
    last_game_date: Option<NaiveDateTime>,
    version: i32,
}

impl StatsRow {
    /// Splits the row into the domain snapshot and its version.
    pub fn into_stats(self) -> (UserStats, i32) {
        let stats = UserStats::new(
            self.total_attempts,
            self.correct_answers,
            self.total_score,
            self.streak_correct,
            self.best_streak,
            self.average_attempts,
            self.winrate,
            self.last_game_date,
        );
        (stats, self.version)
    }
}

/// Fresh, zeroed statistics row for a new account.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::user_stats)]
pub(crate) struct NewStatsRow {
    pub(crate) user_id: i32,
}

/// Full replacement of a stats row, including the bumped version.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = schema::user_stats)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct StatsChangeset {
    total_attempts: i32,
    correct_answers: i32,
    total_score: i32,
    streak_correct: i32,
    best_streak: i32,
    average_attempts: f64,
    winrate: i32,
    last_game_date: Option<NaiveDateTime>,
    version: i32,
}

impl StatsChangeset {
    /// Builds the changeset writing `stats` as version `version`.
    pub(crate) fn new(stats: &UserStats, version: i32) -> Self {
        Self {
            total_attempts: *stats.total_attempts(),
            correct_answers: *stats.correct_answers(),
            total_score: *stats.total_score(),
            streak_correct: *stats.streak_correct(),
            best_streak: *stats.best_streak(),
            average_attempts: *stats.average_attempts_per_creature(),
            winrate: *stats.winrate(),
            last_game_date: *stats.last_game_date(),
            version,
        }
    }
}
