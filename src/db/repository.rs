//! Database repository for the creature catalog, accounts and statistics.

use diesel::prelude::*;
use diesel::sql_types::Text;
use diesel::sqlite::Sqlite;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument, warn};

use crate::catalog::{
    Creature, CreatureFilter, CreatureQuery, Page, PageMeta, SortDirection, SortField, SortOrder,
};
use crate::db::models::{NewStatsRow, StatsChangeset};
use crate::db::{CreatureRow, DbError, NewUser, StatsRow, User, schema};
use crate::stats::UserStats;

/// Schema migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

type CreatureBoxedQuery = schema::creatures::BoxedQuery<'static, Sqlite>;

diesel::define_sql_function! {
    /// 1-based position of `needle` in `haystack`, or 0. Case-sensitive.
    fn instr(haystack: Text, needle: Text) -> Integer;
}

/// Escapes `%`, `_` and `\` for use inside a `LIKE ... ESCAPE '\'` pattern.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Builds the catalog query restricted by `filter`, without ordering or paging.
fn filtered_creatures(filter: &CreatureFilter) -> Result<CreatureBoxedQuery, DbError> {
    use schema::creatures::dsl;

    let mut query = dsl::creatures.into_boxed();

    if let Some(creature_type) = filter.creature_type() {
        // Types are a JSON array, so an exact tag match is a quoted substring.
        let quoted = serde_json::to_string(creature_type)?;
        query = query.filter(instr(dsl::types, quoted).gt(0));
    }

    if let Some(name) = filter.name() {
        // Both sides are lowercased in Rust; LIKE alone only folds ASCII.
        let pattern = format!("%{}%", escape_like(&name.to_lowercase()));
        query = query.filter(dsl::name_search.like(pattern).escape('\\'));
    }

    Ok(query)
}

macro_rules! order_by {
    ($query:expr, $column:expr, $direction:expr) => {
        match $direction {
            SortDirection::Ascending => $query.order($column.asc()),
            SortDirection::Descending => $query.order($column.desc()),
        }
    };
}

/// Applies the requested ordering, breaking ties by catalog number.
fn sorted_creatures(query: CreatureBoxedQuery, sort: Option<&SortOrder>) -> CreatureBoxedQuery {
    use schema::creatures::dsl;

    let Some(sort) = sort else {
        return query.order(dsl::id.asc());
    };
    let direction = *sort.direction();
    let ordered = match sort.field() {
        SortField::Id => return order_by!(query, dsl::id, direction),
        SortField::NameFrench => order_by!(query, dsl::name_french, direction),
        SortField::NameEnglish => order_by!(query, dsl::name_english, direction),
        SortField::Hp => order_by!(query, dsl::hp, direction),
        SortField::Attack => order_by!(query, dsl::attack, direction),
        SortField::Defense => order_by!(query, dsl::defense, direction),
        SortField::SpecialAttack => order_by!(query, dsl::special_attack, direction),
        SortField::SpecialDefense => order_by!(query, dsl::special_defense, direction),
        SortField::Speed => order_by!(query, dsl::speed, direction),
    };
    ordered.then_order_by(dsl::id.asc())
}

/// Database repository for catalog, account and stats operations.
///
/// Opens a short-lived connection per call, so it is cheap to clone and
/// safe to use from blocking tasks.
#[derive(Debug, Clone)]
pub struct TriviaRepository {
    db_path: String,
}

impl TriviaRepository {
    /// Creates a new repository for the database at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the path is empty.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Result<Self, DbError> {
        if db_path.trim().is_empty() {
            return Err(DbError::new("Database path is empty"));
        }
        info!(path = %db_path, "Creating TriviaRepository");
        Ok(Self { db_path })
    }

    /// Path of the backing database.
    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        let mut conn = SqliteConnection::establish(&self.db_path)
            .map_err(|e| DbError::new(format!("Failed to connect to '{}': {}", self.db_path, e)))?;
        diesel::sql_query("PRAGMA busy_timeout = 5000").execute(&mut conn)?;
        diesel::sql_query("PRAGMA foreign_keys = ON").execute(&mut conn)?;
        Ok(conn)
    }

    /// Applies any pending schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a migration fails.
    #[instrument(skip(self))]
    pub fn run_migrations(&self) -> Result<usize, DbError> {
        let mut conn = self.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::new(format!("Migration failed: {}", e)))?;
        info!(count = applied.len(), "Migrations applied");
        Ok(applied.len())
    }

    // ── Catalog ──────────────────────────────────────────────────────────

    /// Lists creatures matching `query`, with pagination metadata.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs or a stored row is corrupt.
    #[instrument(skip(self))]
    pub fn list_creatures(&self, query: &CreatureQuery) -> Result<Page<Creature>, DbError> {
        let mut conn = self.connection()?;
        let pagination = query.pagination();

        let total: i64 = filtered_creatures(query.filter())?
            .count()
            .get_result(&mut conn)?;

        let rows = sorted_creatures(filtered_creatures(query.filter())?, query.sort().as_ref())
            .offset(pagination.offset())
            .limit(*pagination.limit())
            .load::<CreatureRow>(&mut conn)?;

        let data = rows
            .into_iter()
            .map(Creature::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        info!(total, returned = data.len(), "Creatures listed");
        Ok(Page::new(PageMeta::new(total, pagination), data))
    }

    /// Gets one creature by catalog number. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_creature(&self, id: i32) -> Result<Option<Creature>, DbError> {
        let mut conn = self.connection()?;
        let row = schema::creatures::table
            .find(id)
            .select(CreatureRow::as_select())
            .first::<CreatureRow>(&mut conn)
            .optional()?;
        row.map(Creature::try_from).transpose()
    }

    /// Inserts a new creature.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] with [`DbError::is_unique_violation`] set if the id
    /// is taken.
    #[instrument(skip(self, creature), fields(id = creature.id()))]
    pub fn insert_creature(&self, creature: &Creature) -> Result<Creature, DbError> {
        let mut conn = self.connection()?;
        let row = CreatureRow::try_from(creature)?;
        let stored = diesel::insert_into(schema::creatures::table)
            .values(&row)
            .returning(CreatureRow::as_returning())
            .get_result(&mut conn)?;
        info!(id = stored.id, "Creature inserted");
        Creature::try_from(stored)
    }

    /// Replaces an existing creature. Returns `None` if no creature has that id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self, creature), fields(id = creature.id()))]
    pub fn update_creature(&self, creature: &Creature) -> Result<Option<Creature>, DbError> {
        let mut conn = self.connection()?;
        let row = CreatureRow::try_from(creature)?;
        let stored = diesel::update(schema::creatures::table.find(row.id))
            .set(&row)
            .returning(CreatureRow::as_returning())
            .get_result(&mut conn)
            .optional()?;
        match stored {
            Some(stored) => {
                info!(id = stored.id, "Creature updated");
                Creature::try_from(stored).map(Some)
            }
            None => {
                debug!("No creature to update");
                Ok(None)
            }
        }
    }

    /// Deletes a creature, returning it. Returns `None` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn delete_creature(&self, id: i32) -> Result<Option<Creature>, DbError> {
        let mut conn = self.connection()?;
        let deleted = diesel::delete(schema::creatures::table.find(id))
            .returning(CreatureRow::as_returning())
            .get_result(&mut conn)
            .optional()?;
        if deleted.is_some() {
            info!(id, "Creature deleted");
        }
        deleted.map(Creature::try_from).transpose()
    }

    /// Inserts or replaces a batch of creatures in one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if any write fails; nothing is written in that case.
    #[instrument(skip(self, creatures), fields(count = creatures.len()))]
    pub fn upsert_creatures(&self, creatures: &[Creature]) -> Result<usize, DbError> {
        let rows = creatures
            .iter()
            .map(CreatureRow::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let mut conn = self.connection()?;
        let written = conn.transaction::<_, DbError, _>(|conn| {
            let mut written = 0;
            for row in &rows {
                written += diesel::insert_into(schema::creatures::table)
                    .values(row)
                    .on_conflict(schema::creatures::id)
                    .do_update()
                    .set(row)
                    .execute(conn)?;
            }
            Ok(written)
        })?;

        info!(written, "Creatures upserted");
        Ok(written)
    }

    /// Loads the first `limit` creatures, in catalog order, that match `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn creature_pool(
        &self,
        filter: &CreatureFilter,
        limit: i64,
    ) -> Result<Vec<Creature>, DbError> {
        let mut conn = self.connection()?;
        let rows = filtered_creatures(filter)?
            .order(schema::creatures::id.asc())
            .limit(limit)
            .load::<CreatureRow>(&mut conn)?;
        debug!(count = rows.len(), "Round pool loaded");
        rows.into_iter().map(Creature::try_from).collect()
    }

    // ── Accounts ─────────────────────────────────────────────────────────

    /// Creates an account together with its zeroed stats row.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] with [`DbError::is_unique_violation`] set if the
    /// username is taken.
    #[instrument(skip(self, password_hash))]
    pub fn create_user(&self, username: String, password_hash: String) -> Result<User, DbError> {
        debug!(username = %username, "Creating user");
        let mut conn = self.connection()?;
        let new_user = NewUser::new(username, password_hash);

        let user = conn.transaction::<_, DbError, _>(|conn| {
            let user = diesel::insert_into(schema::users::table)
                .values(&new_user)
                .returning(User::as_returning())
                .get_result(conn)?;
            diesel::insert_into(schema::user_stats::table)
                .values(&NewStatsRow { user_id: *user.id() })
                .execute(conn)?;
            Ok(user)
        })?;

        info!(user_id = user.id(), username = %user.username(), "User created");
        Ok(user)
    }

    /// Gets an account by username. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_user_by_name(&self, username: &str) -> Result<Option<User>, DbError> {
        let mut conn = self.connection()?;
        let user = schema::users::table
            .filter(schema::users::username.eq(username))
            .select(User::as_select())
            .first::<User>(&mut conn)
            .optional()?;
        debug!(found = user.is_some(), "User lookup by name");
        Ok(user)
    }

    /// Gets an account by id. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_user(&self, user_id: i32) -> Result<Option<User>, DbError> {
        let mut conn = self.connection()?;
        let user = schema::users::table
            .find(user_id)
            .select(User::as_select())
            .first::<User>(&mut conn)
            .optional()?;
        Ok(user)
    }

    // ── Stats ────────────────────────────────────────────────────────────

    /// Loads a user's stats and their current version.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn load_stats(&self, user_id: i32) -> Result<Option<(UserStats, i32)>, DbError> {
        let mut conn = self.connection()?;
        let row = schema::user_stats::table
            .find(user_id)
            .select(StatsRow::as_select())
            .first::<StatsRow>(&mut conn)
            .optional()?;
        Ok(row.map(StatsRow::into_stats))
    }

    /// Writes `stats` if the stored version still equals `expected_version`,
    /// touching the account's `updated_at` in the same transaction.
    ///
    /// Returns `false` when another writer got there first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self, stats))]
    pub fn save_stats(
        &self,
        user_id: i32,
        stats: &UserStats,
        expected_version: i32,
    ) -> Result<bool, DbError> {
        use schema::user_stats::dsl;

        let mut conn = self.connection()?;
        let changes = StatsChangeset::new(stats, expected_version + 1);
        let saved = conn.transaction::<_, DbError, _>(|conn| {
            let updated = diesel::update(
                dsl::user_stats
                    .filter(dsl::user_id.eq(user_id))
                    .filter(dsl::version.eq(expected_version)),
            )
            .set(&changes)
            .execute(conn)?;
            if updated == 0 {
                return Ok(false);
            }
            diesel::update(schema::users::table.find(user_id))
                .set(schema::users::updated_at.eq(diesel::dsl::now))
                .execute(conn)?;
            Ok(true)
        })?;

        if saved {
            debug!(version = expected_version + 1, "Stats saved");
        } else {
            warn!(expected_version, "Stats version moved underneath us");
        }
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("Pika"), "Pika");
    }
}
