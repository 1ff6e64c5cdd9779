//! Catalog business logic layer.

use tracing::{debug, info, instrument, warn};

use crate::catalog::{Creature, CreatureFilter, CreatureQuery, Page};
use crate::db::{DbError, TriviaRepository};

/// Catalog operation failure.
#[derive(Debug, Clone, derive_more::Display)]
pub enum CatalogError {
    /// No creature has the requested id.
    #[display("Creature {} not found", _0)]
    NotFound(i32),

    /// A creature with this id already exists.
    #[display("Creature {} already exists", _0)]
    AlreadyExists(i32),

    /// The submitted creature breaks a structural rule.
    #[display("Invalid creature: {}", _0)]
    Invalid(String),

    /// A catalog dump could not be read from disk.
    #[display("Failed to read catalog dump: {}", _0)]
    Unreadable(String),

    /// The store failed.
    #[display("{}", _0)]
    Store(DbError),
}

impl std::error::Error for CatalogError {}

impl From<DbError> for CatalogError {
    fn from(err: DbError) -> Self {
        Self::Store(err)
    }
}

/// Service layer for catalog reads and writes.
#[derive(Debug, Clone)]
pub struct CatalogService {
    repository: TriviaRepository,
}

impl CatalogService {
    /// Creates a new catalog service backed by the given repository.
    #[instrument(skip(repository))]
    pub fn new(repository: TriviaRepository) -> Self {
        info!("Creating CatalogService");
        Self { repository }
    }

    /// Returns the underlying repository.
    pub fn repository(&self) -> &TriviaRepository {
        &self.repository
    }

    /// Lists creatures matching `query`.
    #[instrument(skip(self))]
    pub fn list(&self, query: &CreatureQuery) -> Result<Page<Creature>, CatalogError> {
        Ok(self.repository.list_creatures(query)?)
    }

    /// Gets one creature.
    #[instrument(skip(self))]
    pub fn get(&self, id: i32) -> Result<Creature, CatalogError> {
        self.repository
            .get_creature(id)?
            .ok_or(CatalogError::NotFound(id))
    }

    /// Adds a creature under its own id.
    #[instrument(skip(self, creature), fields(id = creature.id()))]
    pub fn create(&self, creature: Creature) -> Result<Creature, CatalogError> {
        creature.validate().map_err(CatalogError::Invalid)?;
        match self.repository.insert_creature(&creature) {
            Ok(stored) => Ok(stored),
            Err(e) if e.is_unique_violation() => {
                warn!(id = creature.id(), "Creature id already taken");
                Err(CatalogError::AlreadyExists(*creature.id()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Replaces the creature at `id`. The body's own id is ignored.
    #[instrument(skip(self, creature))]
    pub fn update(&self, id: i32, creature: Creature) -> Result<Creature, CatalogError> {
        let creature = creature.with_id(id);
        creature.validate().map_err(CatalogError::Invalid)?;
        self.repository
            .update_creature(&creature)?
            .ok_or(CatalogError::NotFound(id))
    }

    /// Removes a creature, returning what was removed.
    #[instrument(skip(self))]
    pub fn delete(&self, id: i32) -> Result<Creature, CatalogError> {
        self.repository
            .delete_creature(id)?
            .ok_or(CatalogError::NotFound(id))
    }

    /// Loads the candidates a new round picks from.
    #[instrument(skip(self))]
    pub fn round_pool(
        &self,
        creature_type: Option<String>,
        limit: i64,
    ) -> Result<Vec<Creature>, CatalogError> {
        let filter = CreatureFilter::new(creature_type, None);
        let pool = self.repository.creature_pool(&filter, limit)?;
        debug!(size = pool.len(), "Round pool ready");
        Ok(pool)
    }

    /// Validates and writes a batch of creatures, replacing existing ids.
    ///
    /// Nothing is written if any entry is invalid.
    #[instrument(skip(self, creatures), fields(count = creatures.len()))]
    pub fn import(&self, creatures: &[Creature]) -> Result<usize, CatalogError> {
        for creature in creatures {
            creature
                .validate()
                .map_err(|reason| CatalogError::Invalid(format!("#{}: {}", creature.id(), reason)))?;
        }
        let written = self.repository.upsert_creatures(creatures)?;
        info!(written, "Catalog import finished");
        Ok(written)
    }
}
