//! Shared handler state.

use derive_getters::Getters;
use tracing::{info, instrument};

use crate::auth::{PasswordHasher, TokenService};
use crate::catalog_service::CatalogService;
use crate::config::TriviaConfig;
use crate::db::{DbError, TriviaRepository};
use crate::game::RoundManager;
use crate::profile_service::ProfileService;

/// Services shared by every request. Cheap to clone.
#[derive(Debug, Clone, Getters)]
pub struct AppState {
    catalog: CatalogService,
    profiles: ProfileService,
    rounds: RoundManager,
    pool_limit: i64,
}

impl AppState {
    /// Assembles state from already-built services.
    pub fn new(
        catalog: CatalogService,
        profiles: ProfileService,
        rounds: RoundManager,
        pool_limit: i64,
    ) -> Self {
        Self {
            catalog,
            profiles,
            rounds,
            pool_limit,
        }
    }

    /// Opens the database, applies migrations and builds every service.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the database can't be opened or migrated.
    #[instrument(skip(config), fields(db_path = %config.db_path()))]
    pub fn from_config(config: &TriviaConfig) -> Result<Self, DbError> {
        let repository = TriviaRepository::new(config.db_path().clone())?;
        repository.run_migrations()?;

        let tokens = TokenService::new(config.jwt_secret().as_bytes(), config.token_ttl());
        let profiles = ProfileService::new(
            repository.clone(),
            PasswordHasher::new(*config.bcrypt_cost()),
            tokens,
        );
        let catalog = CatalogService::new(repository);
        let rounds = RoundManager::new(config.round_settings(), config.round_ttl());

        info!("Application state ready");
        Ok(Self::new(catalog, profiles, rounds, *config.pool_limit()))
    }
}
