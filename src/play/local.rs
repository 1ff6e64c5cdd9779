//! In-process backend: rounds run against the local catalog, nothing is recorded.

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::catalog_service::CatalogService;
use crate::game::{GuessOutcome, HintOutcome, RoundId, RoundManager};
use crate::play::TriviaBackend;
use crate::server::dto::{CompleteView, RoundView};

/// Plays rounds without a server.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    catalog: CatalogService,
    rounds: RoundManager,
    pool_limit: i64,
    creature_type: Option<String>,
}

impl LocalBackend {
    /// Creates a backend drawing from the first `pool_limit` creatures,
    /// optionally of one type.
    #[instrument(skip(catalog, rounds))]
    pub fn new(
        catalog: CatalogService,
        rounds: RoundManager,
        pool_limit: i64,
        creature_type: Option<String>,
    ) -> Self {
        info!("Creating local backend");
        Self {
            catalog,
            rounds,
            pool_limit,
            creature_type,
        }
    }
}

#[async_trait]
impl TriviaBackend for LocalBackend {
    #[instrument(skip(self))]
    async fn start_round(&mut self) -> Result<RoundView> {
        let catalog = self.catalog.clone();
        let creature_type = self.creature_type.clone();
        let limit = self.pool_limit;
        let pool = tokio::task::spawn_blocking(move || catalog.round_pool(creature_type, limit))
            .await??;

        let (id, round) = self.rounds.start_round(&pool, &mut rand::rng())?;
        debug!(round_id = %id, "Local round started");
        Ok(RoundView::new(id, &round))
    }

    #[instrument(skip(self, text))]
    async fn guess(&mut self, round: RoundId, text: &str) -> Result<GuessOutcome> {
        Ok(self.rounds.submit_guess(round, text)?)
    }

    #[instrument(skip(self))]
    async fn hint(&mut self, round: RoundId) -> Result<HintOutcome> {
        Ok(self.rounds.request_hint(round)?)
    }

    #[instrument(skip(self))]
    async fn finish(&mut self, round: RoundId) -> Result<Option<CompleteView>> {
        let outcome = self.rounds.complete(round)?.into_outcome();
        debug!(correct = outcome.correct(), "Local round finished, not recorded");
        Ok(None)
    }
}
