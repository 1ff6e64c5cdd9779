//! Live round management for the HTTP API.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use rand::Rng;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::catalog::Creature;
use crate::game::{AnyRound, GuessOutcome, HintOutcome, RoundError, RoundInProgress, RoundSettings};

/// Unique identifier for a live round.
pub type RoundId = Uuid;

#[derive(Debug)]
struct RoundEntry {
    round: AnyRound,
    touched: Instant,
}

impl RoundEntry {
    fn new(round: AnyRound) -> Self {
        Self {
            round,
            touched: Instant::now(),
        }
    }
}

/// Owns every live round.
///
/// Each operation takes the round out of the map, applies one transition and
/// puts it back while holding the lock, so concurrent requests against one
/// round are serialized.
#[derive(Debug, Clone)]
pub struct RoundManager {
    rounds: Arc<Mutex<HashMap<RoundId, RoundEntry>>>,
    settings: RoundSettings,
    idle_ttl: Duration,
}

impl RoundManager {
    /// Creates a manager. Rounds untouched for longer than `idle_ttl` are
    /// dropped the next time a round starts.
    #[instrument]
    pub fn new(settings: RoundSettings, idle_ttl: Duration) -> Self {
        info!("Creating round manager");
        Self {
            rounds: Arc::new(Mutex::new(HashMap::new())),
            settings,
            idle_ttl,
        }
    }

    /// Round settings applied to new rounds.
    pub fn settings(&self) -> &RoundSettings {
        &self.settings
    }

    // Entries are only ever replaced whole, so a poisoned map is still consistent.
    fn lock(&self) -> MutexGuard<'_, HashMap<RoundId, RoundEntry>> {
        self.rounds.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts a round drawn from `pool` and returns its id and a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`RoundError::EmptyPool`] if `pool` is empty; nothing is stored.
    #[instrument(skip(self, pool, rng), fields(pool_size = pool.len()))]
    pub fn start_round<R: Rng + ?Sized>(
        &self,
        pool: &[Creature],
        rng: &mut R,
    ) -> Result<(RoundId, AnyRound), RoundError> {
        let round: AnyRound = RoundInProgress::start(pool, &self.settings, rng)?.into();
        let id = Uuid::new_v4();

        let mut rounds = self.lock();
        let pruned = Self::prune_locked(&mut rounds, self.idle_ttl);
        rounds.insert(id, RoundEntry::new(round.clone()));

        info!(round_id = %id, pruned, live = rounds.len(), "Round registered");
        Ok((id, round))
    }

    /// Returns a snapshot of a round.
    #[instrument(skip(self))]
    pub fn get(&self, id: RoundId) -> Result<AnyRound, RoundError> {
        let rounds = self.lock();
        rounds.get(&id).map(|e| e.round.clone()).ok_or_else(|| {
            debug!(round_id = %id, "Round not found");
            RoundError::NotFound(id)
        })
    }

    /// Submits a guess against a round.
    #[instrument(skip(self, text), fields(round_id = %id))]
    pub fn submit_guess(&self, id: RoundId, text: &str) -> Result<GuessOutcome, RoundError> {
        let mut rounds = self.lock();
        let entry = rounds.remove(&id).ok_or(RoundError::NotFound(id))?;

        let (round, outcome) = entry.round.submit_guess(text);
        rounds.insert(id, RoundEntry::new(round));

        if let Err(e) = &outcome {
            warn!(error = %e, "Guess rejected");
        }
        outcome
    }

    /// Requests a hint for a round.
    #[instrument(skip(self), fields(round_id = %id))]
    pub fn request_hint(&self, id: RoundId) -> Result<HintOutcome, RoundError> {
        let mut rounds = self.lock();
        let entry = rounds.get_mut(&id).ok_or(RoundError::NotFound(id))?;
        entry.touched = Instant::now();
        Ok(entry.round.request_hint())
    }

    /// Removes a round and returns its final state.
    ///
    /// Once removed, the round can't be completed a second time.
    #[instrument(skip(self), fields(round_id = %id))]
    pub fn complete(&self, id: RoundId) -> Result<AnyRound, RoundError> {
        let mut rounds = self.lock();
        let entry = rounds.remove(&id).ok_or(RoundError::NotFound(id))?;
        info!(phase = ?entry.round.phase(), attempts = entry.round.attempts(), "Round completed");
        Ok(entry.round)
    }

    /// Drops rounds idle for longer than the configured TTL.
    #[instrument(skip(self))]
    pub fn prune_idle(&self) -> usize {
        let mut rounds = self.lock();
        Self::prune_locked(&mut rounds, self.idle_ttl)
    }

    fn prune_locked(rounds: &mut HashMap<RoundId, RoundEntry>, ttl: Duration) -> usize {
        let before = rounds.len();
        rounds.retain(|_, entry| entry.touched.elapsed() <= ttl);
        let pruned = before - rounds.len();
        if pruned > 0 {
            debug!(pruned, "Pruned idle rounds");
        }
        pruned
    }

    /// Number of live rounds.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no rounds are live.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl Default for RoundManager {
    fn default() -> Self {
        Self::new(RoundSettings::default(), Duration::from_secs(60 * 60))
    }
}
