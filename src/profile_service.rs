//! Account and statistics business logic layer.

use chrono::Utc;
use derive_getters::Getters;
use tracing::{debug, info, instrument, warn};

use crate::auth::{AuthError, Claims, PasswordHasher, TokenService};
use crate::db::{DbError, TriviaRepository, User};
use crate::stats::{Achievement, RoundOutcome, UserStats, achievements};

/// How many times a stats update is retried after losing a version race.
pub const MAX_STATS_RETRIES: usize = 5;

/// Account operation failure.
#[derive(Debug, Clone, derive_more::Display)]
pub enum ProfileError {
    /// Username or password was blank.
    #[display("Username and password are required")]
    MissingCredentials,

    /// Another account already uses this username.
    #[display("Username '{}' is already taken", _0)]
    UsernameTaken(String),

    /// Credentials or token were rejected, or hashing failed.
    #[display("{}", _0)]
    Auth(AuthError),

    /// The account referenced by a token no longer exists.
    #[display("User {} not found", _0)]
    UserNotFound(i32),

    /// Concurrent writers kept moving the stats version.
    #[display("Stats for user {} changed concurrently, giving up", _0)]
    StatsConflict(i32),

    /// The store failed.
    #[display("{}", _0)]
    Store(DbError),
}

impl std::error::Error for ProfileError {}

impl From<DbError> for ProfileError {
    fn from(err: DbError) -> Self {
        Self::Store(err)
    }
}

impl From<AuthError> for ProfileError {
    fn from(err: AuthError) -> Self {
        Self::Auth(err)
    }
}

/// An account with its current stats and earned badges.
#[derive(Debug, Clone, Getters)]
pub struct Profile {
    user: User,
    stats: UserStats,
    achievements: Vec<Achievement>,
}

/// Service layer for registration, login and stats recording.
#[derive(Debug, Clone)]
pub struct ProfileService {
    repository: TriviaRepository,
    hasher: PasswordHasher,
    tokens: TokenService,
}

impl ProfileService {
    /// Creates a new profile service.
    #[instrument(skip_all)]
    pub fn new(repository: TriviaRepository, hasher: PasswordHasher, tokens: TokenService) -> Self {
        info!(bcrypt_cost = hasher.cost(), "Creating ProfileService");
        Self {
            repository,
            hasher,
            tokens,
        }
    }

    /// Returns the underlying repository.
    pub fn repository(&self) -> &TriviaRepository {
        &self.repository
    }

    /// Returns the token service.
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Creates an account with zeroed stats.
    #[instrument(skip(self, password))]
    pub fn register(&self, username: &str, password: &str) -> Result<User, ProfileError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(ProfileError::MissingCredentials);
        }

        let digest = self.hasher.hash(password)?;
        match self.repository.create_user(username.to_string(), digest) {
            Ok(user) => {
                info!(user_id = user.id(), "Account registered");
                Ok(user)
            }
            Err(e) if e.is_unique_violation() => {
                warn!(username, "Username already taken");
                Err(ProfileError::UsernameTaken(username.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Checks credentials and issues a session token.
    ///
    /// Unknown usernames and wrong passwords fail identically.
    #[instrument(skip(self, password))]
    pub fn login(&self, username: &str, password: &str) -> Result<String, ProfileError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(ProfileError::MissingCredentials);
        }

        let Some(user) = self.repository.get_user_by_name(username)? else {
            debug!("Unknown username");
            return Err(AuthError::InvalidCredentials.into());
        };
        if !self.hasher.verify(password, user.password_hash())? {
            debug!(user_id = user.id(), "Wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        let token = self.tokens.issue(*user.id(), user.username())?;
        info!(user_id = user.id(), "Login succeeded");
        Ok(token)
    }

    /// Resolves a bearer token to its claims.
    #[instrument(skip_all)]
    pub fn authenticate(&self, token: &str) -> Result<Claims, ProfileError> {
        Ok(self.tokens.verify(token).into_result()?)
    }

    /// Loads an account with its stats and achievements.
    #[instrument(skip(self))]
    pub fn profile(&self, user_id: i32) -> Result<Profile, ProfileError> {
        let user = self
            .repository
            .get_user(user_id)?
            .ok_or(ProfileError::UserNotFound(user_id))?;
        let (stats, _) = self
            .repository
            .load_stats(user_id)?
            .ok_or(ProfileError::UserNotFound(user_id))?;
        let achievements = achievements(&stats);
        Ok(Profile {
            user,
            stats,
            achievements,
        })
    }

    /// Folds a finished round into the user's stats.
    ///
    /// Uses the stored version for optimistic concurrency: on a lost race the
    /// stats are reloaded and folded again, up to [`MAX_STATS_RETRIES`] times.
    #[instrument(skip(self))]
    pub fn record_round(
        &self,
        user_id: i32,
        outcome: &RoundOutcome,
    ) -> Result<UserStats, ProfileError> {
        for attempt in 1..=MAX_STATS_RETRIES {
            let (current, version) = self
                .repository
                .load_stats(user_id)?
                .ok_or(ProfileError::UserNotFound(user_id))?;

            let next = current.fold_round(outcome, Utc::now().naive_utc());
            if self.repository.save_stats(user_id, &next, version)? {
                info!(
                    user_id,
                    attempt,
                    total_score = next.total_score(),
                    streak = next.streak_correct(),
                    "Round recorded"
                );
                return Ok(next);
            }
            debug!(attempt, "Retrying stats update");
        }

        warn!(user_id, "Stats update kept conflicting");
        Err(ProfileError::StatsConflict(user_id))
    }
}
