//! Service configuration: TOML file, then environment, then CLI flags.

use std::path::{Path, PathBuf};
use std::time::Duration;

use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::auth::DEFAULT_BCRYPT_COST;
use crate::catalog::Locale;
use crate::game::RoundSettings;

/// Config file read when no path is given and the file exists.
pub const DEFAULT_CONFIG_FILE: &str = "trivia.toml";

/// Secret used when none is configured. Only fit for local play.
pub const DEV_JWT_SECRET: &str = "strictly-trivia-dev-secret";

/// Longest session token lifetime accepted: one year.
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

/// Longest idle round lifetime accepted: one week.
pub const MAX_ROUND_TTL_MINUTES: u64 = 60 * 24 * 7;

/// Runtime configuration for the trivia service.
#[derive(Debug, Clone, PartialEq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct TriviaConfig {
    /// Interface to bind.
    host: String,
    /// Port to bind.
    port: u16,
    /// SQLite database file.
    db_path: String,
    /// HS256 signing secret.
    jwt_secret: String,
    /// Session token lifetime.
    token_ttl_hours: i64,
    /// bcrypt cost factor.
    bcrypt_cost: u32,
    /// Facts revealed when a round starts.
    initial_hints: usize,
    /// Locale guesses are checked against.
    primary_locale: Locale,
    /// How many catalog entries a round draws from.
    pool_limit: i64,
    /// Idle rounds older than this are dropped.
    round_ttl_minutes: u64,
    /// Directory of static frontend files to serve, if any.
    static_dir: Option<PathBuf>,
}

impl Default for TriviaConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            db_path: "strictly_trivia.db".to_string(),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_ttl_hours: 24,
            bcrypt_cost: DEFAULT_BCRYPT_COST,
            initial_hints: 1,
            primary_locale: Locale::French,
            pool_limit: 100,
            round_ttl_minutes: 60,
            static_dir: None,
        }
    }
}

impl TriviaConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text. Missing keys take defaults.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        info!(db_path = %config.db_path, port = config.port, "Config loaded");
        Ok(config)
    }

    /// Loads the explicit file if given, else `trivia.toml` if present, else
    /// defaults; then applies environment overrides and validates.
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(DEFAULT_CONFIG_FILE)?
            }
            None => {
                debug!("No config file, using defaults");
                Self::default()
            }
        };
        let config = config.with_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `TRIVIA_JWT_SECRET`, `TRIVIA_DB_PATH` and `PORT` from `lookup`.
    #[instrument(skip_all)]
    pub fn with_env_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(secret) = lookup("TRIVIA_JWT_SECRET").filter(|s| !s.is_empty()) {
            debug!("JWT secret taken from environment");
            self.jwt_secret = secret;
        }
        if let Some(db_path) = lookup("TRIVIA_DB_PATH").filter(|s| !s.is_empty()) {
            debug!(db_path = %db_path, "Database path taken from environment");
            self.db_path = db_path;
        }
        if let Some(port) = lookup("PORT") {
            self.port = port
                .trim()
                .parse()
                .map_err(|e| ConfigError::new(format!("Invalid PORT '{}': {}", port, e)))?;
        }
        Ok(self)
    }

    /// Rejects values the service cannot run with.
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::new("jwt_secret must not be empty".to_string()));
        }
        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(ConfigError::new(format!(
                "bcrypt_cost must be within 4..=31, got {}",
                self.bcrypt_cost
            )));
        }
        if !(1..=MAX_TOKEN_TTL_HOURS).contains(&self.token_ttl_hours) {
            return Err(ConfigError::new(format!(
                "token_ttl_hours must be within 1..={}, got {}",
                MAX_TOKEN_TTL_HOURS, self.token_ttl_hours
            )));
        }
        if self.round_ttl_minutes > MAX_ROUND_TTL_MINUTES {
            return Err(ConfigError::new(format!(
                "round_ttl_minutes must be at most {}, got {}",
                MAX_ROUND_TTL_MINUTES, self.round_ttl_minutes
            )));
        }
        if self.pool_limit <= 0 {
            return Err(ConfigError::new("pool_limit must be positive".to_string()));
        }
        if self.jwt_secret == DEV_JWT_SECRET {
            warn!("Using the development JWT secret; set TRIVIA_JWT_SECRET in production");
        }
        Ok(())
    }

    /// `host:port` to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Settings applied to every new round.
    pub fn round_settings(&self) -> RoundSettings {
        RoundSettings::new(self.initial_hints, self.primary_locale)
    }

    /// Session token lifetime.
    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::try_hours(self.token_ttl_hours).unwrap_or(chrono::Duration::MAX)
    }

    /// Idle lifetime of a live round.
    pub fn round_ttl(&self) -> Duration {
        Duration::from_secs(self.round_ttl_minutes.saturating_mul(60))
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = TriviaConfig::from_toml("port = 8080\nprimary_locale = \"english\"\n")
            .expect("Parse failed");
        assert_eq!(*config.port(), 8080);
        assert_eq!(*config.primary_locale(), Locale::English);
        assert_eq!(*config.initial_hints(), 1);
        assert_eq!(config.db_path(), "strictly_trivia.db");
    }

    #[test]
    fn test_env_overrides() {
        let config = TriviaConfig::default()
            .with_env_overrides(|key| match key {
                "TRIVIA_JWT_SECRET" => Some("s3cret".to_string()),
                "PORT" => Some("9000".to_string()),
                _ => None,
            })
            .expect("Overrides failed");
        assert_eq!(config.jwt_secret(), "s3cret");
        assert_eq!(*config.port(), 9000);
        assert_eq!(config.db_path(), "strictly_trivia.db");
    }

    #[test]
    fn test_bad_port_is_rejected() {
        let result = TriviaConfig::default().with_env_overrides(|key| {
            (key == "PORT").then(|| "not-a-port".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_bad_cost() {
        let config = TriviaConfig::default().with_bcrypt_cost(2);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_bounds_lifetimes() {
        assert!(TriviaConfig::default().validate().is_ok());

        let config = TriviaConfig::default().with_token_ttl_hours(MAX_TOKEN_TTL_HOURS);
        assert!(config.validate().is_ok());
        let config = TriviaConfig::default().with_token_ttl_hours(i64::MAX);
        assert!(config.validate().is_err());
        let config = TriviaConfig::default().with_token_ttl_hours(0);
        assert!(config.validate().is_err());

        let config = TriviaConfig::default().with_round_ttl_minutes(MAX_ROUND_TTL_MINUTES + 1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_lifetime_accessors_do_not_overflow() {
        let config = TriviaConfig::default()
            .with_token_ttl_hours(i64::MAX)
            .with_round_ttl_minutes(u64::MAX);
        assert_eq!(config.token_ttl(), chrono::Duration::MAX);
        assert_eq!(config.round_ttl(), Duration::from_secs(u64::MAX));

        let config = TriviaConfig::default();
        assert_eq!(config.token_ttl(), chrono::Duration::hours(24));
        assert_eq!(config.round_ttl(), Duration::from_secs(3600));
    }

    #[test]
    fn test_oversized_token_ttl_in_toml_is_rejected() {
        let config = TriviaConfig::from_toml("token_ttl_hours = 9223372036854775807\n")
            .expect("Parse failed");
        assert!(config.validate().is_err());
    }
}
