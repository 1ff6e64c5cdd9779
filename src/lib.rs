//! Strictly Trivia: a name-that-creature guessing game.
//!
//! # Architecture
//!
//! - **Game**: round controller (typestate phases), hint scheduler and the
//!   live round manager
//! - **Stats**: pure fold of round outcomes into per-user stats, plus
//!   achievements
//! - **Catalog / DB**: creature reference data, accounts and stats in SQLite
//! - **Server**: REST API with bearer-token auth
//! - **Play**: terminal adapter, in-process or against a server
//!
//! # Example
//!
//! ```no_run
//! use strictly_trivia::{RoundInProgress, RoundSettings};
//! # fn example(pool: Vec<strictly_trivia::Creature>) -> Result<(), strictly_trivia::RoundError> {
//! let round = RoundInProgress::start(&pool, &RoundSettings::default(), &mut rand::rng())?;
//! println!("{} facts visible", round.reveal_fraction());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod auth;
pub mod catalog;
pub mod catalog_service;
pub mod config;
pub mod db;
pub mod game;
pub mod play;
pub mod profile_service;
pub mod seed;
pub mod server;
pub mod stats;

// Crate-level exports - domain
pub use catalog::{Creature, CreatureFilter, CreatureQuery, Locale, Page, PageMeta};
pub use game::{
    AnyRound, FACT_COUNT, Fact, FactKind, GuessOutcome, GuessResult, HintOutcome, RoundError,
    RoundId, RoundInProgress, RoundManager, RoundSettings, RoundSolved,
};
pub use stats::{Achievement, RoundOutcome, UserStats};

// Crate-level exports - services and infrastructure
pub use catalog_service::{CatalogError, CatalogService};
pub use config::{ConfigError, TriviaConfig};
pub use db::{DbError, TriviaRepository};
pub use profile_service::{Profile, ProfileError, ProfileService};
pub use server::{AppState, create_router};
