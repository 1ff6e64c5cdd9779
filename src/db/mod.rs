//! Database persistence layer for the catalog, accounts and user statistics.

mod error;
mod models;
mod repository;
mod schema;

pub use error::DbError;
pub use models::{CreatureRow, NewUser, StatsRow, User};
pub use repository::{MIGRATIONS, TriviaRepository};
