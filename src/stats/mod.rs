//! Stats aggregation: folding finished rounds into per-user statistics.

mod badges;
mod user_stats;

pub use badges::{Achievement, achievements};
pub use user_stats::{RoundOutcome, UserStats};
