//! Where the terminal adapter sends its moves.

use anyhow::Result;
use async_trait::async_trait;

use crate::game::{GuessOutcome, HintOutcome, RoundId};
use crate::server::dto::{CompleteView, RoundView};

/// A source of rounds: the in-process engine or a remote server.
#[async_trait]
pub trait TriviaBackend: Send {
    /// Starts a new round.
    async fn start_round(&mut self) -> Result<RoundView>;

    /// Submits a guess.
    async fn guess(&mut self, round: RoundId, text: &str) -> Result<GuessOutcome>;

    /// Asks for one more fact.
    async fn hint(&mut self, round: RoundId) -> Result<HintOutcome>;

    /// Ends a round. Returns the updated stats when the backend records them.
    async fn finish(&mut self, round: RoundId) -> Result<Option<CompleteView>>;
}
