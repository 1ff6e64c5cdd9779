//! Terminal adapter: reads guesses line by line and prints rounds as text.

mod backend;
mod local;
pub mod render;
mod rest_client;

pub use backend::TriviaBackend;
pub use local::LocalBackend;
pub use rest_client::RestTriviaClient;

use anyhow::Result;
use derive_getters::Getters;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, instrument};

use crate::game::{GuessOutcome, RoundId};
use render::{PlayerCommand, parse_command};

/// Totals for one terminal session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Getters)]
pub struct PlaySummary {
    rounds_played: u32,
    rounds_solved: u32,
    points: i32,
}

async fn say<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> Result<()> {
    output.write_all(text.as_bytes()).await?;
    output.flush().await?;
    Ok(())
}

/// Plays rounds until the player quits or input ends.
#[instrument(skip_all)]
pub async fn run_session<B, R, W>(backend: &mut B, input: R, output: &mut W) -> Result<PlaySummary>
where
    B: TriviaBackend + ?Sized,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut summary = PlaySummary::default();

    loop {
        let round = backend.start_round().await?;
        summary.rounds_played += 1;
        say(output, &render::render_round_start(&round)).await?;

        loop {
            say(output, "> ").await?;
            let Some(line) = lines.next_line().await? else {
                debug!("Input closed");
                finish(backend, round.id, output).await?;
                info!(?summary, "Session over");
                return Ok(summary);
            };
            let Some(command) = parse_command(&line) else {
                continue;
            };

            match command {
                PlayerCommand::Quit => {
                    finish(backend, round.id, output).await?;
                    info!(?summary, "Session over");
                    return Ok(summary);
                }
                PlayerCommand::Next => {
                    say(output, "Skipping this one.\n").await?;
                    finish(backend, round.id, output).await?;
                    break;
                }
                PlayerCommand::Hint => {
                    let outcome = backend.hint(round.id).await?;
                    say(output, &render::render_hint(&outcome)).await?;
                }
                PlayerCommand::Guess(text) => {
                    let outcome = backend.guess(round.id, &text).await?;
                    say(output, &render::render_guess(&outcome)).await?;
                    if let GuessOutcome::Correct { points, .. } = outcome {
                        summary.rounds_solved += 1;
                        summary.points += points;
                        finish(backend, round.id, output).await?;
                        break;
                    }
                }
            }
        }
    }
}

async fn finish<B, W>(backend: &mut B, round: RoundId, output: &mut W) -> Result<()>
where
    B: TriviaBackend + ?Sized,
    W: AsyncWrite + Unpin,
{
    if let Some(view) = backend.finish(round).await? {
        say(output, &render::render_complete(&view)).await?;
    }
    Ok(())
}
