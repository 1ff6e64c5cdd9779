//! Plain-text rendering of rounds for the terminal.

use crate::game::{Fact, GuessOutcome, HintOutcome};
use crate::server::dto::{CompleteView, RoundView};

/// What the player typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerCommand {
    /// Reveal one more fact.
    Hint,
    /// Give up on this round and start another.
    Next,
    /// Leave.
    Quit,
    /// A guess.
    Guess(String),
}

/// Parses one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Option<PlayerCommand> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(match trimmed.to_lowercase().as_str() {
        "hint" | "/hint" => PlayerCommand::Hint,
        "next" | "/next" | "skip" => PlayerCommand::Next,
        "quit" | "/quit" | "exit" => PlayerCommand::Quit,
        _ => PlayerCommand::Guess(trimmed.to_string()),
    })
}

/// Numbered list of facts.
pub fn render_facts(facts: &[Fact]) -> String {
    facts
        .iter()
        .enumerate()
        .map(|(i, fact)| format!("  {}. {}\n", i + 1, fact.text()))
        .collect()
}

/// Banner shown when a round starts.
pub fn render_round_start(view: &RoundView) -> String {
    format!(
        "\nWho's that creature? ({} facts revealed)\n{}Type a name, or 'hint', 'next', 'quit'.\n",
        view.reveal,
        render_facts(&view.facts)
    )
}

/// Reaction to a guess.
pub fn render_guess(outcome: &GuessOutcome) -> String {
    match outcome {
        GuessOutcome::Correct {
            points,
            attempts,
            answer,
        } => {
            let tries = if *attempts == 1 { "try" } else { "tries" };
            format!(
                "Correct! It was {}. +{} points in {} {}.\n",
                answer, points, attempts, tries
            )
        }
        GuessOutcome::Incorrect { reveal, facts, .. } => format!(
            "Not quite. Here's what you know ({}):\n{}",
            reveal,
            render_facts(facts)
        ),
    }
}

/// Reaction to a hint request.
pub fn render_hint(outcome: &HintOutcome) -> String {
    match outcome {
        HintOutcome::Revealed { facts } => format!("New fact unlocked:\n{}", render_facts(facts)),
        HintOutcome::NoMoreHints => "No more hints, every fact is on the table.\n".to_string(),
        HintOutcome::AlreadySolved => "This round is already solved.\n".to_string(),
    }
}

/// Stats summary after a recorded round.
pub fn render_complete(view: &CompleteView) -> String {
    let stats = &view.game_stats;
    let mut text = format!(
        "Score {} | streak {} (best {}) | win rate {}%\n",
        stats.total_score(),
        stats.streak_correct(),
        stats.best_streak(),
        stats.winrate()
    );
    if !view.achievements.is_empty() {
        let titles: Vec<&str> = view.achievements.iter().map(|a| a.title.as_str()).collect();
        text.push_str(&format!("Achievements: {}\n", titles.join(", ")));
    }
    text
}
