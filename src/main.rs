//! Strictly Trivia - Unified CLI

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use strictly_trivia::play::{self, LocalBackend, RestTriviaClient};
use strictly_trivia::{AppState, TriviaConfig, seed, server};
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,strictly_trivia=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = TriviaConfig::load(cli.config.as_deref())?;
    if let Some(db_path) = cli.db_path {
        config = config.with_db_path(db_path);
    }

    match cli.command {
        Command::Serve {
            host,
            port,
            static_dir,
        } => {
            if let Some(host) = host {
                config = config.with_host(host);
            }
            if let Some(port) = port {
                config = config.with_port(port);
            }
            if static_dir.is_some() {
                config = config.with_static_dir(static_dir);
            }
            info!("Starting Strictly Trivia server");
            server::serve(&config).await
        }
        Command::Seed { file } => run_seed(&config, file).await,
        Command::Play {
            server_url,
            username,
            creature_type,
        } => run_play(&config, server_url, username, creature_type).await,
    }
}

/// Imports a catalog dump.
#[instrument(skip(config), fields(file = %file.display()))]
async fn run_seed(config: &TriviaConfig, file: std::path::PathBuf) -> Result<()> {
    let state = AppState::from_config(config)?;
    let catalog = state.catalog().clone();
    let written = tokio::task::spawn_blocking(move || seed::seed_from_file(&catalog, &file))
        .await??;
    info!(written, "Catalog seeded");
    println!("Imported {} creatures into {}", written, config.db_path());
    Ok(())
}

/// Plays in the terminal, locally or against a server.
#[instrument(skip(config))]
async fn run_play(
    config: &TriviaConfig,
    server_url: Option<String>,
    username: Option<String>,
    creature_type: Option<String>,
) -> Result<()> {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();

    let summary = match server_url {
        Some(url) => {
            let mut client = RestTriviaClient::new(url, creature_type);
            if let Some(username) = username {
                let password = std::env::var("TRIVIA_PASSWORD")
                    .context("TRIVIA_PASSWORD must be set to log in")?;
                client.login(&username, &password).await?;
            } else {
                warn!("Playing anonymously, stats won't be recorded");
            }
            play::run_session(&mut client, stdin, &mut stdout).await?
        }
        None => {
            let state = AppState::from_config(config)?;
            let mut backend = LocalBackend::new(
                state.catalog().clone(),
                state.rounds().clone(),
                *state.pool_limit(),
                creature_type,
            );
            play::run_session(&mut backend, stdin, &mut stdout).await?
        }
    };

    println!(
        "\nThanks for playing: {} solved of {} rounds, {} points.",
        summary.rounds_solved(),
        summary.rounds_played(),
        summary.points()
    );
    Ok(())
}
