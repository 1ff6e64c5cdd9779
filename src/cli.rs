//! Command-line interface for strictly_trivia.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Strictly Trivia - name the creature from its facts
#[derive(Parser, Debug)]
#[command(name = "strictly_trivia")]
#[command(about = "Creature trivia game server and terminal client", long_about = None)]
#[command(version)]
pub struct Cli {
    /// TOML config file (defaults to ./trivia.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database file, overriding config and environment
    #[arg(long, global = true)]
    pub db_path: Option<String>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the REST API server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory of static frontend files to serve
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Import creatures from a JSON dump into the catalog
    Seed {
        /// JSON file holding an array of creatures
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Play in the terminal
    Play {
        /// Server URL. If not provided, plays against the local database.
        #[arg(long)]
        server_url: Option<String>,

        /// Account to record stats for (password from TRIVIA_PASSWORD)
        #[arg(long, requires = "server_url")]
        username: Option<String>,

        /// Only draw creatures of this type
        #[arg(long = "type")]
        creature_type: Option<String>,
    },
}
