//! Command-line interface for inkplay.

use clap::{Parser, Subcommand};
use inkplay::OpponentKind;
use inkplay_engine::{StrategyKind, Symbol};
use std::path::PathBuf;

/// Inkplay - tic-tac-toe on paper against a drawing robot
#[derive(Parser, Debug)]
#[command(name = "inkplay")]
#[command(about = "Paper tic-tac-toe refereed from photographs", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play a real game: camera, vision model and drawing operator
    Play {
        /// Path to the game configuration
        #[arg(short, long, default_value = "inkplay.toml")]
        config: PathBuf,
    },

    /// Print the robot's move for a board
    BestMove {
        /// Board in compact notation, e.g. "XO.|.X.|..."
        #[arg(short, long)]
        board: String,

        /// Symbol the robot plays
        #[arg(long, default_value = "o")]
        ai: Symbol,

        /// Move selection policy
        #[arg(long, default_value = "minimax")]
        strategy: StrategyKind,
    },

    /// Play offline games against a simulated human
    Simulate {
        /// Number of games
        #[arg(short, long, default_value = "100")]
        games: usize,

        /// Simulated human's policy (random or perfect)
        #[arg(long, default_value = "random")]
        opponent: OpponentKind,

        /// Seed of the first game
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Move selection policy of the robot
        #[arg(long, default_value = "minimax")]
        strategy: StrategyKind,

        /// Let the human open instead of the robot
        #[arg(long)]
        human_first: bool,
    },

    /// Load a configuration file and print it with defaults filled in
    CheckConfig {
        /// Path to the game configuration
        #[arg(short, long, default_value = "inkplay.toml")]
        config: PathBuf,
    },
}
