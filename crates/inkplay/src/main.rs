//! Inkplay - Unified CLI
//!
//! Plays paper tic-tac-toe for real, or offline against a simulated human.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use inkplay::{
    Collaborators, GameConfig, GameEvent, GridGeometry, LlmVision, ManualDrawSink, OperatorConsole,
    OpponentKind, Orchestrator, Participant, human_gate, simulate,
};
use inkplay_engine::{
    Board, HeuristicStrategy, MinimaxStrategy, SearchCache, Strategy, StrategyKind, Symbol,
    SymbolPair, audit_heuristic,
};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Play { config } => run_play(config).await,
        Command::BestMove {
            board,
            ai,
            strategy,
        } => run_best_move(&board, ai, strategy),
        Command::Simulate {
            games,
            opponent,
            seed,
            strategy,
            human_first,
        } => run_simulate(games, opponent, seed, strategy, human_first).await,
        Command::CheckConfig { config } => run_check_config(config),
    }
}

fn init_tracing(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();
}

/// Run a real game with the camera and a drawing operator
async fn run_play(config_path: PathBuf) -> Result<()> {
    init_tracing("info");

    let config = GameConfig::from_file(&config_path)?;
    let cache = SearchCache::new();
    if *config.strategy() == StrategyKind::Minimax {
        MinimaxStrategy::with_cache(cache.clone()).warm_up();
    }
    let strategy = config.strategy().build(cache);

    let vision = LlmVision::from_config(&config)?;
    let console = OperatorConsole::new(
        BufReader::new(tokio::io::stdin()).lines(),
        tokio::io::stdout(),
    );
    let sink = ManualDrawSink::new(GridGeometry::new(*config.draw()), console.clone());
    let gate = human_gate(&config, console);
    let collaborators = Collaborators {
        vision: Box::new(vision),
        sink: Box::new(sink),
        gate,
    };

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            print_event(&event);
        }
    });

    let mut orchestrator = Orchestrator::new(config, strategy, collaborators, event_tx);
    let result = orchestrator.run().await;
    drop(orchestrator);
    printer.await?;

    let outcome = result?;
    println!("Result: {}", outcome);
    Ok(())
}

fn print_event(event: &GameEvent) {
    match event {
        GameEvent::TurnStarted { turn, mover } => println!("Turn {}: {} to move", turn, mover),
        GameEvent::RobotMoveChosen { position, symbol } => {
            println!("Robot plays {} at cell {}", symbol, position)
        }
        GameEvent::MoveAccepted { board, .. } => println!("{}", board),
        GameEvent::CaptureRetried {
            attempt, reason, ..
        } => println!("Capture attempt {} failed ({}), retrying", attempt, reason),
        GameEvent::GameOver { outcome } => println!("Game over: {}", outcome),
    }
}

/// Print the robot's move for one board
fn run_best_move(notation: &str, ai: Symbol, strategy: StrategyKind) -> Result<()> {
    init_tracing("warn");

    let board = Board::from_notation(notation)?;
    let symbols = SymbolPair::for_ai(ai);
    let minimax = MinimaxStrategy::new();
    println!("{}", board);

    match strategy {
        StrategyKind::Minimax => {
            let position = minimax.best_move(&board, symbols)?;
            println!("Best move for {}: cell {}", ai, position);
            for scored in minimax.evaluate_moves(&board, symbols)? {
                println!("  cell {} scores {}", scored.position, scored.score);
            }
        }
        StrategyKind::Heuristic => {
            let (position, rule) = HeuristicStrategy::new().choose(&board, symbols)?;
            println!("Best move for {}: cell {} ({})", ai, position, rule);
            if let Some(divergence) = audit_heuristic(&board, symbols, &minimax)? {
                println!(
                    "  minimax prefers cell {} (score {} vs {})",
                    divergence.best_move, divergence.best_score, divergence.heuristic_score
                );
            }
        }
    }
    Ok(())
}

/// Play offline games and print the tally
async fn run_simulate(
    games: usize,
    opponent: OpponentKind,
    seed: u64,
    strategy: StrategyKind,
    human_first: bool,
) -> Result<()> {
    init_tracing("warn");

    let first = if human_first {
        Participant::Human
    } else {
        Participant::Robot
    };
    let config = GameConfig::default()
        .with_strategy(strategy)
        .with_first_player(first)
        .with_settle_delay_ms(0);

    let cache = SearchCache::new();
    MinimaxStrategy::with_cache(cache.clone()).warm_up();
    info!(games, %opponent, %strategy, "Simulating");

    let tally = simulate(&config, opponent, games, seed, cache).await;
    println!("{}", tally);
    Ok(())
}

/// Load a configuration and print it with defaults filled in
fn run_check_config(config_path: PathBuf) -> Result<()> {
    init_tracing("info");

    let config = GameConfig::from_file(&config_path)?;
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}
