//! Inkplay - paper tic-tac-toe against a drawing robot
//!
//! The human draws on a sheet, a camera photographs it, a multimodal model
//! reads the grid and the engine referees. The robot's moves are chosen by
//! the engine and handed to a draw sink.
//!
//! # Architecture
//!
//! - **Config**: TOML game settings
//! - **Vision**: snapshot capture and model-based grid reading
//! - **Draw**: cell geometry and the draw sink
//! - **Gate**: knowing when the human is done
//! - **Game**: the turn loop, its state and errors
//! - **Simulation**: offline games on an in-memory sheet

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod draw;
mod game;
mod gate;
mod simulation;
mod vision;

// Crate-level exports - Configuration
pub use config::{CaptureConfig, ConfigError, DrawConfig, GameConfig, VisionConfig};

// Crate-level exports - Adapters
pub use draw::{CellRect, DrawError, DrawSink, GridGeometry, ManualDrawSink, Point, Strokes};
pub use gate::{ConfirmGate, DelayGate, OperatorConsole, TurnGate, human_gate};
pub use vision::{
    Frame, FrameSource, LlmVision, SYSTEM_PROMPT, VisionClient, VisionError, VisionProvider,
    VisionSource, grid_prompt, parse_grid_reply,
};

// Crate-level exports - Game loop
pub use game::{
    Collaborators, GameError, GameEvent, GameOutcome, GameState, Orchestrator, Participant,
    TurnStage,
};

// Crate-level exports - Simulation
pub use simulation::{
    OpponentKind, ScriptedCapture, SimulatedHuman, SimulatedTable, Tally, simulate, simulate_game,
};
