//! Inkplay engine - move selection and turn validation for paper tic-tac-toe
//!
//! The engine is pure and synchronous. It never touches a camera, a robot
//! or the network: the game runner hands it boards and it answers with
//! moves, verdicts and winners.
//!
//! # Architecture
//!
//! - **Board model**: positions 1-9, symbols, squares and the eight lines
//! - **Rules**: winner, draw and threat/fork analysis
//! - **Strategy**: exhaustive minimax search and a rule-priority heuristic
//! - **Validator**: reconciles a photographed grid against the last accepted board
//!
//! # Example
//!
//! ```
//! use inkplay_engine::{Board, MinimaxStrategy, Position, Strategy, Symbol, SymbolPair};
//!
//! let strategy = MinimaxStrategy::new();
//! let board = Board::from_notation("OO.|XX.|...").unwrap();
//! let position = strategy.best_move(&board, SymbolPair::for_ai(Symbol::O)).unwrap();
//! assert_eq!(position, Position::TopRight);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod position;
pub mod rules;
mod strategy;
mod types;
mod validator;

// Crate-level exports - Errors
pub use error::EngineError;

// Crate-level exports - Board model
pub use position::{Position, WIN_LINES, WinLine};
pub use types::{Board, BoardKey, RawGrid, Square, Symbol, SymbolPair};

// Crate-level exports - Rules
pub use rules::{WinnerCheck, check_winner, is_draw, is_full, winner};

// Crate-level exports - Strategy
pub use strategy::{
    Divergence, HeuristicRule, HeuristicStrategy, MinimaxStrategy, MoveScore, SearchCache,
    Strategy, StrategyKind, audit_heuristic, check_searchable,
};

// Crate-level exports - Validator
pub use validator::{AcceptedTurn, PlacementLedger, RejectReason, Rejection, TurnValidator};
