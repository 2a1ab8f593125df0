//! Game state owned by the loop.

use super::GameError;
use inkplay_engine::{AcceptedTurn, Board, Symbol, SymbolPair};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// One of the two sides at the table.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Participant {
    /// The person drawing on paper.
    Human,
    /// The drawing machine.
    Robot,
}

impl Participant {
    /// The other side.
    pub fn other(self) -> Self {
        match self {
            Participant::Human => Participant::Robot,
            Participant::Robot => Participant::Human,
        }
    }
}

/// How a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GameOutcome {
    /// The human completed a line.
    HumanWin,
    /// The robot completed a line.
    RobotWin,
    /// The sheet filled with no line.
    Draw,
    /// An error ended the game.
    Aborted,
}

/// Board, side to move, turn counter and outcome.
///
/// Mutated once per accepted turn; frozen once an outcome is set.
#[derive(Debug, Clone)]
pub struct GameState {
    board: Board,
    to_move: Participant,
    turn: usize,
    outcome: Option<GameOutcome>,
    symbols: SymbolPair,
}

impl GameState {
    /// A blank game.
    pub fn new(first_player: Participant, symbols: SymbolPair) -> Self {
        Self {
            board: Board::new(),
            to_move: first_player,
            turn: 0,
            outcome: None,
            symbols,
        }
    }

    /// Last accepted board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Side to move next.
    pub fn to_move(&self) -> Participant {
        self.to_move
    }

    /// Number of accepted turns.
    pub fn turn(&self) -> usize {
        self.turn
    }

    /// Outcome, once decided.
    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    /// Whether an outcome is set.
    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Symbols of robot and human.
    pub fn symbols(&self) -> SymbolPair {
        self.symbols
    }

    /// Symbol drawn by `participant`.
    pub fn symbol_of(&self, participant: Participant) -> Symbol {
        match participant {
            Participant::Human => self.symbols.human(),
            Participant::Robot => self.symbols.ai(),
        }
    }

    /// Adopts an accepted observation and passes the move.
    pub fn apply(&mut self, accepted: &AcceptedTurn) -> Result<(), GameError> {
        if self.is_over() {
            return Err(GameError::Frozen);
        }
        self.board = accepted.board;
        self.turn += 1;
        debug!(turn = self.turn, mover = %self.to_move, position = %accepted.position, "Turn applied");
        self.to_move = self.to_move.other();
        Ok(())
    }

    /// Records the result.
    pub fn finish(&mut self, outcome: GameOutcome) -> Result<(), GameError> {
        if self.is_over() {
            return Err(GameError::Frozen);
        }
        info!(%outcome, turn = self.turn, "Game finished");
        self.outcome = Some(outcome);
        Ok(())
    }

    /// Marks the game aborted unless it already ended.
    pub fn abort(&mut self) {
        if self.outcome.is_none() {
            self.outcome = Some(GameOutcome::Aborted);
        }
    }
}
