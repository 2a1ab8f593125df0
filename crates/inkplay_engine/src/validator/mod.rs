//! Board/turn validation.
//!
//! A photographed grid is untrusted. [`TurnValidator`] decides whether it is
//! a legal single-move successor of the last accepted board and, if so,
//! which cell changed. It owns the [`PlacementLedger`] of one game.

mod checks;
mod ledger;

pub use checks::{
    FilledCount, InitiallyEmpty, NewPlacement, PlacedSymbol, RejectReason, WellFormed,
};
pub use ledger::PlacementLedger;

use crate::position::Position;
use crate::types::{Board, Symbol};
use tracing::{debug, info, instrument, warn};

/// A rejected observation.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
#[display("turn {turn} rejected ({}): {reason}", reason.code())]
pub struct Rejection {
    /// Turn index the observation was checked against.
    pub turn: usize,
    /// Why it was rejected.
    pub reason: RejectReason,
}

impl std::error::Error for Rejection {}

impl Rejection {
    fn new(turn: usize, reason: RejectReason) -> Self {
        Self { turn, reason }
    }
}

/// An accepted observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceptedTurn {
    /// The cell that received the new mark.
    pub position: Position,
    /// The observed board, now the ground truth.
    pub board: Board,
}

/// Validates the photographs of one game.
#[derive(Debug, Clone, Default)]
pub struct TurnValidator {
    ledger: PlacementLedger,
}

impl TurnValidator {
    /// Creates a validator with an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// The cells confirmed so far.
    pub fn ledger(&self) -> &PlacementLedger {
        &self.ledger
    }

    /// Checks the photograph taken before the first move.
    #[instrument(skip(self, observed))]
    pub fn validate_initial(&self, observed: &[Vec<String>]) -> Result<Board, Rejection> {
        let board = WellFormed::check(observed).map_err(|r| Rejection::new(0, r))?;
        InitiallyEmpty::check(&board).map_err(|r| Rejection::new(0, r))?;
        info!("Blank sheet confirmed");
        Ok(board)
    }

    /// Checks the photograph taken after turn `turn_index`, when the mover's
    /// cell is unknown (a human turn).
    ///
    /// At turn 0 there is no move to find: a blank sheet still yields
    /// `no_move_found`, use [`Self::validate_initial`] instead.
    #[instrument(skip(self, previous, observed))]
    pub fn validate_turn(
        &mut self,
        previous: Option<&Board>,
        observed: &[Vec<String>],
        expected_symbol: Symbol,
        turn_index: usize,
    ) -> Result<AcceptedTurn, Rejection> {
        self.validate(previous, observed, expected_symbol, turn_index, None)
    }

    /// Checks the photograph taken after the machine drew at `position`.
    #[instrument(skip(self, previous, observed))]
    pub fn validate_placement(
        &mut self,
        previous: Option<&Board>,
        observed: &[Vec<String>],
        expected_symbol: Symbol,
        turn_index: usize,
        position: Position,
    ) -> Result<AcceptedTurn, Rejection> {
        self.validate(previous, observed, expected_symbol, turn_index, Some(position))
    }

    fn validate(
        &mut self,
        previous: Option<&Board>,
        observed: &[Vec<String>],
        expected_symbol: Symbol,
        turn_index: usize,
        expected_position: Option<Position>,
    ) -> Result<AcceptedTurn, Rejection> {
        let reject = |reason: RejectReason| {
            warn!(turn = turn_index, code = reason.code(), %reason, "Observation rejected");
            Rejection::new(turn_index, reason)
        };

        let board = WellFormed::check(observed).map_err(reject)?;
        if turn_index == 0 {
            InitiallyEmpty::check(&board).map_err(reject)?;
            return Err(reject(RejectReason::NoMoveFound {
                expected: expected_symbol,
            }));
        }

        // Staged so that a rejected observation leaves the ledger untouched.
        let mut staged = self.ledger.clone();
        if let Some(previous) = previous {
            staged.absorb(previous);
            for position in staged.positions() {
                if board.get(position) != previous.get(position) {
                    warn!(%position, "Confirmed cell reads differently than before");
                }
            }
        }

        let position = NewPlacement::locate(&board, &staged, expected_symbol, expected_position)
            .map_err(reject)?;
        FilledCount::check(&board, turn_index).map_err(reject)?;
        PlacedSymbol::check(&board, position, expected_symbol).map_err(reject)?;

        staged.record(position);
        self.ledger = staged;
        debug!(%position, board = %board, "Observation accepted");
        Ok(AcceptedTurn { position, board })
    }
}
