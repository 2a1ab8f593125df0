//! The individual gates an observed board must pass, in order.
//!
//! Each gate is a unit struct with a `check` function returning the reason
//! for rejection on failure. [`super::TurnValidator`] composes them and
//! stops at the first failure.

use super::ledger::PlacementLedger;
use crate::position::Position;
use crate::types::{Board, Square, Symbol};
use tracing::{instrument, warn};

/// Why an observation was rejected.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum RejectReason {
    /// The grid is not 3x3 or holds an unknown symbol.
    #[display("the photographed grid could not be read as a board: {}", _0)]
    Malformed(String),

    /// The sheet was not blank before the first move.
    #[display("the sheet must be blank before the game starts, found {filled} marks")]
    NotEmpty {
        /// Marks found on the sheet.
        filled: usize,
    },

    /// No unconfirmed cell holds the symbol that should have been placed.
    #[display("no new {expected} was found on the sheet")]
    NoMoveFound {
        /// Symbol that should have appeared.
        expected: Symbol,
    },

    /// The sheet holds more or fewer marks than turns played.
    #[display("expected {expected} marks on the sheet, found {found}")]
    CountMismatch {
        /// Marks that should be on the sheet.
        expected: usize,
        /// Marks actually found.
        found: usize,
    },

    /// The new cell holds the opponent's symbol.
    #[display("cell {position} holds {found}, which is the wrong player's symbol")]
    WrongSymbol {
        /// The new cell.
        position: Position,
        /// Symbol found there.
        found: Symbol,
    },
}

impl RejectReason {
    /// Stable snake_case code for tests and messages.
    pub fn code(&self) -> &'static str {
        match self {
            RejectReason::Malformed(_) => "malformed",
            RejectReason::NotEmpty { .. } => "not_empty",
            RejectReason::NoMoveFound { .. } => "no_move_found",
            RejectReason::CountMismatch { .. } => "count_mismatch",
            RejectReason::WrongSymbol { .. } => "wrong_symbol",
        }
    }

    /// True when the observation implies a broken rule rather than a misread.
    pub fn is_rules_violation(&self) -> bool {
        matches!(self, RejectReason::WrongSymbol { .. })
    }
}

/// Gate 1: the observation parses as a board.
pub struct WellFormed;

impl WellFormed {
    #[instrument(skip(grid))]
    pub fn check(grid: &[Vec<String>]) -> Result<Board, RejectReason> {
        Board::parse_grid(grid).map_err(|e| RejectReason::Malformed(e.to_string()))
    }
}

/// Gate 2: the sheet is blank before turn 1.
pub struct InitiallyEmpty;

impl InitiallyEmpty {
    #[instrument(skip(board))]
    pub fn check(board: &Board) -> Result<(), RejectReason> {
        match board.filled_count() {
            0 => Ok(()),
            filled => Err(RejectReason::NotEmpty { filled }),
        }
    }
}

/// Gate 3: locates the newly placed cell. The ledger is only read here.
pub struct NewPlacement;

impl NewPlacement {
    /// With an `expected` position only that cell is a candidate; otherwise
    /// the first unconfirmed cell, in reading order, holding `symbol`.
    #[instrument(skip(board, ledger))]
    pub fn locate(
        board: &Board,
        ledger: &PlacementLedger,
        symbol: Symbol,
        expected: Option<Position>,
    ) -> Result<Position, RejectReason> {
        let found = match expected {
            Some(position) => {
                (!ledger.contains(position) && !board.is_empty(position)).then_some(position)
            }
            None => Position::ALL
                .into_iter()
                .find(|p| !ledger.contains(*p) && board.get(*p).holds(symbol)),
        };

        found.ok_or(RejectReason::NoMoveFound { expected: symbol })
    }
}

/// Gate 4: one mark per completed turn.
pub struct FilledCount;

impl FilledCount {
    #[instrument(skip(board))]
    pub fn check(board: &Board, expected: usize) -> Result<(), RejectReason> {
        let found = board.filled_count();
        if found == expected {
            Ok(())
        } else {
            Err(RejectReason::CountMismatch { expected, found })
        }
    }
}

/// Gate 5: the new cell holds the symbol that should have been placed.
pub struct PlacedSymbol;

impl PlacedSymbol {
    #[instrument(skip(board))]
    pub fn check(board: &Board, position: Position, expected: Symbol) -> Result<(), RejectReason> {
        match board.get(position) {
            Square::Occupied(found) if found != expected => {
                warn!(%position, %found, %expected, "Opponent's symbol in the new cell");
                Err(RejectReason::WrongSymbol { position, found })
            }
            Square::Occupied(_) => Ok(()),
            // The locator only returns filled cells.
            Square::Empty => Err(RejectReason::NoMoveFound { expected }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        let reasons = [
            RejectReason::Malformed("x".into()),
            RejectReason::NotEmpty { filled: 1 },
            RejectReason::NoMoveFound { expected: Symbol::X },
            RejectReason::CountMismatch {
                expected: 1,
                found: 2,
            },
            RejectReason::WrongSymbol {
                position: Position::Center,
                found: Symbol::O,
            },
        ];
        let codes: Vec<_> = reasons.iter().map(RejectReason::code).collect();
        assert_eq!(
            codes,
            vec![
                "malformed",
                "not_empty",
                "no_move_found",
                "count_mismatch",
                "wrong_symbol"
            ]
        );
        assert_eq!(
            reasons.iter().filter(|r| r.is_rules_violation()).count(),
            1
        );
    }

    #[test]
    fn test_locate_skips_ledger_cells() {
        let board = Board::from_notation("X..|.X.|...").unwrap();
        let mut ledger = PlacementLedger::new();
        ledger.record(Position::TopLeft);
        assert_eq!(
            NewPlacement::locate(&board, &ledger, Symbol::X, None),
            Ok(Position::Center)
        );
        assert!(!ledger.contains(Position::Center));

        ledger.record(Position::Center);
        assert_eq!(
            NewPlacement::locate(&board, &ledger, Symbol::X, None),
            Err(RejectReason::NoMoveFound { expected: Symbol::X })
        );
    }

    #[test]
    fn test_locate_expected_position_ignores_symbol() {
        let board = Board::from_notation("...|.O.|...").unwrap();
        let ledger = PlacementLedger::new();
        assert_eq!(
            NewPlacement::locate(&board, &ledger, Symbol::X, Some(Position::Center)),
            Ok(Position::Center)
        );
    }

    #[test]
    fn test_wrong_symbol_display() {
        let reason = RejectReason::WrongSymbol {
            position: Position::Center,
            found: Symbol::O,
        };
        assert_eq!(
            reason.to_string(),
            "cell 5 (Center) holds O, which is the wrong player's symbol"
        );
    }
}
