//! Win detection.

use crate::position::WIN_LINES;
use crate::types::{Board, Symbol};
use tracing::{instrument, warn};

/// Checks if `symbol` occupies a complete winning line.
pub fn has_won(board: &Board, symbol: Symbol) -> bool {
    let owned = board.mask(symbol);
    WIN_LINES
        .iter()
        .any(|line| owned & line.mask() == line.mask())
}

/// Returns the first symbol found holding a complete line, if any.
///
/// Use [`check_winner`] when a board with two winners must be noticed.
#[instrument]
pub fn winner(board: &Board) -> Option<Symbol> {
    [Symbol::X, Symbol::O]
        .into_iter()
        .find(|symbol| has_won(board, *symbol))
}

/// Result of checking both symbols for a win.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WinnerCheck {
    /// The first symbol holds a complete line.
    pub a_wins: bool,
    /// The second symbol holds a complete line.
    pub b_wins: bool,
}

impl WinnerCheck {
    /// Both symbols hold a line, which alternating play can never produce.
    pub fn is_conflicting(&self) -> bool {
        self.a_wins && self.b_wins
    }
}

/// Checks both symbols independently.
///
/// Each symbol's cells are collected as a set of positions and the symbol
/// wins when some line is a subset of that set. A conflicting result is
/// logged and returned as-is; no winner is picked.
#[instrument(skip(board))]
pub fn check_winner(board: &Board, a: Symbol, b: Symbol) -> WinnerCheck {
    let result = WinnerCheck {
        a_wins: has_won(board, a),
        b_wins: has_won(board, b),
    };
    if result.is_conflicting() {
        warn!(%a, %b, board = %board, "Both symbols hold a winning line");
    }
    result
}
