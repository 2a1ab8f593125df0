//! Threat and fork analysis.
//!
//! A threat for a player is a winning line holding two of that player's
//! symbols and one empty cell. A fork is a move that leaves two or more
//! threats at once.

use super::win::has_won;
use crate::position::{Position, WIN_LINES, WinLine};
use crate::types::{Board, Square, Symbol};

/// Lines currently threatened by `symbol`, in line order.
pub fn threat_lines(board: &Board, symbol: Symbol) -> Vec<WinLine> {
    WIN_LINES
        .iter()
        .copied()
        .filter(|line| {
            let cells = line.cells();
            let own = cells.iter().filter(|p| board.get(**p).holds(symbol)).count();
            let empty = cells
                .iter()
                .filter(|p| board.get(**p) == Square::Empty)
                .count();
            own == 2 && empty == 1
        })
        .collect()
}

/// Number of threats held by `symbol`.
pub fn count_threats(board: &Board, symbol: Symbol) -> usize {
    threat_lines(board, symbol).len()
}

/// The empty cells that complete each threat, without duplicates.
pub fn threat_cells(board: &Board, symbol: Symbol) -> Vec<Position> {
    let mut cells = Vec::new();
    for line in threat_lines(board, symbol) {
        for pos in line.cells() {
            if board.is_empty(pos) && !cells.contains(&pos) {
                cells.push(pos);
            }
        }
    }
    cells
}

/// Empty cells where `symbol` would complete three in a row, in `order`.
pub fn winning_moves_in(board: &Board, symbol: Symbol, order: &[Position]) -> Vec<Position> {
    board
        .empty_positions_in(order)
        .into_iter()
        .filter(|pos| has_won(&board.placed(*pos, symbol), symbol))
        .collect()
}

/// Empty cells where `symbol` would create a fork, in reading order.
pub fn fork_moves(board: &Board, symbol: Symbol) -> Vec<Position> {
    board
        .empty_positions()
        .into_iter()
        .filter(|pos| count_threats(&board.placed(*pos, symbol), symbol) >= 2)
        .collect()
}
