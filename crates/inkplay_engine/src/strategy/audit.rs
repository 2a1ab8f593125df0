//! Cross-checks the heuristic against the exhaustive search.

use super::heuristic::{HeuristicRule, HeuristicStrategy};
use super::minimax::MinimaxStrategy;
use crate::error::EngineError;
use crate::position::Position;
use crate::types::{Board, SymbolPair};
use tracing::{instrument, warn};

/// A board where the heuristic's move scores worse than the best move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Divergence {
    /// The board that was audited.
    pub board: Board,
    /// Move chosen by the heuristic.
    pub heuristic_move: Position,
    /// Rule that produced it.
    pub rule: HeuristicRule,
    /// Score of the heuristic's move.
    pub heuristic_score: i32,
    /// A move achieving the best score.
    pub best_move: Position,
    /// The best score.
    pub best_score: i32,
}

impl Divergence {
    /// Whether the heuristic's move turns a drawn or won position into a loss.
    pub fn loses(&self) -> bool {
        self.heuristic_score < 0 && self.best_score >= 0
    }
}

/// Audits the heuristic's choice on `board` against the exact scores.
///
/// Returns `None` when the heuristic picks a move of optimal score, even if
/// it differs from the one the search prefers.
#[instrument(skip(board, search), fields(board = %board))]
pub fn audit_heuristic(
    board: &Board,
    symbols: SymbolPair,
    search: &MinimaxStrategy,
) -> Result<Option<Divergence>, EngineError> {
    let (heuristic_move, rule) = HeuristicStrategy::new().choose(board, symbols)?;
    let scores = search.evaluate_moves(board, symbols)?;

    let best = scores
        .iter()
        .max_by_key(|m| m.score)
        .copied()
        .ok_or(EngineError::NoLegalMove)?;
    let heuristic_score = scores
        .iter()
        .find(|m| m.position == heuristic_move)
        .map(|m| m.score)
        .ok_or_else(|| {
            EngineError::IllegalState(format!("heuristic chose occupied cell {heuristic_move}"))
        })?;

    if heuristic_score >= best.score {
        return Ok(None);
    }

    let divergence = Divergence {
        board: *board,
        heuristic_move,
        rule,
        heuristic_score,
        best_move: best.position,
        best_score: best.score,
    };
    warn!(
        heuristic = %heuristic_move,
        %rule,
        heuristic_score,
        best = %best.position,
        best_score = best.score,
        "Heuristic move scores below the search"
    );
    Ok(Some(divergence))
}
