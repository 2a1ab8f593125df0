//! Move selection for the machine player.
//!
//! Two interchangeable strategies implement [`Strategy`]:
//!
//! - [`MinimaxStrategy`]: exhaustive alpha-beta search with a shared
//!   memoization cache. Authoritative: always returns a move of optimal score.
//! - [`HeuristicStrategy`]: fixed rule priorities (win, block, fork, ...).
//!   Never loses, but may pick a slower win than the search.

mod audit;
mod heuristic;
mod minimax;

pub use audit::{Divergence, audit_heuristic};
pub use heuristic::{HeuristicRule, HeuristicStrategy};
pub use minimax::{MinimaxStrategy, MoveScore, SearchCache};

use crate::error::EngineError;
use crate::position::Position;
use crate::rules::{is_full, winner};
use crate::types::{Board, SymbolPair};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

/// A policy choosing the machine's next move.
pub trait Strategy: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Returns the best next move for `symbols.ai()`.
    ///
    /// Fails with `MalformedBoard`/`IllegalState` when the board cannot be a
    /// game in progress and with `NoLegalMove` when it is full.
    fn best_move(&self, board: &Board, symbols: SymbolPair) -> Result<Position, EngineError>;
}

/// Which strategy to build.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StrategyKind {
    /// Exhaustive search.
    #[default]
    Minimax,
    /// Rule priorities.
    Heuristic,
}

impl StrategyKind {
    /// Builds the strategy; the minimax search memoizes into `cache`.
    pub fn build(self, cache: SearchCache) -> Box<dyn Strategy> {
        match self {
            StrategyKind::Minimax => Box::new(MinimaxStrategy::with_cache(cache)),
            StrategyKind::Heuristic => Box::new(HeuristicStrategy::new()),
        }
    }
}

/// Sanity checks run before any strategy searches a board.
///
/// Counts may differ by at most one (one side opened and play alternates),
/// the board must have no winner yet and must have a free square.
#[instrument(skip(board), fields(board = %board))]
pub fn check_searchable(board: &Board, symbols: SymbolPair) -> Result<(), EngineError> {
    let ai_count = board.count(symbols.ai());
    let human_count = board.count(symbols.human());
    if ai_count.abs_diff(human_count) > 1 {
        warn!(ai_count, human_count, "Symbol counts differ by more than one");
        return Err(EngineError::IllegalState(format!(
            "symbol counts differ by more than one ({}={ai_count}, {}={human_count})",
            symbols.ai(),
            symbols.human()
        )));
    }

    if let Some(symbol) = winner(board) {
        return Err(EngineError::IllegalState(format!(
            "game already won by {symbol}"
        )));
    }

    if is_full(board) {
        return Err(EngineError::NoLegalMove);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Symbol;
    use std::str::FromStr;

    #[test]
    fn test_strategy_kind_parses_lowercase() {
        assert_eq!(StrategyKind::from_str("heuristic"), Ok(StrategyKind::Heuristic));
        assert_eq!(StrategyKind::Minimax.to_string(), "minimax");
        assert!(StrategyKind::from_str("random").is_err());
    }

    #[test]
    fn test_won_board_is_not_searchable() {
        let board = Board::from_notation("XXX|OO.|...").unwrap();
        assert!(matches!(
            check_searchable(&board, SymbolPair::for_ai(Symbol::O)),
            Err(EngineError::IllegalState(_))
        ));
    }

    #[test]
    fn test_lopsided_counts_are_not_searchable() {
        let board = Board::from_notation("XX.|X..|...").unwrap();
        assert!(matches!(
            check_searchable(&board, SymbolPair::for_ai(Symbol::O)),
            Err(EngineError::IllegalState(_))
        ));
    }

    #[test]
    fn test_full_board_has_no_legal_move() {
        let board = Board::from_notation("XOX|OXX|OXO").unwrap();
        assert_eq!(
            check_searchable(&board, SymbolPair::for_ai(Symbol::O)),
            Err(EngineError::NoLegalMove)
        );
    }
}
