//! Exhaustive alpha-beta search with a memoization cache.
//!
//! Scores reported to callers use the depth-sensitive scale: a machine win
//! `depth` moves after its own move scores `10 - depth`, a human win scores
//! `depth - 10` and a draw scores `0`. Internally the search is a negamax
//! over scores that depend only on the final number of filled squares, so
//! a cached value is valid whatever position the search started from.

use super::{Strategy, check_searchable};
use crate::error::EngineError;
use crate::position::Position;
use crate::rules::{has_won, winner};
use crate::types::{Board, BoardKey, Symbol, SymbolPair};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, instrument};

/// Reported score of a win on the spot.
pub const WIN_SCORE: i32 = 10;

/// Internal win base: a win with `n` filled squares is worth `WIN_BASE - n`.
const WIN_BASE: i32 = 20;

/// Larger than any score.
const INFINITY: i32 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    board: BoardKey,
    to_move: Symbol,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Exact,
    Lower,
    Upper,
}

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    score: i32,
    bound: Bound,
}

/// Memoization table keyed by (board, player to move).
///
/// Cloning yields another handle to the same table, so one cache can serve
/// every game in a process while tests build isolated ones. Writes are
/// serialized by the inner mutex. The table is never evicted: the reachable
/// state space is a few thousand positions.
#[derive(Debug, Clone, Default)]
pub struct SearchCache {
    entries: Arc<Mutex<HashMap<CacheKey, CacheEntry>>>,
}

impl SearchCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of memoized positions.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing has been memoized yet.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.lock().get(key).copied()
    }

    fn insert(&self, key: CacheKey, entry: CacheEntry) {
        self.lock().insert(key, entry);
    }

    // A panic while holding the lock cannot leave a half-written entry.
    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Exact score of one candidate move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveScore {
    /// The candidate cell.
    pub position: Position,
    /// Depth-sensitive score from the machine's point of view.
    pub score: i32,
}

/// Authoritative move selection by exhaustive search.
#[derive(Debug, Clone, Default)]
pub struct MinimaxStrategy {
    cache: SearchCache,
}

impl MinimaxStrategy {
    /// Creates a strategy with its own empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a strategy memoizing into a shared cache.
    pub fn with_cache(cache: SearchCache) -> Self {
        Self { cache }
    }

    /// The cache handle.
    pub fn cache(&self) -> &SearchCache {
        &self.cache
    }

    /// Stores the exact value of every reachable unfinished position, for
    /// either opener, so that later searches never descend past the cache.
    #[instrument(skip(self))]
    pub fn warm_up(&self) {
        let mut seen = HashSet::new();
        for first in [Symbol::X, Symbol::O] {
            self.warm_from(&Board::new(), first, &mut seen);
        }
        info!(entries = self.cache.len(), "Search cache warmed up");
    }

    // A full window always yields an exact entry.
    fn warm_from(&self, board: &Board, to_move: Symbol, seen: &mut HashSet<CacheKey>) {
        if winner(board).is_some() || board.filled_count() == 9 {
            return;
        }
        let key = CacheKey {
            board: board.key(),
            to_move,
        };
        if !seen.insert(key) {
            return;
        }
        self.negamax(board, to_move, -INFINITY, INFINITY);
        for position in board.empty_positions_in(&Position::SEARCH_ORDER) {
            self.warm_from(&board.placed(position, to_move), to_move.opponent(), seen);
        }
    }

    /// Exact score of every legal move, in search order.
    #[instrument(skip(self, board), fields(board = %board))]
    pub fn evaluate_moves(
        &self,
        board: &Board,
        symbols: SymbolPair,
    ) -> Result<Vec<MoveScore>, EngineError> {
        check_searchable(board, symbols)?;
        let filled = board.filled_count();

        Ok(board
            .empty_positions_in(&Position::SEARCH_ORDER)
            .into_iter()
            .map(|position| {
                let child = board.placed(position, symbols.ai());
                let score = -self.negamax(&child, symbols.human(), -INFINITY, INFINITY);
                MoveScore {
                    position,
                    score: to_reported(score, filled),
                }
            })
            .collect())
    }

    /// Negamax with alpha-beta pruning over root-independent scores.
    ///
    /// Returns the value of `board` for `to_move`. The result is exact when
    /// it lies strictly inside `(alpha, beta)`, an upper bound when it is at
    /// most `alpha` and a lower bound when it is at least `beta`.
    fn negamax(&self, board: &Board, to_move: Symbol, mut alpha: i32, mut beta: i32) -> i32 {
        let key = CacheKey {
            board: board.key(),
            to_move,
        };
        let original_alpha = alpha;

        if let Some(entry) = self.cache.get(&key) {
            match entry.bound {
                Bound::Exact => return entry.score,
                Bound::Lower => alpha = alpha.max(entry.score),
                Bound::Upper => beta = beta.min(entry.score),
            }
            if alpha >= beta {
                return entry.score;
            }
        }

        let filled = board.filled_count() as i32;
        if winner(board).is_some() {
            // The previous mover completed a line.
            return -(WIN_BASE - filled);
        }
        if filled == 9 {
            return 0;
        }

        let mut best = -INFINITY;
        for position in board.empty_positions_in(&Position::SEARCH_ORDER) {
            let child = board.placed(position, to_move);
            let score = -self.negamax(&child, to_move.opponent(), -beta, -alpha);
            best = best.max(score);
            alpha = alpha.max(score);
            if alpha >= beta {
                break;
            }
        }

        let bound = if best <= original_alpha {
            Bound::Upper
        } else if best >= beta {
            Bound::Lower
        } else {
            Bound::Exact
        };
        self.cache.insert(key, CacheEntry { score: best, bound });
        best
    }
}

impl Strategy for MinimaxStrategy {
    fn name(&self) -> &'static str {
        "minimax"
    }

    #[instrument(skip(self, board), fields(board = %board, ai = %symbols.ai()))]
    fn best_move(&self, board: &Board, symbols: SymbolPair) -> Result<Position, EngineError> {
        check_searchable(board, symbols)?;

        // A win on the spot, or the block of one, dominates anything deeper.
        for symbol in [symbols.ai(), symbols.human()] {
            if let Some(position) = immediate_win(board, symbol) {
                debug!(%position, %symbol, "Immediate line completion");
                return Ok(position);
            }
        }

        let mut alpha = -INFINITY;
        let mut best: Option<(Position, i32)> = None;
        for position in board.empty_positions_in(&Position::SEARCH_ORDER) {
            let child = board.placed(position, symbols.ai());
            let score = -self.negamax(&child, symbols.human(), -INFINITY, -alpha);
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((position, score));
            }
            alpha = alpha.max(score);
        }

        let (position, score) = best.ok_or(EngineError::NoLegalMove)?;
        debug!(
            %position,
            score = to_reported(score, board.filled_count()),
            cached = self.cache.len(),
            "Search complete"
        );
        Ok(position)
    }
}

/// First empty cell, in search order, completing a line for `symbol`.
fn immediate_win(board: &Board, symbol: Symbol) -> Option<Position> {
    board
        .empty_positions_in(&Position::SEARCH_ORDER)
        .into_iter()
        .find(|position| has_won(&board.placed(*position, symbol), symbol))
}

/// Converts an internal score of a move made on a board with `filled`
/// squares into the depth-sensitive reported scale.
fn to_reported(score: i32, filled: usize) -> i32 {
    let shift = 9 - filled as i32;
    match score {
        s if s > 0 => s - shift,
        s if s < 0 => s + shift,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ai_o() -> SymbolPair {
        SymbolPair::for_ai(Symbol::O)
    }

    #[test]
    fn test_empty_board_takes_center() {
        let strategy = MinimaxStrategy::new();
        let board = Board::new();
        assert_eq!(strategy.best_move(&board, ai_o()), Ok(Position::Center));
    }

    #[test]
    fn test_completes_own_row() {
        let strategy = MinimaxStrategy::new();
        let board = Board::from_notation("OO.|XX.|...").unwrap();
        assert_eq!(strategy.best_move(&board, ai_o()), Ok(Position::TopRight));
    }

    #[test]
    fn test_blocks_diagonal() {
        let strategy = MinimaxStrategy::new();
        let board = Board::from_notation("XO.|.X.|...").unwrap();
        assert_eq!(strategy.best_move(&board, ai_o()), Ok(Position::BottomRight));
    }

    #[test]
    fn test_immediate_win_scores_ten() {
        let strategy = MinimaxStrategy::new();
        let board = Board::from_notation("OO.|XX.|X..").unwrap();
        let scores = strategy.evaluate_moves(&board, ai_o()).unwrap();
        let win = scores
            .iter()
            .find(|m| m.position == Position::TopRight)
            .unwrap();
        assert_eq!(win.score, WIN_SCORE);
    }

    #[test]
    fn test_unblocked_threat_scores_a_loss_one_move_later() {
        let strategy = MinimaxStrategy::new();
        // X threatens the middle row; any O move other than 6 loses at once.
        let board = Board::from_notation("O..|XX.|...").unwrap();
        let scores = strategy.evaluate_moves(&board, ai_o()).unwrap();
        for m in scores {
            if m.position == Position::MiddleRight {
                assert!(m.score >= 0, "block scored {}", m.score);
            } else {
                assert_eq!(m.score, 1 - WIN_SCORE, "{}", m.position);
            }
        }
    }

    #[test]
    fn test_cache_is_shared_between_handles() {
        let cache = SearchCache::new();
        let first = MinimaxStrategy::with_cache(cache.clone());
        first.best_move(&Board::new(), ai_o()).unwrap();
        assert!(!cache.is_empty());

        let second = MinimaxStrategy::with_cache(cache.clone());
        assert_eq!(second.cache().len(), cache.len());
        cache.clear();
        assert!(first.cache().is_empty());
    }

    /// Every unfinished position reachable from a blank sheet.
    fn reachable(board: &Board, to_move: Symbol, out: &mut Vec<(Board, Symbol)>) {
        if winner(board).is_some() || board.filled_count() == 9 {
            return;
        }
        out.push((*board, to_move));
        for position in board.empty_positions_in(&Position::SEARCH_ORDER) {
            reachable(&board.placed(position, to_move), to_move.opponent(), out);
        }
    }

    #[test]
    fn test_warm_up_answers_every_later_search_from_cache() {
        let strategy = MinimaxStrategy::new();
        strategy.warm_up();
        let warmed = strategy.cache().len();
        assert!(
            strategy
                .cache()
                .lock()
                .values()
                .all(|entry| entry.bound == Bound::Exact)
        );

        let mut positions = Vec::new();
        for first in [Symbol::X, Symbol::O] {
            reachable(&Board::new(), first, &mut positions);
        }
        for (board, to_move) in &positions {
            let symbols = SymbolPair::for_ai(*to_move);
            strategy.evaluate_moves(board, symbols).unwrap();
            strategy.best_move(board, symbols).unwrap();
        }
        assert_eq!(strategy.cache().len(), warmed);

        // Warming again finds nothing new.
        strategy.warm_up();
        assert_eq!(strategy.cache().len(), warmed);
    }

    #[test]
    fn test_reported_scale() {
        // Win completed by the machine's own move on a board with 4 squares.
        assert_eq!(to_reported(WIN_BASE - 5, 4), WIN_SCORE);
        // Loss on the reply after that move.
        assert_eq!(to_reported(-(WIN_BASE - 6), 4), 1 - WIN_SCORE);
        assert_eq!(to_reported(0, 7), 0);
    }
}
