//! Rule-priority move selection.

use super::{Strategy, check_searchable};
use crate::error::EngineError;
use crate::position::Position;
use crate::rules::{count_threats, fork_moves, threat_cells, winning_moves_in};
use crate::types::{Board, Symbol, SymbolPair};
use tracing::{debug, instrument};

/// The priority rule that produced a heuristic move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum HeuristicRule {
    /// Completes the machine's line.
    #[display("win")]
    Win,
    /// Blocks the human's line.
    #[display("block")]
    Block,
    /// Creates two threats at once.
    #[display("fork")]
    Fork,
    /// Occupies the human's only fork cell.
    #[display("block-fork")]
    BlockFork,
    /// Forces a block that leaves the human without a fork.
    #[display("forcing-threat")]
    ForcingThreat,
    /// Takes the center.
    #[display("center")]
    Center,
    /// Answers a human corner with the opposite one.
    #[display("opposite-corner")]
    OppositeCorner,
    /// Any free corner.
    #[display("corner")]
    Corner,
    /// Any free edge.
    #[display("edge")]
    Edge,
}

/// Fixed priorities: win, block, fork, deny forks, center, opposite corner,
/// corner, edge.
///
/// Every candidate is evaluated on a copied board, so no rule can leave a
/// hypothetical mark behind.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicStrategy;

impl HeuristicStrategy {
    /// Creates the strategy.
    pub fn new() -> Self {
        Self
    }

    /// Chooses a move and reports which rule produced it.
    #[instrument(skip(self, board), fields(board = %board))]
    pub fn choose(&self, board: &Board, symbols: SymbolPair) -> Result<(Position, HeuristicRule), EngineError> {
        check_searchable(board, symbols)?;
        let (ai, human) = (symbols.ai(), symbols.human());

        let choice = first(winning_moves_in(board, ai, &Position::ALL), HeuristicRule::Win)
            .or_else(|| first(winning_moves_in(board, human, &Position::ALL), HeuristicRule::Block))
            .or_else(|| first(fork_moves(board, ai), HeuristicRule::Fork))
            .or_else(|| deny_forks(board, ai, human))
            .or_else(|| board.is_empty(Position::Center).then_some((Position::Center, HeuristicRule::Center)))
            .or_else(|| opposite_corner(board, human).map(|p| (p, HeuristicRule::OppositeCorner)))
            .or_else(|| first(board.empty_positions_in(&Position::CORNERS), HeuristicRule::Corner))
            .or_else(|| first(board.empty_positions_in(&Position::EDGES), HeuristicRule::Edge));

        let (position, rule) = choice.ok_or(EngineError::NoLegalMove)?;
        debug!(%position, %rule, "Heuristic move");
        Ok((position, rule))
    }
}

impl Strategy for HeuristicStrategy {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn best_move(&self, board: &Board, symbols: SymbolPair) -> Result<Position, EngineError> {
        self.choose(board, symbols).map(|(position, _)| position)
    }
}

fn first(cells: Vec<Position>, rule: HeuristicRule) -> Option<(Position, HeuristicRule)> {
    cells.first().map(|p| (*p, rule))
}

/// Answers the human's fork cells.
///
/// A single fork cell is simply occupied. With several, a threat is made
/// instead: the human's forced reply must not leave them two threats.
fn deny_forks(board: &Board, ai: Symbol, human: Symbol) -> Option<(Position, HeuristicRule)> {
    let forks = fork_moves(board, human);
    match forks.as_slice() {
        [] => None,
        [only] => Some((*only, HeuristicRule::BlockFork)),
        _ => board
            .empty_positions()
            .into_iter()
            .find(|candidate| {
                let threatened = board.placed(*candidate, ai);
                threat_cells(&threatened, ai)
                    .first()
                    .is_some_and(|reply| count_threats(&threatened.placed(*reply, human), human) < 2)
            })
            .map(|p| (p, HeuristicRule::ForcingThreat)),
    }
}

fn opposite_corner(board: &Board, human: Symbol) -> Option<Position> {
    Position::CORNERS.into_iter().find_map(|corner| {
        let opposite = corner.opposite_corner()?;
        (board.get(corner).holds(human) && board.is_empty(opposite)).then_some(opposite)
    })
}
