//! Record of cells already confirmed as filled.

use crate::position::Position;
use crate::types::Board;
use std::collections::BTreeSet;
use tracing::debug;

/// Cells confirmed as filled during one game.
///
/// Entries are only ever added. A recorded cell is never considered again as
/// the location of a new move, whatever a later photograph shows there.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlacementLedger {
    claimed: BTreeSet<Position>,
}

impl PlacementLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the cell has been confirmed.
    pub fn contains(&self, position: Position) -> bool {
        self.claimed.contains(&position)
    }

    /// Records a confirmed cell; returns false if it was already recorded.
    pub fn record(&mut self, position: Position) -> bool {
        let inserted = self.claimed.insert(position);
        if inserted {
            debug!(%position, total = self.claimed.len(), "Cell recorded in ledger");
        }
        inserted
    }

    /// Records every filled cell of an accepted board.
    pub fn absorb(&mut self, board: &Board) {
        for position in Position::ALL {
            if !board.is_empty(position) {
                self.record(position);
            }
        }
    }

    /// Number of confirmed cells.
    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    /// Whether nothing has been confirmed.
    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }

    /// Confirmed cells in reading order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.claimed.iter().copied()
    }
}
