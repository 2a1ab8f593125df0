//! Cell positions 1-9 and the eight winning lines.

use serde::{Deserialize, Serialize};

/// A cell of the grid, numbered 1-9 in row-major reading order.
///
/// The number is what crosses the system boundary: the vision service
/// reports grids that are mapped onto it and the draw sink is told which
/// numbered cell to draw in.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumIter,
)]
pub enum Position {
    /// Top-left (1)
    TopLeft,
    /// Top-center (2)
    TopCenter,
    /// Top-right (3)
    TopRight,
    /// Middle-left (4)
    MiddleLeft,
    /// Center (5)
    Center,
    /// Middle-right (6)
    MiddleRight,
    /// Bottom-left (7)
    BottomLeft,
    /// Bottom-center (8)
    BottomCenter,
    /// Bottom-right (9)
    BottomRight,
}

impl Position {
    /// All 9 positions in reading order.
    pub const ALL: [Position; 9] = [
        Position::TopLeft,
        Position::TopCenter,
        Position::TopRight,
        Position::MiddleLeft,
        Position::Center,
        Position::MiddleRight,
        Position::BottomLeft,
        Position::BottomCenter,
        Position::BottomRight,
    ];

    /// The four corners.
    pub const CORNERS: [Position; 4] = [
        Position::TopLeft,
        Position::TopRight,
        Position::BottomLeft,
        Position::BottomRight,
    ];

    /// The four edge (side-middle) cells.
    pub const EDGES: [Position; 4] = [
        Position::TopCenter,
        Position::MiddleLeft,
        Position::MiddleRight,
        Position::BottomCenter,
    ];

    /// Search order: center, then corners, then edges.
    pub const SEARCH_ORDER: [Position; 9] = [
        Position::Center,
        Position::TopLeft,
        Position::TopRight,
        Position::BottomLeft,
        Position::BottomRight,
        Position::TopCenter,
        Position::MiddleLeft,
        Position::MiddleRight,
        Position::BottomCenter,
    ];

    /// Label for display.
    pub fn label(self) -> &'static str {
        match self {
            Position::TopLeft => "Top-left",
            Position::TopCenter => "Top-center",
            Position::TopRight => "Top-right",
            Position::MiddleLeft => "Middle-left",
            Position::Center => "Center",
            Position::MiddleRight => "Middle-right",
            Position::BottomLeft => "Bottom-left",
            Position::BottomCenter => "Bottom-center",
            Position::BottomRight => "Bottom-right",
        }
    }

    /// Zero-based index into the flattened board (0-8).
    pub fn index(self) -> usize {
        match self {
            Position::TopLeft => 0,
            Position::TopCenter => 1,
            Position::TopRight => 2,
            Position::MiddleLeft => 3,
            Position::Center => 4,
            Position::MiddleRight => 5,
            Position::BottomLeft => 6,
            Position::BottomCenter => 7,
            Position::BottomRight => 8,
        }
    }

    /// Boundary number of the cell (1-9).
    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }

    /// Row and column (both 0-2) of this cell.
    pub fn row_col(self) -> (usize, usize) {
        (self.index() / 3, self.index() % 3)
    }

    /// The corner diagonally across the board, for corner cells only.
    pub fn opposite_corner(self) -> Option<Self> {
        match self {
            Position::TopLeft => Some(Position::BottomRight),
            Position::BottomRight => Some(Position::TopLeft),
            Position::TopRight => Some(Position::BottomLeft),
            Position::BottomLeft => Some(Position::TopRight),
            _ => None,
        }
    }

    /// Single-bit mask of this cell, bit `index()`.
    pub(crate) fn bit(self) -> u16 {
        1 << self.index()
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.number(), self.label())
    }
}

/// One of the eight triples of cells whose uniform occupation wins the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WinLine([Position; 3]);

impl WinLine {
    /// The three cells of the line.
    pub fn cells(&self) -> [Position; 3] {
        self.0
    }

    /// Bit mask of the line's cells.
    pub(crate) fn mask(&self) -> u16 {
        self.0.iter().fold(0, |mask, pos| mask | pos.bit())
    }
}

/// The three rows, three columns and two diagonals.
pub const WIN_LINES: [WinLine; 8] = [
    // Rows
    WinLine([Position::TopLeft, Position::TopCenter, Position::TopRight]),
    WinLine([
        Position::MiddleLeft,
        Position::Center,
        Position::MiddleRight,
    ]),
    WinLine([
        Position::BottomLeft,
        Position::BottomCenter,
        Position::BottomRight,
    ]),
    // Columns
    WinLine([
        Position::TopLeft,
        Position::MiddleLeft,
        Position::BottomLeft,
    ]),
    WinLine([
        Position::TopCenter,
        Position::Center,
        Position::BottomCenter,
    ]),
    WinLine([
        Position::TopRight,
        Position::MiddleRight,
        Position::BottomRight,
    ]),
    // Diagonals
    WinLine([Position::TopLeft, Position::Center, Position::BottomRight]),
    WinLine([Position::TopRight, Position::Center, Position::BottomLeft]),
];

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_numbers_follow_reading_order() {
        assert_eq!(Position::TopLeft.number(), 1);
        assert_eq!(Position::Center.number(), 5);
        assert_eq!(Position::BottomRight.number(), 9);
        for (index, pos) in Position::ALL.into_iter().enumerate() {
            assert_eq!(pos.index(), index);
        }
    }

    #[test]
    fn test_row_col_follows_reading_order() {
        for pos in Position::iter() {
            let (row, col) = pos.row_col();
            assert_eq!(row * 3 + col, pos.index());
        }
        assert_eq!(Position::MiddleRight.row_col(), (1, 2));
    }

    #[test]
    fn test_search_order_covers_every_cell_once() {
        let mut seen: Vec<_> = Position::SEARCH_ORDER.to_vec();
        seen.sort();
        assert_eq!(seen, Position::ALL.to_vec());
        assert_eq!(Position::SEARCH_ORDER[0], Position::Center);
    }

    #[test]
    fn test_every_cell_lies_on_a_line() {
        for pos in Position::iter() {
            let lines = WIN_LINES.iter().filter(|l| l.cells().contains(&pos)).count();
            let expected = match pos {
                Position::Center => 4,
                p if Position::CORNERS.contains(&p) => 3,
                _ => 2,
            };
            assert_eq!(lines, expected, "{pos}");
        }
    }
}
