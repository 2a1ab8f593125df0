//! Core domain types: symbols, squares and the board.

use super::error::EngineError;
use super::position::Position;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// A grid exactly as reported by the vision service: rows of cell strings.
///
/// Nothing about its shape or contents is trusted until it has been parsed.
pub type RawGrid = Vec<Vec<String>>;

/// One of the two marks drawn on the sheet.
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
#[serde(rename_all = "lowercase")]
pub enum Symbol {
    /// Cross.
    #[serde(alias = "X")]
    X,
    /// Nought.
    #[serde(alias = "O")]
    O,
}

impl Symbol {
    /// Returns the other symbol.
    pub fn opponent(self) -> Self {
        match self {
            Symbol::X => Symbol::O,
            Symbol::O => Symbol::X,
        }
    }

    /// Single-character rendering.
    pub fn to_char(self) -> char {
        match self {
            Symbol::X => 'X',
            Symbol::O => 'O',
        }
    }

    /// Parses a cell string, trimmed and case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "x" | "X" => Some(Symbol::X),
            "o" | "O" => Some(Symbol::O),
            _ => None,
        }
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

impl std::str::FromStr for Symbol {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Symbol::parse(s).ok_or_else(|| {
            EngineError::MalformedBoard(format!("unknown symbol {s:?} (expected x or o)"))
        })
    }
}

/// The machine's symbol and the human's symbol, fixed for one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SymbolPair {
    ai: Symbol,
    human: Symbol,
}

impl SymbolPair {
    /// Creates a pair, rejecting identical symbols.
    #[instrument]
    pub fn new(ai: Symbol, human: Symbol) -> Result<Self, EngineError> {
        if ai == human {
            return Err(EngineError::SymbolsNotDistinct);
        }
        Ok(Self { ai, human })
    }

    /// Creates the pair in which the machine plays `ai`.
    pub fn for_ai(ai: Symbol) -> Self {
        Self {
            ai,
            human: ai.opponent(),
        }
    }

    /// The machine's symbol.
    pub fn ai(&self) -> Symbol {
        self.ai
    }

    /// The human's symbol.
    pub fn human(&self) -> Symbol {
        self.human
    }
}

/// A square on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Square {
    /// Empty square.
    Empty,
    /// Square holding a symbol.
    Occupied(Symbol),
}

impl Square {
    /// Whether the square holds `symbol`.
    pub fn holds(self, symbol: Symbol) -> bool {
        self == Square::Occupied(symbol)
    }

    fn to_char(self) -> char {
        match self {
            Square::Empty => '.',
            Square::Occupied(symbol) => symbol.to_char(),
        }
    }

    fn digit(self) -> u32 {
        match self {
            Square::Empty => 0,
            Square::Occupied(Symbol::X) => 1,
            Square::Occupied(Symbol::O) => 2,
        }
    }
}

/// Canonical memoization key of a board: the nine squares packed base 3.
///
/// Every representation of the same board maps to the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BoardKey(u32);

/// 3x3 board, stored flat in row-major order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    squares: [Square; 9],
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self {
            squares: [Square::Empty; 9],
        }
    }

    /// Parses a grid reported by the vision service.
    ///
    /// The grid must have exactly three rows of exactly three cells; every
    /// cell must be empty (blank after trimming) or `x`/`o` in either case.
    #[instrument(skip(grid))]
    pub fn parse_grid(grid: &[Vec<String>]) -> Result<Self, EngineError> {
        if grid.len() != 3 {
            return Err(EngineError::MalformedBoard(format!(
                "expected 3 rows, got {}",
                grid.len()
            )));
        }

        let mut squares = [Square::Empty; 9];
        for (row, cells) in grid.iter().enumerate() {
            if cells.len() != 3 {
                return Err(EngineError::MalformedBoard(format!(
                    "row {} has {} cells, expected 3",
                    row + 1,
                    cells.len()
                )));
            }
            for (col, cell) in cells.iter().enumerate() {
                squares[row * 3 + col] = if cell.trim().is_empty() {
                    Square::Empty
                } else {
                    Square::Occupied(Symbol::parse(cell).ok_or_else(|| {
                        EngineError::MalformedBoard(format!(
                            "unknown symbol {cell:?} at row {}, column {}",
                            row + 1,
                            col + 1
                        ))
                    })?)
                };
            }
        }

        Ok(Self { squares })
    }

    /// Parses compact notation: nine cells of `X`, `O` or `.`/`_`/`-`.
    ///
    /// Whitespace and `|` row separators are ignored, so `"XO.|.X.|..O"`
    /// and `"XO..X...O"` describe the same board.
    pub fn from_notation(s: &str) -> Result<Self, EngineError> {
        let cells: Vec<char> = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '|')
            .collect();
        if cells.len() != 9 {
            return Err(EngineError::MalformedBoard(format!(
                "expected 9 cells in {s:?}, got {}",
                cells.len()
            )));
        }

        let mut squares = [Square::Empty; 9];
        for (i, c) in cells.into_iter().enumerate() {
            squares[i] = match c {
                '.' | '_' | '-' => Square::Empty,
                'x' | 'X' => Square::Occupied(Symbol::X),
                'o' | 'O' => Square::Occupied(Symbol::O),
                other => {
                    return Err(EngineError::MalformedBoard(format!(
                        "unknown cell {other:?} in {s:?}"
                    )));
                }
            };
        }
        Ok(Self { squares })
    }

    /// Renders the board as the grid shape the vision service produces.
    pub fn to_grid(&self) -> RawGrid {
        self.squares
            .chunks(3)
            .map(|row| {
                row.iter()
                    .map(|sq| match sq {
                        Square::Empty => String::new(),
                        Square::Occupied(symbol) => symbol.to_string(),
                    })
                    .collect()
            })
            .collect()
    }

    /// Gets the square at a position.
    pub fn get(&self, pos: Position) -> Square {
        self.squares[pos.index()]
    }

    /// Sets the square at a position.
    pub fn set(&mut self, pos: Position, square: Square) {
        self.squares[pos.index()] = square;
    }

    /// Returns a copy with `symbol` placed at `pos`.
    #[must_use = "placed returns a new board; the original is unchanged"]
    pub fn placed(&self, pos: Position, symbol: Symbol) -> Self {
        let mut next = *self;
        next.set(pos, Square::Occupied(symbol));
        next
    }

    /// Checks if a square is empty.
    pub fn is_empty(&self, pos: Position) -> bool {
        self.get(pos) == Square::Empty
    }

    /// Returns all squares as a slice.
    pub fn squares(&self) -> &[Square; 9] {
        &self.squares
    }

    /// The board as three rows.
    pub fn rows(&self) -> [[Square; 3]; 3] {
        let s = &self.squares;
        [[s[0], s[1], s[2]], [s[3], s[4], s[5]], [s[6], s[7], s[8]]]
    }

    /// Number of squares holding `symbol`.
    pub fn count(&self, symbol: Symbol) -> usize {
        self.squares.iter().filter(|sq| sq.holds(symbol)).count()
    }

    /// Number of occupied squares.
    pub fn filled_count(&self) -> usize {
        self.squares.iter().filter(|sq| **sq != Square::Empty).count()
    }

    /// Empty positions, listed in the given order.
    pub fn empty_positions_in(&self, order: &[Position]) -> Vec<Position> {
        order.iter().copied().filter(|p| self.is_empty(*p)).collect()
    }

    /// Empty positions in reading order.
    pub fn empty_positions(&self) -> Vec<Position> {
        self.empty_positions_in(&Position::ALL)
    }

    /// Bit mask of the cells holding `symbol`.
    pub(crate) fn mask(&self, symbol: Symbol) -> u16 {
        Position::ALL
            .iter()
            .filter(|p| self.get(**p).holds(symbol))
            .fold(0, |mask, p| mask | p.bit())
    }

    /// Canonical key for memoization.
    pub fn key(&self) -> BoardKey {
        BoardKey(
            self.squares
                .iter()
                .fold(0u32, |acc, sq| acc * 3 + sq.digit()),
        )
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, row) in self.rows().iter().enumerate() {
            for sq in row {
                write!(f, "{}", sq.to_char())?;
            }
            if i < 2 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: [[&str; 3]; 3]) -> RawGrid {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_parse_grid_is_case_insensitive_and_trimmed() {
        let board = Board::parse_grid(&grid([["x", " O ", ""], ["", "X", " "], ["o", "", ""]]))
            .unwrap();
        assert_eq!(board.get(Position::TopLeft), Square::Occupied(Symbol::X));
        assert_eq!(board.get(Position::TopCenter), Square::Occupied(Symbol::O));
        assert_eq!(board.get(Position::MiddleRight), Square::Empty);
        assert_eq!(board.filled_count(), 4);
    }

    #[test]
    fn test_parse_grid_rejects_bad_shapes() {
        let two_rows: RawGrid = vec![vec![String::new(); 3]; 2];
        assert!(matches!(
            Board::parse_grid(&two_rows),
            Err(EngineError::MalformedBoard(_))
        ));

        let short_row = vec![
            vec![String::new(); 3],
            vec![String::new(); 2],
            vec![String::new(); 3],
        ];
        assert!(Board::parse_grid(&short_row).is_err());
    }

    #[test]
    fn test_parse_grid_rejects_unknown_symbols() {
        let result = Board::parse_grid(&grid([["X", "Z", ""], ["", "", ""], ["", "", ""]]));
        assert!(result.unwrap_err().to_string().contains("Z"));
    }

    #[test]
    fn test_equivalent_representations_share_a_key() {
        let from_grid =
            Board::parse_grid(&grid([["X", "", ""], ["", "o", ""], ["", "", "x"]])).unwrap();
        let from_notation = Board::from_notation("X..|.O.|..X").unwrap();
        let built = Board::new()
            .placed(Position::TopLeft, Symbol::X)
            .placed(Position::Center, Symbol::O)
            .placed(Position::BottomRight, Symbol::X);

        assert_eq!(from_grid.key(), from_notation.key());
        assert_eq!(from_grid.key(), built.key());
        assert_ne!(from_grid.key(), Board::new().key());
    }

    #[test]
    fn test_grid_roundtrip_through_vision_shape() {
        let board = Board::from_notation("XO.......").unwrap();
        assert_eq!(Board::parse_grid(&board.to_grid()).unwrap(), board);
    }

    #[test]
    fn test_symbol_pair_requires_distinct_symbols() {
        assert_eq!(
            SymbolPair::new(Symbol::O, Symbol::O),
            Err(EngineError::SymbolsNotDistinct)
        );
        let pair = SymbolPair::new(Symbol::O, Symbol::X).unwrap();
        assert_eq!(pair, SymbolPair::for_ai(Symbol::O));
    }

    #[test]
    fn test_display() {
        let board = Board::from_notation("XOX.O.X..").unwrap();
        assert_eq!(board.to_string(), "XOX\n.O.\nX..");
    }
}
