//! Cell rectangles of the drawn grid in device millimetres.

use crate::config::DrawConfig;
use inkplay_engine::{Position, Symbol};

/// Smallest half-extent of a symbol's drawing box.
const MIN_HALF_EXTENT: f64 = 0.1;

/// Smallest radius of a drawn circle.
const MIN_RADIUS: f64 = 0.2;

/// A point in device coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// Device x.
    pub x: f64,
    /// Device y.
    pub y: f64,
}

/// Axis-aligned rectangle of one cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellRect {
    /// Corner with the smallest coordinates.
    pub min: Point,
    /// Corner with the largest coordinates.
    pub max: Point,
}

impl CellRect {
    /// Center of the rectangle.
    pub fn center(&self) -> Point {
        Point {
            x: (self.min.x + self.max.x) / 2.0,
            y: (self.min.y + self.max.y) / 2.0,
        }
    }

    /// Shrinks every side by `amount`.
    pub fn shrink(&self, amount: f64) -> CellRect {
        CellRect {
            min: Point {
                x: self.min.x + amount,
                y: self.min.y + amount,
            },
            max: Point {
                x: self.max.x - amount,
                y: self.max.y - amount,
            },
        }
    }

    /// Width and height.
    pub fn size(&self) -> (f64, f64) {
        (self.max.x - self.min.x, self.max.y - self.min.y)
    }
}

/// The pen movements that render one symbol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Strokes {
    /// Two diagonals, each a pen-down line.
    Cross {
        /// First diagonal.
        first: (Point, Point),
        /// Second diagonal.
        second: (Point, Point),
    },
    /// One circle.
    Circle {
        /// Center of the circle.
        center: Point,
        /// Radius.
        radius: f64,
    },
}

/// Maps positions to rectangles on the sheet.
#[derive(Debug, Clone, Copy)]
pub struct GridGeometry {
    config: DrawConfig,
}

impl GridGeometry {
    /// Creates the geometry from configuration.
    pub fn new(config: DrawConfig) -> Self {
        Self { config }
    }

    /// The full cell rectangle, numbered in row-major reading order.
    ///
    /// Columns advance along device x and rows along device y, or the other
    /// way round when `swap_axes` is set.
    pub fn cell(&self, position: Position) -> CellRect {
        let (row, col) = position.row_col();
        let (along_x, along_y) = if *self.config.swap_axes() {
            (row, col)
        } else {
            (col, row)
        };
        let size = *self.config.cell_size();
        let min = Point {
            x: self.config.origin_x() + along_x as f64 * size,
            y: self.config.origin_y() + along_y as f64 * size,
        };
        CellRect {
            min,
            max: Point {
                x: min.x + size,
                y: min.y + size,
            },
        }
    }

    /// The box a symbol may occupy: the cell minus inset and symbol margin.
    pub fn symbol_box(&self, position: Position) -> CellRect {
        let inner = self.cell(position).shrink(*self.config.inset());
        let center = inner.center();
        let (width, height) = inner.size();
        let half_w = (width / 2.0 - self.config.symbol_margin()).max(MIN_HALF_EXTENT);
        let half_h = (height / 2.0 - self.config.symbol_margin()).max(MIN_HALF_EXTENT);
        CellRect {
            min: Point {
                x: center.x - half_w,
                y: center.y - half_h,
            },
            max: Point {
                x: center.x + half_w,
                y: center.y + half_h,
            },
        }
    }

    /// Pen movements drawing `symbol` at `position`.
    pub fn strokes(&self, position: Position, symbol: Symbol) -> Strokes {
        let area = self.symbol_box(position);
        match symbol {
            Symbol::X => Strokes::Cross {
                first: (
                    Point {
                        x: area.min.x,
                        y: area.max.y,
                    },
                    Point {
                        x: area.max.x,
                        y: area.min.y,
                    },
                ),
                second: (area.min, area.max),
            },
            Symbol::O => {
                let (width, height) = area.size();
                Strokes::Circle {
                    center: area.center(),
                    radius: (0.98 * width.min(height) / 2.0).max(MIN_RADIUS),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(swap_axes: bool) -> GridGeometry {
        let config: DrawConfig = toml::from_str(&format!(
            "origin_x = 0.0\norigin_y = 0.0\ncell_size = 30.0\ninset = 2.0\nsymbol_margin = 1.0\nswap_axes = {swap_axes}"
        ))
        .unwrap();
        GridGeometry::new(config)
    }

    #[test]
    fn test_cells_tile_in_reading_order() {
        let grid = geometry(false);
        assert_eq!(grid.cell(Position::TopLeft).min, Point { x: 0.0, y: 0.0 });
        assert_eq!(grid.cell(Position::TopRight).min, Point { x: 60.0, y: 0.0 });
        assert_eq!(grid.cell(Position::BottomLeft).min, Point { x: 0.0, y: 60.0 });
        assert_eq!(grid.cell(Position::Center).center(), Point { x: 45.0, y: 45.0 });
    }

    #[test]
    fn test_swap_axes_transposes() {
        let grid = geometry(true);
        assert_eq!(grid.cell(Position::TopRight).min, Point { x: 0.0, y: 60.0 });
    }

    #[test]
    fn test_symbol_box_keeps_clearance() {
        let area = geometry(false).symbol_box(Position::TopLeft);
        assert_eq!(area.min, Point { x: 3.0, y: 3.0 });
        assert_eq!(area.max, Point { x: 27.0, y: 27.0 });
    }

    #[test]
    fn test_circle_fits_inside_box() {
        match geometry(false).strokes(Position::Center, Symbol::O) {
            Strokes::Circle { center, radius } => {
                assert_eq!(center, Point { x: 45.0, y: 45.0 });
                assert!((radius - 11.76).abs() < 1e-9);
            }
            other => panic!("expected a circle, got {other:?}"),
        }
    }
}
