//! Game rules for tic-tac-toe.
//!
//! Pure functions evaluating a board snapshot. Rules are separated from
//! board storage so the strategy and the validator can share them.

pub mod draw;
pub mod threats;
pub mod win;

pub use draw::{is_draw, is_full};
pub use threats::{count_threats, fork_moves, threat_cells, threat_lines, winning_moves_in};
pub use win::{WinnerCheck, check_winner, has_won, winner};
