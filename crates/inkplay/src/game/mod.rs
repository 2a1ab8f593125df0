//! The game loop: alternating turns until a win, a draw or an error.

mod error;
mod orchestrator;
mod state;

pub use error::{GameError, TurnStage};
pub use orchestrator::{Collaborators, GameEvent, Orchestrator};
pub use state::{GameOutcome, GameState, Participant};
