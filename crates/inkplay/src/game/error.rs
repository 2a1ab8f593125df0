//! Game loop errors.

use crate::draw::DrawError;
use crate::vision::VisionError;
use inkplay_engine::{EngineError, Position, Rejection};

/// The external step that ran out of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum TurnStage {
    /// Photograph plus interpretation.
    Capture,
    /// Robot drawing.
    Draw,
}

/// Why a game stopped before reaching a result.
///
/// Every variant is terminal: the loop marks the game aborted and returns it.
#[derive(Debug, derive_more::Display)]
pub enum GameError {
    /// The strategy engine refused the board.
    #[display("Engine error: {}", _0)]
    Engine(EngineError),

    /// The validator rejected a photograph.
    #[display("{}", _0)]
    Rejected(Rejection),

    /// The vision source failed on every attempt.
    #[display("{}", _0)]
    Vision(VisionError),

    /// The draw sink failed.
    #[display("{}", _0)]
    Draw(DrawError),

    /// An external call exceeded its time budget.
    #[display("Timed out during {}", stage)]
    Timeout {
        /// Stage that timed out.
        stage: TurnStage,
    },

    /// The draw sink reported that nothing was drawn.
    #[display("Robot failed to draw at cell {}", position)]
    DrawFailed {
        /// Requested cell.
        position: Position,
    },

    /// Both symbols hold a line.
    #[display("Both players hold a winning line")]
    ConflictingWinners,

    /// The game already has an outcome.
    #[display("Game is over; no further moves are accepted")]
    Frozen,

    /// The human declined to continue.
    #[display("Game cancelled by the human")]
    Cancelled,

    /// The turn gate could not be read.
    #[display("Turn gate failed: {}", _0)]
    Gate(String),
}

impl std::error::Error for GameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GameError::Engine(e) => Some(e),
            GameError::Rejected(e) => Some(e),
            GameError::Vision(e) => Some(e),
            GameError::Draw(e) => Some(e),
            _ => None,
        }
    }
}

impl From<EngineError> for GameError {
    fn from(error: EngineError) -> Self {
        GameError::Engine(error)
    }
}

impl From<Rejection> for GameError {
    fn from(rejection: Rejection) -> Self {
        GameError::Rejected(rejection)
    }
}

impl From<VisionError> for GameError {
    fn from(error: VisionError) -> Self {
        GameError::Vision(error)
    }
}

impl From<DrawError> for GameError {
    fn from(error: DrawError) -> Self {
        GameError::Draw(error)
    }
}

impl GameError {
    /// Whether a fresh photograph might get past this error.
    pub fn is_retryable_capture(&self) -> bool {
        matches!(
            self,
            GameError::Vision(_)
                | GameError::Timeout {
                    stage: TurnStage::Capture
                }
        )
    }
}
