//! Rendering the robot's move on paper.

mod geometry;

pub use geometry::{CellRect, GridGeometry, Point, Strokes};

use crate::gate::OperatorConsole;
use async_trait::async_trait;
use derive_more::{Display, Error};
use inkplay_engine::{Position, Symbol};
use tokio::io::{AsyncBufRead, AsyncWrite};
use tracing::{error, info, instrument};

/// Something that draws a symbol into a cell of the sheet.
///
/// The game loop issues exactly one request per robot turn and waits for
/// its answer. `Ok(false)` reports a drawing that did not happen.
#[async_trait]
pub trait DrawSink: Send {
    /// Draws `symbol` at `position`.
    async fn draw_symbol(&mut self, position: Position, symbol: Symbol) -> Result<bool, DrawError>;
}

/// Draws by instructing a human operator and waiting for confirmation.
pub struct ManualDrawSink<R, W> {
    geometry: GridGeometry,
    console: OperatorConsole<R, W>,
}

impl<R, W> ManualDrawSink<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    /// Creates a sink instructing the operator on `console`.
    pub fn new(geometry: GridGeometry, console: OperatorConsole<R, W>) -> Self {
        Self { geometry, console }
    }

    fn instruction(&self, position: Position, symbol: Symbol) -> String {
        let detail = match self.geometry.strokes(position, symbol) {
            Strokes::Cross { first, second } => format!(
                "lines ({:.1}, {:.1})-({:.1}, {:.1}) and ({:.1}, {:.1})-({:.1}, {:.1})",
                first.0.x, first.0.y, first.1.x, first.1.y, second.0.x, second.0.y, second.1.x,
                second.1.y
            ),
            Strokes::Circle { center, radius } => format!(
                "circle at ({:.1}, {:.1}) radius {:.1}",
                center.x, center.y, radius
            ),
        };
        format!("Draw {} in cell {}: {}\n", symbol, position, detail)
    }
}

#[async_trait]
impl<R, W> DrawSink for ManualDrawSink<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    #[instrument(skip(self))]
    async fn draw_symbol(&mut self, position: Position, symbol: Symbol) -> Result<bool, DrawError> {
        let instruction = self.instruction(position, symbol);
        self.console
            .say(&instruction)
            .await
            .map_err(|e| DrawError::new(format!("Failed to print instruction: {}", e)))?;

        let drawn = self
            .console
            .ask("Drawn? [y/n] ")
            .await
            .map_err(|e| DrawError::new(format!("Failed to read confirmation: {}", e)))?;
        info!(%position, %symbol, drawn, "Draw request answered");
        Ok(drawn)
    }
}

/// Drawing error.
#[derive(Debug, Clone, Display, Error)]
#[display("Draw error: {} at {}:{}", message, file, line)]
pub struct DrawError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl DrawError {
    /// Creates a new draw error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        error!(error_message = %message, "Draw error created");
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
