//! Reading the paper sheet: photograph, then ask a multimodal model for the grid.
//!
//! Whatever comes back is an untrusted [`RawGrid`]. Only the turn validator
//! decides whether it describes a legal board.

mod client;
mod frame;
mod parse;

pub use client::{VisionClient, VisionProvider};
pub use frame::{Frame, FrameSource};
pub use parse::parse_grid_reply;

use crate::config::GameConfig;
use async_trait::async_trait;
use derive_more::{Display, Error};
use inkplay_engine::RawGrid;
use tracing::{debug, error, info, instrument};

/// System instruction describing the analyser role.
pub const SYSTEM_PROMPT: &str = "You are a tic-tac-toe grid analyzer. Analyze the tic-tac-toe \
grid in the given image and respond based on the user's query.";

/// Builds the request sent with every photograph.
pub fn grid_prompt(rotated: bool) -> String {
    let mut prompt = String::from(
        "Retrieve the 3x3 matrix from the image shown to you. Wherever a symbol is seen, \
place it in the same cell of the matrix. Return ONLY a JSON object with the key \"grid\" \
and the matrix as its value, three rows of three strings. Use \"X\" or \"O\" for marked \
cells and empty strings (\"\") for empty cells. Do not wrap the JSON in Markdown.",
    );
    if rotated {
        prompt.push_str(
            " The photograph is upside down: report the grid as seen after rotating it 180 degrees.",
        );
    }
    prompt
}

/// A source of photographed grids.
#[async_trait]
pub trait VisionSource: Send {
    /// Takes a photograph of the sheet and interprets it with `prompt`.
    async fn capture_and_interpret(&mut self, prompt: &str) -> Result<RawGrid, VisionError>;
}

/// Camera snapshot plus multimodal model.
#[derive(Debug)]
pub struct LlmVision {
    frames: FrameSource,
    client: VisionClient,
}

impl LlmVision {
    /// Creates the vision source from its parts.
    pub fn new(frames: FrameSource, client: VisionClient) -> Self {
        Self { frames, client }
    }

    /// Builds the vision source described by the configuration.
    ///
    /// Requires the provider's API key in the environment.
    #[instrument(skip(config))]
    pub fn from_config(config: &GameConfig) -> Result<Self, crate::config::ConfigError> {
        let api_key = config.vision().api_key()?;
        let frames = FrameSource::new(
            config.capture().image_path().clone(),
            config.capture().command().clone(),
        );
        let client = VisionClient::new(config.vision().clone(), api_key);
        info!(provider = %config.vision().provider(), "Vision source ready");
        Ok(Self::new(frames, client))
    }
}

#[async_trait]
impl VisionSource for LlmVision {
    #[instrument(skip(self, prompt))]
    async fn capture_and_interpret(&mut self, prompt: &str) -> Result<RawGrid, VisionError> {
        let frame = self.frames.capture().await?;
        debug!(bytes = frame.bytes().len(), "Frame captured");
        let reply = self.client.interpret(&frame, prompt).await?;
        parse_grid_reply(&reply)
    }
}

/// Vision error.
#[derive(Debug, Clone, Display, Error)]
#[display("Vision error: {} at {}:{}", message, file, line)]
pub struct VisionError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl VisionError {
    /// Creates a new vision error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        error!(error_message = %message, "Vision error created");
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
