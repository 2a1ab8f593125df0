//! Game configuration loaded from TOML.

use crate::game::Participant;
use crate::vision::VisionProvider;
use derive_getters::Getters;
use derive_more::{Display, Error};
use inkplay_engine::{StrategyKind, Symbol, SymbolPair};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Top-level configuration of one game.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
pub struct GameConfig {
    /// Symbol drawn by the human; the robot takes the other one.
    #[serde(default = "default_human_symbol")]
    human_symbol: Symbol,

    /// Who opens the game.
    #[serde(default = "default_first_player")]
    first_player: Participant,

    /// Move selection policy of the robot.
    #[serde(default)]
    strategy: StrategyKind,

    /// Photograph the sheet before the first move and require it blank.
    #[serde(default = "default_verify_initial_board")]
    verify_initial_board: bool,

    /// Upper bound on one capture-and-interpret call.
    #[serde(default = "default_capture_timeout_secs")]
    capture_timeout_secs: u64,

    /// Upper bound on one drawing request.
    #[serde(default = "default_draw_timeout_secs")]
    draw_timeout_secs: u64,

    /// Pause after the robot draws, before photographing.
    #[serde(default = "default_settle_delay_ms")]
    settle_delay_ms: u64,

    /// Photographs attempted per turn when the vision call fails or times out.
    #[serde(default = "default_max_capture_attempts")]
    max_capture_attempts: u32,

    /// Unattended play: wait this long for the human instead of asking.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    human_delay_ms: Option<u64>,

    /// Vision service settings.
    #[serde(default)]
    vision: VisionConfig,

    /// Snapshot acquisition settings.
    #[serde(default)]
    capture: CaptureConfig,

    /// Drawing geometry.
    #[serde(default)]
    draw: DrawConfig,
}

fn default_human_symbol() -> Symbol {
    Symbol::X
}

fn default_first_player() -> Participant {
    Participant::Human
}

fn default_verify_initial_board() -> bool {
    true
}

fn default_capture_timeout_secs() -> u64 {
    60
}

fn default_draw_timeout_secs() -> u64 {
    120
}

fn default_settle_delay_ms() -> u64 {
    1_500
}

fn default_max_capture_attempts() -> u32 {
    3
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            human_symbol: default_human_symbol(),
            first_player: default_first_player(),
            strategy: StrategyKind::default(),
            verify_initial_board: default_verify_initial_board(),
            capture_timeout_secs: default_capture_timeout_secs(),
            draw_timeout_secs: default_draw_timeout_secs(),
            settle_delay_ms: default_settle_delay_ms(),
            max_capture_attempts: default_max_capture_attempts(),
            human_delay_ms: None,
            vision: VisionConfig::default(),
            capture: CaptureConfig::default(),
            draw: DrawConfig::default(),
        }
    }
}

impl GameConfig {
    /// Loads and validates configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml(&content)?;
        info!(
            human = %config.human_symbol,
            first = %config.first_player,
            strategy = %config.strategy,
            "Config loaded successfully"
        );
        Ok(config)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the game loop cannot work with.
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_capture_attempts == 0 {
            return Err(ConfigError::new(
                "max_capture_attempts must be at least 1".to_string(),
            ));
        }
        if self.capture_timeout_secs == 0 || self.draw_timeout_secs == 0 {
            return Err(ConfigError::new("timeouts must be positive".to_string()));
        }
        self.draw.validate()
    }

    /// Symbols of the robot and the human.
    pub fn symbols(&self) -> SymbolPair {
        SymbolPair::for_ai(self.human_symbol.opponent())
    }

    /// Capture timeout as a duration.
    pub fn capture_timeout(&self) -> Duration {
        Duration::from_secs(self.capture_timeout_secs)
    }

    /// Draw timeout as a duration.
    pub fn draw_timeout(&self) -> Duration {
        Duration::from_secs(self.draw_timeout_secs)
    }

    /// Settle delay as a duration.
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Fixed wait for the human's move, if play is unattended.
    pub fn human_delay(&self) -> Option<Duration> {
        self.human_delay_ms.map(Duration::from_millis)
    }

    /// Overrides who opens the game.
    pub fn with_first_player(mut self, first_player: Participant) -> Self {
        self.first_player = first_player;
        self
    }

    /// Overrides the robot's strategy.
    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    /// Overrides the human's symbol.
    pub fn with_human_symbol(mut self, human_symbol: Symbol) -> Self {
        self.human_symbol = human_symbol;
        self
    }

    /// Overrides the pause after drawing.
    pub fn with_settle_delay_ms(mut self, settle_delay_ms: u64) -> Self {
        self.settle_delay_ms = settle_delay_ms;
        self
    }

    /// Waits a fixed time for the human instead of asking on the terminal.
    pub fn with_human_delay_ms(mut self, human_delay_ms: u64) -> Self {
        self.human_delay_ms = Some(human_delay_ms);
        self
    }

    /// Overrides the capture budget per turn.
    pub fn with_max_capture_attempts(mut self, max_capture_attempts: u32) -> Self {
        self.max_capture_attempts = max_capture_attempts;
        self
    }
}

/// Multimodal model used to read the sheet.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
pub struct VisionConfig {
    /// Service provider.
    #[serde(default = "default_provider")]
    provider: VisionProvider,

    /// Model name, e.g. "gemini-2.5-flash".
    #[serde(default = "default_model")]
    model: String,

    /// Maximum tokens of the reply.
    #[serde(default = "default_max_tokens")]
    max_tokens: u32,

    /// System instruction sent with every photograph.
    #[serde(default = "default_system_prompt")]
    system_prompt: String,
}

fn default_provider() -> VisionProvider {
    VisionProvider::Gemini
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_max_tokens() -> u32 {
    512
}

fn default_system_prompt() -> String {
    crate::vision::SYSTEM_PROMPT.to_string()
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            system_prompt: default_system_prompt(),
        }
    }
}

impl VisionConfig {
    /// Reads the provider's API key from the environment.
    ///
    /// Requires GEMINI_API_KEY, OPENAI_API_KEY or ANTHROPIC_API_KEY.
    #[instrument(skip(self), fields(provider = %self.provider))]
    pub fn api_key(&self) -> Result<String, ConfigError> {
        let var = self.provider.api_key_var();
        std::env::var(var)
            .map_err(|_| ConfigError::new(format!("{} environment variable not set", var)))
    }
}

/// Where photographs of the sheet come from.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Snapshot file read on every capture.
    #[serde(default = "default_image_path")]
    image_path: PathBuf,

    /// Command (program and arguments) run before each read to refresh the
    /// snapshot. Empty means the file is refreshed externally.
    #[serde(default)]
    command: Vec<String>,

    /// The camera is mounted upside down.
    #[serde(default)]
    rotate_180: bool,
}

fn default_image_path() -> PathBuf {
    PathBuf::from("capture.png")
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            image_path: default_image_path(),
            command: Vec::new(),
            rotate_180: false,
        }
    }
}

/// Grid geometry on the sheet, in millimetres of the drawing device.
#[derive(Debug, Clone, Copy, Getters, Serialize, Deserialize)]
pub struct DrawConfig {
    /// Device x of the grid's top-left corner.
    #[serde(default = "default_origin_x")]
    origin_x: f64,

    /// Device y of the grid's top-left corner.
    #[serde(default = "default_origin_y")]
    origin_y: f64,

    /// Side of one cell.
    #[serde(default = "default_cell_size")]
    cell_size: f64,

    /// Clearance kept from the grid lines.
    #[serde(default = "default_inset")]
    inset: f64,

    /// Further clearance between the inset cell and the drawn symbol.
    #[serde(default = "default_symbol_margin")]
    symbol_margin: f64,

    /// Device x runs along rows instead of columns.
    #[serde(default)]
    swap_axes: bool,
}

fn default_origin_x() -> f64 {
    242.09
}

fn default_origin_y() -> f64 {
    -4.74
}

fn default_cell_size() -> f64 {
    26.0
}

fn default_inset() -> f64 {
    2.0
}

fn default_symbol_margin() -> f64 {
    1.5
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self {
            origin_x: default_origin_x(),
            origin_y: default_origin_y(),
            cell_size: default_cell_size(),
            inset: default_inset(),
            symbol_margin: default_symbol_margin(),
            swap_axes: false,
        }
    }
}

impl DrawConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let clearance = 2.0 * (self.inset + self.symbol_margin);
        if self.cell_size <= clearance {
            return Err(ConfigError::new(format!(
                "cell_size {} leaves no room inside clearance {}",
                self.cell_size, clearance
            )));
        }
        if self.inset < 0.0 || self.symbol_margin < 0.0 {
            return Err(ConfigError::new(
                "inset and symbol_margin must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = GameConfig::from_toml("").unwrap();
        assert_eq!(*config.human_symbol(), Symbol::X);
        assert_eq!(config.symbols().ai(), Symbol::O);
        assert_eq!(*config.first_player(), Participant::Human);
        assert_eq!(*config.strategy(), StrategyKind::Minimax);
        assert!(*config.verify_initial_board());
        assert_eq!(*config.max_capture_attempts(), 3);
        assert_eq!(*config.vision().provider(), VisionProvider::Gemini);
        assert_eq!(config.human_delay(), None);
    }

    #[test]
    fn test_human_delay_selects_unattended_play() {
        let config = GameConfig::from_toml("human_delay_ms = 8000").unwrap();
        assert_eq!(config.human_delay(), Some(Duration::from_secs(8)));
    }

    #[test]
    fn test_zero_capture_budget_is_rejected() {
        let err = GameConfig::from_toml("max_capture_attempts = 0").unwrap_err();
        assert!(err.message.contains("max_capture_attempts"));
    }

    #[test]
    fn test_cell_too_small_for_clearance() {
        let err = GameConfig::from_toml("[draw]\ncell_size = 5.0").unwrap_err();
        assert!(err.message.contains("cell_size"));
    }
}
