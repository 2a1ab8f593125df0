//! Tests for loading game configuration files.

use inkplay::{GameConfig, Participant, VisionProvider};
use inkplay_engine::{StrategyKind, Symbol};
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_load_full_config() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("inkplay.toml");
    fs::write(
        &path,
        r#"
human_symbol = "O"
first_player = "robot"
strategy = "heuristic"
verify_initial_board = false
capture_timeout_secs = 30
settle_delay_ms = 250

[vision]
provider = "anthropic"
model = "claude-sonnet-4-5"

[capture]
image_path = "/tmp/frame.jpg"
command = ["fswebcam", "--no-banner", "/tmp/frame.jpg"]
rotate_180 = true

[draw]
origin_x = 10.0
origin_y = 20.0
cell_size = 30.0
swap_axes = true
"#,
    )
    .unwrap();

    let config = GameConfig::from_file(&path).unwrap();
    assert_eq!(*config.human_symbol(), Symbol::O);
    assert_eq!(config.symbols().ai(), Symbol::X);
    assert_eq!(*config.first_player(), Participant::Robot);
    assert_eq!(*config.strategy(), StrategyKind::Heuristic);
    assert!(!*config.verify_initial_board());
    assert_eq!(config.capture_timeout(), Duration::from_secs(30));
    assert_eq!(config.settle_delay(), Duration::from_millis(250));
    assert_eq!(*config.vision().provider(), VisionProvider::Anthropic);
    assert_eq!(config.vision().model(), "claude-sonnet-4-5");
    assert_eq!(config.capture().command().len(), 3);
    assert!(*config.capture().rotate_180());
    assert_eq!(*config.draw().cell_size(), 30.0);
    assert!(*config.draw().swap_axes());
    // Untouched fields keep their defaults.
    assert_eq!(*config.draw_timeout_secs(), 120);
    assert_eq!(*config.draw().inset(), 2.0);
}

#[test]
fn test_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let err = GameConfig::from_file(temp_dir.path().join("absent.toml")).unwrap_err();
    assert!(err.message.contains("Failed to read config file"));
}

#[test]
fn test_unknown_strategy_is_a_parse_error() {
    let err = GameConfig::from_toml("strategy = \"alphazero\"").unwrap_err();
    assert!(err.message.contains("Failed to parse config"));
}

#[test]
fn test_printed_config_loads_back() {
    let config = GameConfig::default().with_first_player(Participant::Robot);
    let printed = toml::to_string_pretty(&config).unwrap();
    let reloaded = GameConfig::from_toml(&printed).unwrap();
    assert_eq!(*reloaded.first_player(), Participant::Robot);
    assert_eq!(reloaded.vision().model(), config.vision().model());
    assert_eq!(*reloaded.draw().origin_x(), *config.draw().origin_x());
}
