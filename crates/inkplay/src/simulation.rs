//! Offline games on an in-memory sheet.
//!
//! [`SimulatedTable`] stands in for both the camera and the robot: drawing
//! writes to the sheet and a "photograph" reads it back exactly. Scripted
//! replies let tests feed the game loop the misreads a real camera produces.

use crate::config::GameConfig;
use crate::draw::{DrawError, DrawSink};
use crate::game::{Collaborators, GameError, GameOutcome, Orchestrator};
use crate::gate::TurnGate;
use crate::vision::{VisionError, VisionSource};
use async_trait::async_trait;
use inkplay_engine::{
    Board, MinimaxStrategy, Position, RawGrid, SearchCache, Square, Strategy, Symbol, SymbolPair,
};
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument};

/// A canned answer for the next capture.
#[derive(Debug, Clone)]
pub enum ScriptedCapture {
    /// Report this grid instead of the sheet.
    Grid(RawGrid),
    /// Fail with this message.
    Failure(String),
    /// Stall this long, then report the sheet.
    Stall(Duration),
}

#[derive(Debug, Default)]
struct TableState {
    sheet: Board,
    script: VecDeque<ScriptedCapture>,
    refuse_draws: bool,
    captures: usize,
    draws: usize,
}

/// Shared in-memory sheet; clones are handles to the same table.
#[derive(Debug, Clone, Default)]
pub struct SimulatedTable {
    inner: Arc<Mutex<TableState>>,
}

impl SimulatedTable {
    /// A table with a blank sheet.
    pub fn new() -> Self {
        Self::default()
    }

    /// A table whose sheet already holds marks.
    pub fn with_sheet(sheet: Board) -> Self {
        let table = Self::default();
        table.lock().sheet = sheet;
        table
    }

    fn lock(&self) -> MutexGuard<'_, TableState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current sheet.
    pub fn sheet(&self) -> Board {
        self.lock().sheet
    }

    /// Puts a mark on the sheet.
    pub fn mark(&self, position: Position, symbol: Symbol) {
        self.lock().sheet.set(position, Square::Occupied(symbol));
    }

    /// Queues a canned answer; captures consume the queue before reading the sheet.
    pub fn script(&self, capture: ScriptedCapture) {
        self.lock().script.push_back(capture);
    }

    /// Makes every later draw request report failure.
    pub fn refuse_draws(&self) {
        self.lock().refuse_draws = true;
    }

    /// Number of captures taken.
    pub fn captures(&self) -> usize {
        self.lock().captures
    }

    /// Number of draw requests received.
    pub fn draws(&self) -> usize {
        self.lock().draws
    }
}

#[async_trait]
impl VisionSource for SimulatedTable {
    async fn capture_and_interpret(&mut self, _prompt: &str) -> Result<RawGrid, VisionError> {
        let scripted = {
            let mut table = self.lock();
            table.captures += 1;
            table.script.pop_front()
        };
        match scripted {
            None => Ok(self.sheet().to_grid()),
            Some(ScriptedCapture::Grid(grid)) => Ok(grid),
            Some(ScriptedCapture::Failure(message)) => Err(VisionError::new(message)),
            Some(ScriptedCapture::Stall(delay)) => {
                tokio::time::sleep(delay).await;
                Ok(self.sheet().to_grid())
            }
        }
    }
}

#[async_trait]
impl DrawSink for SimulatedTable {
    async fn draw_symbol(&mut self, position: Position, symbol: Symbol) -> Result<bool, DrawError> {
        let mut table = self.lock();
        table.draws += 1;
        if table.refuse_draws {
            return Ok(false);
        }
        table.sheet.set(position, Square::Occupied(symbol));
        Ok(true)
    }
}

/// How the simulated human chooses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum OpponentKind {
    /// Uniformly random empty cell.
    Random,
    /// Optimal play.
    Perfect,
}

enum Policy {
    Random(ChaCha8Rng),
    Perfect(MinimaxStrategy),
}

/// A human opponent that marks the sheet itself when asked whether it is done.
pub struct SimulatedHuman {
    table: SimulatedTable,
    symbol: Symbol,
    policy: Policy,
}

impl SimulatedHuman {
    /// Creates an opponent drawing `symbol` on `table`.
    ///
    /// `seed` drives the random policy; the perfect policy memoizes into `cache`.
    pub fn new(
        table: SimulatedTable,
        symbol: Symbol,
        kind: OpponentKind,
        seed: u64,
        cache: SearchCache,
    ) -> Self {
        let policy = match kind {
            OpponentKind::Random => Policy::Random(ChaCha8Rng::seed_from_u64(seed)),
            OpponentKind::Perfect => Policy::Perfect(MinimaxStrategy::with_cache(cache)),
        };
        Self {
            table,
            symbol,
            policy,
        }
    }

    fn choose(&mut self, sheet: &Board) -> Result<Position, GameError> {
        match &mut self.policy {
            Policy::Random(rng) => sheet
                .empty_positions()
                .choose(rng)
                .copied()
                .ok_or_else(|| GameError::Gate("no empty cell left for the human".to_string())),
            Policy::Perfect(strategy) => {
                Ok(strategy.best_move(sheet, SymbolPair::for_ai(self.symbol))?)
            }
        }
    }
}

#[async_trait]
impl TurnGate for SimulatedHuman {
    async fn human_turn_done(&mut self) -> Result<bool, GameError> {
        let sheet = self.table.sheet();
        let position = self.choose(&sheet)?;
        debug!(%position, symbol = %self.symbol, "Simulated human marks the sheet");
        self.table.mark(position, self.symbol);
        Ok(true)
    }
}

/// Plays one offline game against a simulated human.
#[instrument(skip(config, cache), fields(first = %config.first_player(), strategy = %config.strategy()))]
pub async fn simulate_game(
    config: GameConfig,
    opponent: OpponentKind,
    seed: u64,
    cache: SearchCache,
) -> Result<GameOutcome, GameError> {
    let config = config.with_settle_delay_ms(0);
    let table = SimulatedTable::new();
    let human = SimulatedHuman::new(
        table.clone(),
        config.symbols().human(),
        opponent,
        seed,
        cache.clone(),
    );
    let strategy = config.strategy().build(cache);
    let collaborators = Collaborators {
        vision: Box::new(table.clone()),
        sink: Box::new(table),
        gate: Box::new(human),
    };
    let (event_tx, _event_rx) = mpsc::unbounded_channel();
    Orchestrator::new(config, strategy, collaborators, event_tx)
        .run()
        .await
}

/// Results of a batch of simulated games.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    /// Games the human won.
    pub human_wins: usize,
    /// Games the robot won.
    pub robot_wins: usize,
    /// Drawn games.
    pub draws: usize,
    /// Games that ended in an error.
    pub aborted: usize,
}

impl Tally {
    /// Counts one result.
    pub fn record(&mut self, result: &Result<GameOutcome, GameError>) {
        match result {
            Ok(GameOutcome::HumanWin) => self.human_wins += 1,
            Ok(GameOutcome::RobotWin) => self.robot_wins += 1,
            Ok(GameOutcome::Draw) => self.draws += 1,
            Ok(GameOutcome::Aborted) | Err(_) => self.aborted += 1,
        }
    }

    /// Total games counted.
    pub fn games(&self) -> usize {
        self.human_wins + self.robot_wins + self.draws + self.aborted
    }
}

impl std::fmt::Display for Tally {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} games: robot {} / human {} / draw {} / aborted {}",
            self.games(),
            self.robot_wins,
            self.human_wins,
            self.draws,
            self.aborted
        )
    }
}

/// Plays `games` offline games; game `i` uses seed `seed + i`.
pub async fn simulate(
    config: &GameConfig,
    opponent: OpponentKind,
    games: usize,
    seed: u64,
    cache: SearchCache,
) -> Tally {
    let mut tally = Tally::default();
    for game in 0..games {
        let result = simulate_game(
            config.clone(),
            opponent,
            seed.wrapping_add(game as u64),
            cache.clone(),
        )
        .await;
        tally.record(&result);
    }
    info!(%tally, %opponent, "Simulation finished");
    tally
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_table_reads_back_drawn_marks() {
        let mut table = SimulatedTable::new();
        assert!(table.draw_symbol(Position::Center, Symbol::O).await.unwrap());
        let grid = table.capture_and_interpret("").await.unwrap();
        assert_eq!(grid[1][1], "O");
        assert_eq!((table.draws(), table.captures()), (1, 1));
    }

    #[tokio::test]
    async fn test_scripted_captures_come_first() {
        let mut table = SimulatedTable::new();
        table.script(ScriptedCapture::Failure("lens cap".to_string()));
        assert!(table.capture_and_interpret("").await.is_err());
        assert!(table.capture_and_interpret("").await.is_ok());
    }

    #[tokio::test]
    async fn test_random_human_is_seeded() {
        let pick = |seed| async move {
            let table = SimulatedTable::new();
            let mut human = SimulatedHuman::new(
                table.clone(),
                Symbol::X,
                OpponentKind::Random,
                seed,
                SearchCache::new(),
            );
            human.human_turn_done().await.unwrap();
            table.sheet()
        };
        assert_eq!(pick(7).await, pick(7).await);
        assert_eq!(pick(7).await.filled_count(), 1);
    }

    #[test]
    fn test_tally_counts() {
        let mut tally = Tally::default();
        tally.record(&Ok(GameOutcome::Draw));
        tally.record(&Err(GameError::Cancelled));
        assert_eq!(tally.games(), 2);
        assert_eq!(tally.aborted, 1);
    }
}
