//! Turn-by-turn coordination of the human, the robot and the referee.

use super::{GameError, GameOutcome, GameState, Participant, TurnStage};
use crate::config::GameConfig;
use crate::draw::DrawSink;
use crate::gate::TurnGate;
use crate::vision::{VisionSource, grid_prompt};
use inkplay_engine::{
    AcceptedTurn, Board, Position, RawGrid, Strategy, Symbol, TurnValidator, check_winner,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

/// Fewest accepted turns before anyone can hold a line.
const FIRST_POSSIBLE_WIN_TURN: usize = 5;

/// Messages sent from the game loop to a front end.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// A turn began.
    TurnStarted {
        /// Turn number, starting at 1.
        turn: usize,
        /// Who moves.
        mover: Participant,
    },
    /// The strategy picked the robot's cell.
    RobotMoveChosen {
        /// Chosen cell.
        position: Position,
        /// Symbol to draw.
        symbol: Symbol,
    },
    /// A photograph was accepted as the new board.
    MoveAccepted {
        /// Turn number.
        turn: usize,
        /// Who moved.
        mover: Participant,
        /// Cell that changed.
        position: Position,
        /// Accepted board.
        board: Board,
    },
    /// A capture failed and is being repeated.
    CaptureRetried {
        /// Turn number (0 for the blank-sheet check).
        turn: usize,
        /// Failed attempt, starting at 1.
        attempt: u32,
        /// What went wrong.
        reason: String,
    },
    /// The game ended.
    GameOver {
        /// Result.
        outcome: GameOutcome,
    },
}

/// The external collaborators of one game.
pub struct Collaborators {
    /// Photographs and reads the sheet.
    pub vision: Box<dyn VisionSource>,
    /// Draws the robot's moves.
    pub sink: Box<dyn DrawSink>,
    /// Tells when the human is done.
    pub gate: Box<dyn TurnGate>,
}

/// Runs one game from blank sheet to outcome.
pub struct Orchestrator {
    config: GameConfig,
    strategy: Box<dyn Strategy>,
    vision: Box<dyn VisionSource>,
    sink: Box<dyn DrawSink>,
    gate: Box<dyn TurnGate>,
    validator: TurnValidator,
    state: GameState,
    prompt: String,
    event_tx: mpsc::UnboundedSender<GameEvent>,
}

impl Orchestrator {
    /// Creates a game; nothing happens until [`Self::run`].
    pub fn new(
        config: GameConfig,
        strategy: Box<dyn Strategy>,
        collaborators: Collaborators,
        event_tx: mpsc::UnboundedSender<GameEvent>,
    ) -> Self {
        let state = GameState::new(*config.first_player(), config.symbols());
        let prompt = grid_prompt(*config.capture().rotate_180());
        Self {
            config,
            strategy,
            vision: collaborators.vision,
            sink: collaborators.sink,
            gate: collaborators.gate,
            validator: TurnValidator::new(),
            state,
            prompt,
            event_tx,
        }
    }

    /// Current game state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// The validator and its ledger.
    pub fn validator(&self) -> &TurnValidator {
        &self.validator
    }

    /// Plays until a win, a draw or an error.
    ///
    /// Any error aborts the game: the outcome becomes
    /// [`GameOutcome::Aborted`] and the error is returned.
    #[instrument(skip(self), fields(strategy = self.strategy.name(), first = %self.state.to_move()))]
    pub async fn run(&mut self) -> Result<GameOutcome, GameError> {
        if self.state.is_over() {
            return Err(GameError::Frozen);
        }
        info!(
            human = %self.state.symbols().human(),
            robot = %self.state.symbols().ai(),
            "Starting game"
        );

        match self.play().await {
            Ok(outcome) => {
                self.emit(GameEvent::GameOver { outcome });
                Ok(outcome)
            }
            Err(e) => {
                error!(error = %e, turn = self.state.turn(), "Game aborted");
                self.state.abort();
                self.emit(GameEvent::GameOver {
                    outcome: GameOutcome::Aborted,
                });
                Err(e)
            }
        }
    }

    async fn play(&mut self) -> Result<GameOutcome, GameError> {
        if *self.config.verify_initial_board() {
            let observed = self.capture(0).await?;
            self.validator.validate_initial(&observed)?;
        }

        loop {
            let turn = self.state.turn() + 1;
            let mover = self.state.to_move();
            self.emit(GameEvent::TurnStarted { turn, mover });

            let accepted = match mover {
                Participant::Human => self.human_turn(turn).await?,
                Participant::Robot => self.robot_turn(turn).await?,
            };
            self.state.apply(&accepted)?;
            info!(turn, %mover, position = %accepted.position, board = %accepted.board, "Move accepted");
            self.emit(GameEvent::MoveAccepted {
                turn,
                mover,
                position: accepted.position,
                board: accepted.board,
            });

            if let Some(outcome) = self.judge()? {
                self.state.finish(outcome)?;
                return Ok(outcome);
            }
        }
    }

    async fn human_turn(&mut self, turn: usize) -> Result<AcceptedTurn, GameError> {
        debug!(turn, "Waiting for the human");
        if !self.gate.human_turn_done().await? {
            return Err(GameError::Cancelled);
        }
        let observed = self.capture(turn).await?;
        let symbol = self.state.symbol_of(Participant::Human);
        let accepted =
            self.validator
                .validate_turn(Some(self.state.board()), &observed, symbol, turn)?;
        Ok(accepted)
    }

    async fn robot_turn(&mut self, turn: usize) -> Result<AcceptedTurn, GameError> {
        let board = *self.state.board();
        let position = self.strategy.best_move(&board, self.state.symbols())?;
        let symbol = self.state.symbol_of(Participant::Robot);
        info!(turn, %position, %symbol, "Robot move chosen");
        self.emit(GameEvent::RobotMoveChosen { position, symbol });

        let drawn = tokio::time::timeout(
            self.config.draw_timeout(),
            self.sink.draw_symbol(position, symbol),
        )
        .await
        .map_err(|_| GameError::Timeout {
            stage: TurnStage::Draw,
        })??;
        if !drawn {
            return Err(GameError::DrawFailed { position });
        }

        tokio::time::sleep(self.config.settle_delay()).await;
        let observed = self.capture(turn).await?;
        let accepted =
            self.validator
                .validate_placement(Some(&board), &observed, symbol, turn, position)?;
        Ok(accepted)
    }

    /// Photographs the sheet, repeating failed or slow attempts.
    async fn capture(&mut self, turn: usize) -> Result<RawGrid, GameError> {
        let attempts = *self.config.max_capture_attempts();
        let mut attempt = 1;
        loop {
            let failure = match tokio::time::timeout(
                self.config.capture_timeout(),
                self.vision.capture_and_interpret(&self.prompt),
            )
            .await
            {
                Ok(Ok(grid)) => return Ok(grid),
                Ok(Err(e)) => GameError::Vision(e),
                Err(_) => GameError::Timeout {
                    stage: TurnStage::Capture,
                },
            };
            if attempt >= attempts || !failure.is_retryable_capture() {
                return Err(failure);
            }
            warn!(turn, attempt, error = %failure, "Capture failed, retrying");
            self.emit(GameEvent::CaptureRetried {
                turn,
                attempt,
                reason: failure.to_string(),
            });
            attempt += 1;
        }
    }

    fn judge(&self) -> Result<Option<GameOutcome>, GameError> {
        let turn = self.state.turn();
        if turn < FIRST_POSSIBLE_WIN_TURN {
            return Ok(None);
        }
        let symbols = self.state.symbols();
        let check = check_winner(self.state.board(), symbols.human(), symbols.ai());
        if check.is_conflicting() {
            return Err(GameError::ConflictingWinners);
        }
        let outcome = if check.a_wins {
            Some(GameOutcome::HumanWin)
        } else if check.b_wins {
            Some(GameOutcome::RobotWin)
        } else if turn >= 9 {
            Some(GameOutcome::Draw)
        } else {
            None
        };
        Ok(outcome)
    }

    fn emit(&self, event: GameEvent) {
        if self.event_tx.send(event).is_err() {
            debug!("Event receiver dropped");
        }
    }
}
