//! Knowing when the human has finished drawing.

use crate::config::GameConfig;
use crate::game::GameError;
use async_trait::async_trait;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncWrite, AsyncWriteExt, Lines};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

/// Signals that the human's mark is on the sheet.
#[async_trait]
pub trait TurnGate: Send {
    /// Waits until the human's turn is done; `false` abandons the game.
    async fn human_turn_done(&mut self) -> Result<bool, GameError>;
}

struct Console<R, W> {
    input: Lines<R>,
    output: W,
}

/// One terminal shared by everything that talks to the operator.
///
/// Clones read from the same buffered input, so a line typed for one
/// question is never swallowed by another reader.
pub struct OperatorConsole<R, W> {
    inner: Arc<Mutex<Console<R, W>>>,
}

impl<R, W> Clone for OperatorConsole<R, W> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R, W> OperatorConsole<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    /// Wraps the operator's input lines and output stream.
    pub fn new(input: Lines<R>, output: W) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Console { input, output })),
        }
    }

    /// Prints `text` without waiting for an answer.
    pub async fn say(&self, text: &str) -> io::Result<()> {
        let mut console = self.inner.lock().await;
        console.output.write_all(text.as_bytes()).await?;
        console.output.flush().await
    }

    /// Prints `question` and reads one answer line; `y`/`yes` is consent.
    ///
    /// A closed input is an error so that an unattended run cannot hang.
    pub async fn ask(&self, question: &str) -> io::Result<bool> {
        let mut console = self.inner.lock().await;
        console.output.write_all(question.as_bytes()).await?;
        console.output.flush().await?;
        let line = console.input.next_line().await?.ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "operator input closed")
        })?;
        let answer = line.trim().to_ascii_lowercase();
        Ok(answer == "y" || answer == "yes")
    }
}

impl<R> OperatorConsole<R, Vec<u8>> {
    /// Everything printed so far, for consoles writing into memory.
    pub async fn transcript(&self) -> String {
        String::from_utf8_lossy(&self.inner.lock().await.output).into_owned()
    }
}

/// Asks on the operator console and waits for a `y` line.
pub struct ConfirmGate<R, W> {
    console: OperatorConsole<R, W>,
}

impl<R, W> ConfirmGate<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    /// Creates a gate asking on `console`.
    pub fn new(console: OperatorConsole<R, W>) -> Self {
        Self { console }
    }
}

#[async_trait]
impl<R, W> TurnGate for ConfirmGate<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    #[instrument(skip(self))]
    async fn human_turn_done(&mut self) -> Result<bool, GameError> {
        self.console
            .ask("Your move done? [y/n] ")
            .await
            .map_err(|e| GameError::Gate(e.to_string()))
    }
}

/// Gives the human a fixed time to draw.
#[derive(Debug, Clone, Copy)]
pub struct DelayGate {
    delay: Duration,
}

impl DelayGate {
    /// Creates a gate that waits `delay` every human turn.
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl TurnGate for DelayGate {
    async fn human_turn_done(&mut self) -> Result<bool, GameError> {
        debug!(delay_ms = self.delay.as_millis() as u64, "Waiting for the human");
        tokio::time::sleep(self.delay).await;
        Ok(true)
    }
}

/// Picks the gate for a real game: a fixed wait when `human_delay_ms` is
/// set, a terminal confirmation otherwise.
pub fn human_gate<R, W>(config: &GameConfig, console: OperatorConsole<R, W>) -> Box<dyn TurnGate>
where
    R: AsyncBufRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    match config.human_delay() {
        Some(delay) => {
            info!(delay_ms = delay.as_millis() as u64, "Unattended human turns");
            Box::new(DelayGate::new(delay))
        }
        None => Box::new(ConfirmGate::new(console)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, BufReader};

    fn console(answers: &'static [u8]) -> OperatorConsole<BufReader<&'static [u8]>, Vec<u8>> {
        OperatorConsole::new(BufReader::new(answers).lines(), Vec::new())
    }

    #[tokio::test]
    async fn test_confirm_gate_answers() {
        let mut gate = ConfirmGate::new(console(b"Y\nno\n"));
        assert!(gate.human_turn_done().await.unwrap());
        assert!(!gate.human_turn_done().await.unwrap());
        assert!(matches!(
            gate.human_turn_done().await,
            Err(GameError::Gate(_))
        ));
    }

    #[tokio::test]
    async fn test_clones_take_turns_on_one_input() {
        let shared = console(b"y\nn\ny\n");
        let first = shared.clone();
        let second = shared.clone();
        assert!(first.ask("a? ").await.unwrap());
        assert!(!second.ask("b? ").await.unwrap());
        assert!(first.ask("c? ").await.unwrap());
        assert_eq!(shared.transcript().await, "a? b? c? ");
    }

    #[tokio::test]
    async fn test_delay_gate_always_proceeds() {
        let mut gate = DelayGate::new(Duration::from_millis(1));
        assert!(gate.human_turn_done().await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_configured_delay_never_reads_the_terminal() {
        let config = GameConfig::default().with_human_delay_ms(5_000);
        let mut gate = human_gate(&config, console(b""));
        assert!(gate.human_turn_done().await.unwrap());
    }

    #[tokio::test]
    async fn test_no_delay_asks_the_operator() {
        let shared = console(b"y\n");
        let mut gate = human_gate(&GameConfig::default(), shared.clone());
        assert!(gate.human_turn_done().await.unwrap());
        assert_eq!(shared.transcript().await, "Your move done? [y/n] ");
    }
}
