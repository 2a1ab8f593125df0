//! Engine error taxonomy.

/// Error raised by the strategy engine or by board construction.
///
/// Every variant is terminal for the game in progress: the engine never
/// corrects a board on its own, it reports precisely what was wrong.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum EngineError {
    /// The input is not a well-formed 3x3 grid of known symbols.
    #[display("Malformed board: {}", _0)]
    MalformedBoard(String),

    /// The board is well-formed but cannot occur in a game still in progress.
    #[display("Illegal board state: {}", _0)]
    IllegalState(String),

    /// Every cell is already filled.
    #[display("No legal move available on a full board")]
    NoLegalMove,

    /// The machine and the human were assigned the same symbol.
    #[display("Machine and human symbols must differ")]
    SymbolsNotDistinct,
}

impl std::error::Error for EngineError {}
