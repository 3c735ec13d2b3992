//! Error types for the listener, the connection workers and game instances

use shared::BoardError;
use thiserror::Error;

/// Faults that end a game instance abnormally
#[derive(Debug, Error)]
pub enum GameError {
    #[error("not enough players: expected {expected}, found {found}")]
    NotEnoughPlayers { expected: usize, found: usize },

    /// A reply came from a player other than the one prompted
    #[error("player turns desynced: expected player {expected}, got player {actual}")]
    Desync { expected: usize, actual: usize },

    #[error("board rejected a validated move: {0}")]
    Board(#[from] BoardError),
}

/// Faults local to one connection; the game sees them as that player leaving
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("connection I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode server message: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("malformed client response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("connection closed by peer")]
    ConnectionClosed,
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("game is full")]
    GameFull,
}
