//! Protocol types shared by the tic-tac-toe server and client
//!
//! Messages travel as newline-delimited JSON over a plain TCP stream, one
//! object per line. The server sends [`ServerMessage`]s and each client
//! answers move prompts with a [`ClientResponse`].

pub mod board;

pub use board::{Board, BoardError, Cell, Mark, BOARD_SIZE};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub const REQUIRED_PLAYERS: usize = 2;
pub const DEFAULT_SERVER_ADDR: &str = "127.0.0.1:1337";

/// Update or command sent from the server to one client
///
/// `ok == false` is terminal: the client shows the text and disconnects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServerMessage {
    pub board: Board,
    #[serde(rename = "PlayerID")]
    pub player_id: usize,
    pub ok: bool,
    pub message: String,
    /// Acting mark on move prompts, winning mark on win announcements
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mark: Option<Mark>,
}

impl ServerMessage {
    pub fn new(board: Board, player_id: usize, ok: bool, message: impl Into<String>) -> Self {
        Self {
            board,
            player_id,
            ok,
            message: message.into(),
            mark: None,
        }
    }

    pub fn with_mark(mut self, mark: Mark) -> Self {
        self.mark = Some(mark);
        self
    }

    pub fn is_terminal(&self) -> bool {
        !self.ok
    }

    /// Mark the recipient should play
    ///
    /// Prefers the structured `Mark` field and falls back to the last
    /// character of the text, which older servers use to carry it.
    pub fn acting_mark(&self) -> Option<Mark> {
        self.mark
            .or_else(|| self.message.chars().last().and_then(Mark::from_char))
    }
}

/// Move (or departure) sent from a client to the server
///
/// `ok == false` means the sender is leaving and `row`/`col` carry nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ClientResponse {
    #[serde(default)]
    pub row: i64,
    #[serde(default)]
    pub col: i64,
    #[serde(rename = "PlayerID")]
    pub player_id: usize,
    pub ok: bool,
}

impl ClientResponse {
    pub fn new(row: i64, col: i64, player_id: usize) -> Self {
        Self {
            row,
            col,
            player_id,
            ok: true,
        }
    }

    /// Response announcing that `player_id` has left the game
    pub fn leave(player_id: usize) -> Self {
        Self {
            row: 0,
            col: 0,
            player_id,
            ok: false,
        }
    }
}

/// Serializes a message as a single JSON line, trailing newline included
pub fn encode_line<T: Serialize>(message: &T) -> Result<String, serde_json::Error> {
    let mut line = serde_json::to_string(message)?;
    line.push('\n');
    Ok(line)
}

/// Parses one JSON line; surrounding whitespace is ignored
pub fn decode_line<T: DeserializeOwned>(line: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str(line.trim())
}
