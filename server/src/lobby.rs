//! Per-game pending state while players join
//!
//! A [`Lobby`] collects exactly [`REQUIRED_PLAYERS`] connections. Each one
//! gets a 0-based slot in join order, its own command channel and a
//! connection worker task. Once full, the lobby is turned into a
//! [`GameInstance`] that takes ownership of every channel. Slots and
//! channels are never reused across games.

use crate::config::PLAYER_CHANNEL_CAPACITY;
use crate::connection::Connection;
use crate::error::ServerError;
use crate::game::GameInstance;
use shared::{ClientResponse, ServerMessage, REQUIRED_PLAYERS};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;

pub struct Lobby {
    players: Vec<mpsc::Sender<ServerMessage>>,
    response_tx: mpsc::Sender<ClientResponse>,
    response_rx: mpsc::Receiver<ClientResponse>,
    done_tx: mpsc::Sender<usize>,
    done_rx: mpsc::Receiver<usize>,
}

impl Lobby {
    pub fn new() -> Self {
        let (response_tx, response_rx) = mpsc::channel(REQUIRED_PLAYERS);
        let (done_tx, done_rx) = mpsc::channel(REQUIRED_PLAYERS);

        Self {
            players: Vec::with_capacity(REQUIRED_PLAYERS),
            response_tx,
            response_rx,
            done_tx,
            done_rx,
        }
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= REQUIRED_PLAYERS
    }

    /// Binds a connection to the next free slot and spawns its worker
    ///
    /// Returns the assigned slot, or [`ServerError::GameFull`] once every
    /// slot is taken.
    pub fn add_player<S>(&mut self, stream: S) -> Result<usize, ServerError>
    where
        S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
    {
        if self.is_full() {
            return Err(ServerError::GameFull);
        }

        let slot = self.players.len();
        let (command_tx, command_rx) = mpsc::channel(PLAYER_CHANNEL_CAPACITY);
        self.players.push(command_tx);

        let connection = Connection::new(
            slot,
            stream,
            command_rx,
            self.response_tx.clone(),
            self.done_tx.clone(),
        );
        tokio::spawn(connection.run());

        Ok(slot)
    }

    /// Hands every channel over to a new game instance
    ///
    /// The lobby's own sender handles are dropped here, so the workers hold
    /// the only remaining senders of the shared channels.
    pub fn into_game(self, turn_timeout: Option<Duration>) -> GameInstance {
        GameInstance::new(self.players, self.response_rx, self.done_rx, turn_timeout)
    }
}

impl Default for Lobby {
    fn default() -> Self {
        Self::new()
    }
}
