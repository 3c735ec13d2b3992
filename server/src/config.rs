//! Server configuration

use shared::DEFAULT_SERVER_ADDR;
use std::time::Duration;

/// Capacity of each per-player command channel. At least one slot is needed
/// so a terminal broadcast never waits on a worker that is busy writing.
pub const PLAYER_CHANNEL_CAPACITY: usize = 1;

/// Runtime settings for the listener and the game instances it spawns
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the listener binds to
    pub addr: String,
    /// Deadline for the active player's reply; `None` waits forever
    pub turn_timeout: Option<Duration>,
    /// Stop accepting after this many games; `None` loops forever
    pub max_games: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_SERVER_ADDR.to_string(),
            turn_timeout: None,
            max_games: None,
        }
    }
}

impl ServerConfig {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            ..Self::default()
        }
    }

    pub fn with_turn_timeout(mut self, turn_timeout: Duration) -> Self {
        self.turn_timeout = Some(turn_timeout);
        self
    }

    pub fn with_max_games(mut self, max_games: usize) -> Self {
        self.max_games = Some(max_games);
        self
    }
}
