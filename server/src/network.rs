//! TCP listener that pairs players into game instances

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::game::{GameInstance, GameOutcome};
use crate::lobby::Lobby;
use log::{error, info};
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Accepts connections and starts a game for every pair of players
pub struct Server {
    listener: TcpListener,
    config: ServerConfig,
}

impl Server {
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(&config.addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: config.addr.clone(),
                source,
            })?;
        info!("Server listening on {}", config.addr);

        Ok(Server { listener, config })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections until a full set of players has joined
    ///
    /// Accept failures are logged and the lobby keeps listening.
    pub async fn accept_game(&mut self) -> GameInstance {
        info!("Listening for player connections...");
        let mut lobby = Lobby::new();

        // Fill every player slot before the game starts

        while !lobby.is_full() {
            match self.listener.accept().await {
                Ok((stream, addr)) => match lobby.add_player(stream) {
                    Ok(slot) => info!("Player {} connected from {}", slot, addr),
                    Err(e) => error!("Failed to add player from {}: {}", addr, e),
                },
                Err(e) => {
                    // Back off briefly and keep listening
                    error!("Failed to accept connection: {}", e);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            }
        }

        lobby.into_game(self.config.turn_timeout)
    }

    /// Main accept loop
    ///
    /// Every game instance runs on its own task while the listener goes
    /// straight back to accepting the next pair. With `max_games` set, the
    /// loop stops after that many games and waits for them to finish.
    pub async fn run(mut self) -> Result<(), ServerError> {
        let mut games: Vec<JoinHandle<()>> = Vec::new();
        let mut started = 0;

        while self.config.max_games.map_or(true, |max| started < max) {
            let game = self.accept_game().await;
            started += 1;
            let game_id = started;

            info!("Starting game instance {}", game_id);
            // Forget games that have already ended
            games.retain(|handle| !handle.is_finished());
            games.push(tokio::spawn(run_game(game_id, game)));
        }

        // Wait for running games before returning
        for handle in games {
            if let Err(e) = handle.await {
                error!("Game task panicked: {}", e);
            }
        }

        info!("Server finished after {} games", started);
        Ok(())
    }
}

async fn run_game(game_id: usize, game: GameInstance) {
    match game.run().await {
        Ok(GameOutcome::Win { slot, mark }) => {
            info!("Game {}: player {} ({}) won", game_id, slot + 1, mark)
        }
        Ok(GameOutcome::Draw) => info!("Game {}: draw", game_id),
        Ok(GameOutcome::Disconnected { slot }) => {
            info!("Game {}: player {} disconnected", game_id, slot + 1)
        }
        Err(e) => error!("Game {}: {}", game_id, e),
    }
}
