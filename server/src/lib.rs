//! # Tic-Tac-Toe Game Server Library
//!
//! Authoritative server for two-player tic-tac-toe over TCP. Clients exchange
//! newline-delimited JSON messages with the server; the server owns the only
//! real board, enforces turn order and move legality, and decides when a game
//! is won, drawn or abandoned.
//!
//! ## Architecture
//!
//! ### One Task Per Connection
//! Every accepted connection is served by a connection worker task that
//! translates between the byte stream and two in-process channels: a command
//! channel carrying messages for that player, and one inbound channel shared
//! by both players carrying their replies back.
//!
//! ### One Task Per Game
//! A game coordinator owns the board and the turn index. It prompts the
//! active player, waits for the reply on the shared inbound channel, checks
//! that the reply came from the prompted player, validates and applies the
//! move, and broadcasts the final result. Workers never touch the board; all
//! coordination is message passing.
//!
//! ### Clean Termination
//! Every game ends with a final `Ok=false` message to each player, whatever
//! the cause: victory, draw, a player leaving or a turn desync. The
//! coordinator then waits until every worker has closed its connection
//! before the game's channels are released.
//!
//! ## Module Organization
//!
//! - `config`: listen address, optional turn deadline, game count limit
//! - `connection`: the per-connection worker
//! - `game`: the coordinator and its turn loop
//! - `lobby`: pairs connections into slots and builds game instances
//! - `network`: the TCP listener and accept loop
//! - `error`: error types for each layer
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::config::ServerConfig;
//! use server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = Server::bind(ServerConfig::default()).await?;
//!
//!     // Accepts pairs of players forever, one game task per pair
//!     server.run().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod game;
pub mod lobby;
pub mod network;
