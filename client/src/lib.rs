//! # Tic-Tac-Toe Terminal Client Library
//!
//! Client side of the two-player tic-tac-toe game. The client connects to
//! the server over TCP, completes the handshake, then mirrors the server's
//! board on the terminal and sends the moves typed by the player.
//!
//! The server is authoritative: the client only keeps a local copy of the
//! board for display and for rejecting obviously bad input before it is
//! sent. Every update from the server replaces the local copy.
//!
//! ## Module Organization
//!
//! - `input`: parses `"<row> <col>"` lines and validates them locally
//! - `network`: handshake, game loop and the newline-delimited JSON exchange
//! - `rendering`: clears the terminal and draws the board with its caption

pub mod input;
pub mod network;
pub mod rendering;
