//! Per-connection worker bridging a client byte stream to the game channels
//!
//! Each accepted connection gets one worker task. The worker:
//! - Greets the client with a welcome message as soon as it starts
//! - Relays every [`ServerMessage`] from its command channel to the client
//! - Reads exactly one [`ClientResponse`] line after each non-terminal message
//!   and forwards it to the coordinator's shared inbound channel
//!
//! Any I/O or parse failure ends the worker and is reported to the
//! coordinator as a synthetic "player left" response. The worker never
//! retries I/O and never invents a move. However it exits, it closes the
//! stream and signals completion exactly once.

use crate::error::WorkerError;
use log::{debug, info, warn};
use shared::{decode_line, encode_line, Board, ClientResponse, ServerMessage};
use tokio::io::{self, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Lines};
use tokio::sync::mpsc;

pub const WELCOME_TEXT: &str = "Welcome. Please wait for the game to start...";

/// Handshake sent to a freshly connected player
pub fn welcome_message(slot: usize) -> ServerMessage {
    ServerMessage::new(Board::new(), slot, true, WELCOME_TEXT)
}

/// Why the relay loop stopped
#[derive(Debug, PartialEq, Eq)]
enum Departure {
    /// A terminal message was delivered to the client
    Terminal,
    /// The coordinator dropped the command channel
    CoordinatorClosed,
}

/// Signals the coordinator when dropped, whichever way the worker exits
struct CompletionSignal {
    slot: usize,
    done: mpsc::Sender<usize>,
}

impl Drop for CompletionSignal {
    fn drop(&mut self) {
        if self.done.try_send(self.slot).is_err() {
            debug!("Player {}: game instance no longer awaiting completion", self.slot);
        }
    }
}

/// A single player's connection worker
pub struct Connection<S> {
    slot: usize,
    stream: S,
    commands: mpsc::Receiver<ServerMessage>,
    responses: mpsc::Sender<ClientResponse>,
    done: mpsc::Sender<usize>,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Send + Unpin,
{
    pub fn new(
        slot: usize,
        stream: S,
        commands: mpsc::Receiver<ServerMessage>,
        responses: mpsc::Sender<ClientResponse>,
        done: mpsc::Sender<usize>,
    ) -> Self {
        Self {
            slot,
            stream,
            commands,
            responses,
            done,
        }
    }

    /// Runs the worker until the game ends for this player or the
    /// connection fails
    pub async fn run(self) {
        let Connection {
            slot,
            stream,
            mut commands,
            responses,
            done,
        } = self;
        let _completion = CompletionSignal { slot, done };

        let (reader, mut writer) = io::split(stream);
        let mut lines = BufReader::new(reader).lines();

        let result = relay(slot, &mut lines, &mut writer, &mut commands, &responses).await;

        match result {
            Ok(Departure::Terminal) => {
                debug!("Player {}: terminal message delivered", slot);
            }
            Ok(Departure::CoordinatorClosed) => {
                debug!("Player {}: command channel closed", slot);
                let _ = responses.send(ClientResponse::leave(slot)).await;
            }
            Err(e) => {
                info!("Player {} left: {}", slot, e);
                if responses.send(ClientResponse::leave(slot)).await.is_err() {
                    debug!("Player {}: coordinator gone before leave notice", slot);
                }
            }
        }

        if let Err(e) = writer.shutdown().await {
            debug!("Player {}: shutdown failed: {}", slot, e);
        }
    }
}

async fn relay<R, W>(
    slot: usize,
    lines: &mut Lines<BufReader<R>>,
    writer: &mut W,
    commands: &mut mpsc::Receiver<ServerMessage>,
    responses: &mpsc::Sender<ClientResponse>,
) -> Result<Departure, WorkerError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    write_message(writer, &welcome_message(slot)).await?;

    loop {
        let Some(message) = commands.recv().await else {
            return Ok(Departure::CoordinatorClosed);
        };
        write_message(writer, &message).await?;
        if message.is_terminal() {
            return Ok(Departure::Terminal);
        }

        // Wait for the reply, still relaying anything the coordinator sends
        // meanwhile (a terminal message after a turn deadline, for example).
        let reply = loop {
            tokio::select! {
                line = lines.next_line() => {
                    let line = line?.ok_or(WorkerError::ConnectionClosed)?;
                    break decode_line::<ClientResponse>(&line).map_err(WorkerError::Decode)?;
                }
                message = commands.recv() => {
                    let Some(message) = message else {
                        return Ok(Departure::CoordinatorClosed);
                    };
                    write_message(writer, &message).await?;
                    if message.is_terminal() {
                        return Ok(Departure::Terminal);
                    }
                }
            }
        };

        if responses.send(reply).await.is_err() {
            return Ok(Departure::CoordinatorClosed);
        }
    }
}

async fn write_message<W>(writer: &mut W, message: &ServerMessage) -> Result<(), WorkerError>
where
    W: AsyncWrite + Unpin,
{
    let line = encode_line(message).map_err(WorkerError::Encode)?;
    if let Err(e) = writer.write_all(line.as_bytes()).await {
        warn!("Failed to write to player {}: {}", message.player_id, e);
        return Err(e.into());
    }
    writer.flush().await?;
    Ok(())
}
