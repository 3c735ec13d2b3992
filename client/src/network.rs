//! Connection to the game server and the client-side game loop

use crate::input::{parse_move, MOVE_PROMPT};
use crate::rendering::{render, render_board};
use log::{debug, info};
use shared::{decode_line, encode_line, Board, ClientResponse, Mark, ServerMessage};
use std::io::Write;
use thiserror::Error;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Lines,
};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON message: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to connect: {0}")]
    Rejected(String),
    #[error("server closed the connection")]
    ConnectionClosed,
    #[error("move prompt without a mark: {0:?}")]
    MissingMark(String),
}

pub struct Client<R, W> {
    server: Lines<BufReader<R>>,
    writer: W,
    player_id: usize,
    board: Board,
}

impl Client<OwnedReadHalf, OwnedWriteHalf> {
    /// Connects and completes the handshake, returning the welcome message
    pub async fn connect(addr: &str) -> Result<(Self, ServerMessage), ClientError> {
        info!("Connecting to {}", addr);
        let stream = TcpStream::connect(addr).await?;
        let (reader, writer) = stream.into_split();
        Self::handshake(reader, writer).await
    }
}

impl<R, W> Client<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Reads the welcome message; a non-ok welcome refuses the connection
    pub async fn handshake(reader: R, writer: W) -> Result<(Self, ServerMessage), ClientError> {
        let mut server = BufReader::new(reader).lines();
        let line = server
            .next_line()
            .await?
            .ok_or(ClientError::ConnectionClosed)?;
        let welcome: ServerMessage = decode_line(&line)?;
        if !welcome.ok {
            return Err(ClientError::Rejected(welcome.message));
        }

        info!("Joined as player {}", welcome.player_id);
        let client = Client {
            server,
            writer,
            player_id: welcome.player_id,
            board: welcome.board,
        };
        Ok((client, welcome))
    }

    pub fn player_id(&self) -> usize {
        self.player_id
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Plays until the server sends a terminal message, which is returned
    ///
    /// Moves are read from `input` one line at a time and re-asked until they
    /// are valid for the local board. If `input` runs dry the client tells
    /// the server it is leaving and waits for the final message.
    pub async fn run<I, O>(
        &mut self,
        input: &mut Lines<I>,
        out: &mut O,
    ) -> Result<ServerMessage, ClientError>
    where
        I: AsyncBufRead + Unpin,
        O: Write,
    {
        loop {
            let line = self
                .server
                .next_line()
                .await?
                .ok_or(ClientError::ConnectionClosed)?;
            let msg: ServerMessage = decode_line(&line)?;

            self.board = msg.board;
            write!(out, "{}", render(&msg))?;
            if msg.is_terminal() {
                return Ok(msg);
            }

            let mark = msg
                .acting_mark()
                .ok_or_else(|| ClientError::MissingMark(msg.message.clone()))?;

            match self.read_move(input, out).await? {
                Some((row, col)) => self.play(row, col, mark, out).await?,
                None => {
                    debug!("Input closed, leaving the game");
                    self.send(&ClientResponse::leave(self.player_id)).await?;
                }
            }
        }
    }

    async fn read_move<I, O>(
        &self,
        input: &mut Lines<I>,
        out: &mut O,
    ) -> Result<Option<(i64, i64)>, ClientError>
    where
        I: AsyncBufRead + Unpin,
        O: Write,
    {
        loop {
            write!(out, "{}", MOVE_PROMPT)?;
            out.flush()?;

            let Some(line) = input.next_line().await? else {
                return Ok(None);
            };
            match parse_move(&line, &self.board) {
                Ok(choice) => return Ok(Some(choice)),
                Err(e) => writeln!(out, "{}", e)?,
            }
        }
    }

    async fn play<O: Write>(
        &mut self,
        row: i64,
        col: i64,
        mark: Mark,
        out: &mut O,
    ) -> Result<(), ClientError> {
        self.send(&ClientResponse::new(row, col, self.player_id))
            .await?;

        // Show the move right away; the server's next update is authoritative.
        if self.board.place(row, col, mark).is_ok() {
            write!(out, "{}", render_board(&self.board))?;
        }
        writeln!(out, "Waiting for server...")?;
        Ok(())
    }

    async fn send(&mut self, reply: &ClientResponse) -> Result<(), ClientError> {
        let line = encode_line(reply)?;
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }
}
