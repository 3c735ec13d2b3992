//! Game coordinator owning the authoritative board and turn order
//!
//! A [`GameInstance`] drives one game from an empty board to a terminal
//! condition. It talks to the connection workers only through channels:
//! one command channel per player and a single inbound channel shared by
//! both players. Because both players multiplex onto the same inbound
//! channel, every reply is checked against the player that was prompted;
//! a reply from anyone else is a desync, not something to reorder.
//!
//! The turn loop is
//! `AwaitingMove -> Validating -> Applying -> CheckEnd -> AwaitingMove | Terminal`.
//! Every terminal path broadcasts a final `ok == false` message and then
//! waits for all workers to finish before the instance is torn down.

use crate::error::GameError;
use log::{debug, info, warn};
use shared::{Board, ClientResponse, Mark, ServerMessage, REQUIRED_PLAYERS};
use std::time::Duration;
use tokio::sync::mpsc;

pub const DISCONNECT_TEXT: &str = "player disconnected";
pub const DESYNC_TEXT: &str = "player turns desynced";
pub const DRAW_TEXT: &str = "It's a draw!";

pub fn move_prompt_text(mark: Mark) -> String {
    format!("Make your move {}", mark)
}

pub fn retry_prompt_text(mark: Mark) -> String {
    format!("Invalid tile, try again {}", mark)
}

/// Players are announced 1-based: slot 0 is "Player 1"
pub fn win_text(slot: usize) -> String {
    format!("Player {} won!", slot + 1)
}

/// How a game instance ended without a fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Win { slot: usize, mark: Mark },
    Draw,
    /// A player left, lost its connection or missed the turn deadline
    Disconnected { slot: usize },
}

pub struct GameInstance {
    board: Board,
    players: Vec<mpsc::Sender<ServerMessage>>,
    responses: mpsc::Receiver<ClientResponse>,
    completions: mpsc::Receiver<usize>,
    turn_timeout: Option<Duration>,
}

impl GameInstance {
    pub fn new(
        players: Vec<mpsc::Sender<ServerMessage>>,
        responses: mpsc::Receiver<ClientResponse>,
        completions: mpsc::Receiver<usize>,
        turn_timeout: Option<Duration>,
    ) -> Self {
        Self {
            board: Board::new(),
            players,
            responses,
            completions,
            turn_timeout,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Plays the game to completion, then releases every channel
    pub async fn run(mut self) -> Result<GameOutcome, GameError> {
        let result = self.start().await;
        self.close();
        result
    }

    /// Runs the turn loop until a win, a draw, a departure or a desync
    ///
    /// Invalid moves are answered with a fresh prompt to the same player, with
    /// no limit on the number of attempts; only a departure, a desync or the
    /// optional turn deadline ends a turn without a move.
    pub async fn start(&mut self) -> Result<GameOutcome, GameError> {
        if self.players.len() != REQUIRED_PLAYERS {
            return Err(GameError::NotEnoughPlayers {
                expected: REQUIRED_PLAYERS,
                found: self.players.len(),
            });
        }

        let mut turn = 0;
        loop {
            let mark = Mark::for_slot(turn);
            let mut prompt_text = move_prompt_text(mark);

            let reply = loop {
                let prompt =
                    ServerMessage::new(self.board, turn, true, prompt_text.clone()).with_mark(mark);
                self.send_to(turn, prompt).await;

                let reply = self.next_response(turn).await;

                if !reply.ok {
                    let slot = self.departed_slot(&reply, turn);
                    info!("Player {} disconnected", slot);
                    self.finish(ServerMessage::new(self.board, 0, false, DISCONNECT_TEXT))
                        .await;
                    return Ok(GameOutcome::Disconnected { slot });
                }

                if reply.player_id != turn {
                    warn!(
                        "Reply from player {} while waiting on player {}",
                        reply.player_id, turn
                    );
                    self.finish(ServerMessage::new(self.board, 0, false, DESYNC_TEXT))
                        .await;
                    return Err(GameError::Desync {
                        expected: turn,
                        actual: reply.player_id,
                    });
                }

                if self.board.is_legal_move(reply.row, reply.col) {
                    break reply;
                }

                debug!(
                    "Player {} chose invalid tile ({}, {})",
                    turn, reply.row, reply.col
                );
                prompt_text = retry_prompt_text(mark);
            };

            if let Err(e) = self.board.place(reply.row, reply.col, mark) {
                self.finish(ServerMessage::new(self.board, 0, false, DISCONNECT_TEXT))
                    .await;
                return Err(e.into());
            }

            if let Some(winner) = self.board.check_winner() {
                let slot = winner.slot();
                info!("Player {} won", slot + 1);
                self.finish(
                    ServerMessage::new(self.board, slot, false, win_text(slot)).with_mark(winner),
                )
                .await;
                return Ok(GameOutcome::Win { slot, mark: winner });
            }

            if self.board.check_draw() {
                info!("It's a draw");
                self.finish(ServerMessage::new(self.board, 0, false, DRAW_TEXT))
                    .await;
                return Ok(GameOutcome::Draw);
            }

            turn = (turn + 1) % REQUIRED_PLAYERS;
        }
    }

    /// Drops every channel owned by this game instance
    pub fn close(self) {
        debug!("Closing {} player channels", self.players.len());
    }

    /// Slot to blame for a leave notice; an unknown sender id falls back to
    /// the active player
    fn departed_slot(&self, reply: &ClientResponse, turn: usize) -> usize {
        if reply.player_id < self.players.len() {
            reply.player_id
        } else {
            warn!("Leave notice from unknown player {}", reply.player_id);
            turn
        }
    }

    async fn send_to(&self, slot: usize, message: ServerMessage) {
        if self.players[slot].send(message).await.is_err() {
            // The worker is gone; its leave notice is already queued.
            debug!("Player {} is no longer receiving", slot);
        }
    }

    /// Sends the same message to every player
    ///
    /// A player whose worker has already exited is skipped: its receiver is
    /// dropped, so the send fails immediately instead of blocking.
    async fn broadcast(&self, message: ServerMessage) {
        for slot in 0..self.players.len() {
            self.send_to(slot, message.clone()).await;
        }
    }

    async fn finish(&mut self, message: ServerMessage) {
        self.broadcast(message).await;
        self.wait().await;
    }

    /// Next reply on the shared inbound channel, in arrival order
    ///
    /// A missed deadline or a closed channel reads as the active player
    /// leaving.
    async fn next_response(&mut self, turn: usize) -> ClientResponse {
        let reply = match self.turn_timeout {
            Some(limit) => match tokio::time::timeout(limit, self.responses.recv()).await {
                Ok(reply) => reply,
                Err(_) => {
                    warn!("Player {} timed out after {:?}", turn, limit);
                    None
                }
            },
            None => self.responses.recv().await,
        };

        reply.unwrap_or_else(|| ClientResponse::leave(turn))
    }

    /// Blocks until every worker has signaled completion
    ///
    /// Stale replies still arriving on the inbound channel are drained and
    /// discarded so no worker can stall on a full channel.
    async fn wait(&mut self) {
        let mut remaining = self.players.len();

        while remaining > 0 {
            tokio::select! {
                slot = self.completions.recv() => match slot {
                    Some(slot) => {
                        debug!("Player {} worker finished", slot);
                        remaining -= 1;
                    }
                    None => break,
                },
                Some(stale) = self.responses.recv() => {
                    debug!("Discarding response from player {} after game end", stale.player_id);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Cell;
    use tokio::task::JoinHandle;

    /// Stands in for the connection workers of one game
    struct Players {
        commands: Vec<mpsc::Receiver<ServerMessage>>,
        responses: mpsc::Sender<ClientResponse>,
        done: mpsc::Sender<usize>,
    }

    impl Players {
        async fn expect_prompt(&mut self, slot: usize) -> ServerMessage {
            let msg = self.commands[slot].recv().await.unwrap();
            assert!(msg.ok, "expected a prompt, got {:?}", msg);
            assert_eq!(msg.player_id, slot);
            msg
        }

        async fn play(&mut self, slot: usize, row: i64, col: i64) {
            self.expect_prompt(slot).await;
            self.responses
                .send(ClientResponse::new(row, col, slot))
                .await
                .unwrap();
        }

        async fn expect_terminal(&mut self) -> ServerMessage {
            let first = self.commands[0].recv().await.unwrap();
            let second = self.commands[1].recv().await.unwrap();
            assert!(!first.ok);
            assert_eq!(first, second);
            first
        }

        async fn finish_workers(&self) {
            for slot in 0..self.commands.len() {
                self.done.send(slot).await.unwrap();
            }
        }
    }

    fn game_with(count: usize, turn_timeout: Option<Duration>) -> (GameInstance, Players) {
        let mut senders = Vec::new();
        let mut commands = Vec::new();
        for _ in 0..count {
            let (tx, rx) = mpsc::channel(1);
            senders.push(tx);
            commands.push(rx);
        }
        let (response_tx, response_rx) = mpsc::channel(REQUIRED_PLAYERS);
        let (done_tx, done_rx) = mpsc::channel(REQUIRED_PLAYERS);

        let game = GameInstance::new(senders, response_rx, done_rx, turn_timeout);
        let players = Players {
            commands,
            responses: response_tx,
            done: done_tx,
        };
        (game, players)
    }

    fn spawn_game(mut game: GameInstance) -> JoinHandle<(Result<GameOutcome, GameError>, Board)> {
        tokio::spawn(async move {
            let result = game.start().await;
            (result, *game.board())
        })
    }

    #[tokio::test]
    async fn test_not_enough_players() {
        let (mut game, _players) = game_with(1, None);

        let result = game.start().await;

        assert!(matches!(
            result,
            Err(GameError::NotEnoughPlayers {
                expected: 2,
                found: 1
            })
        ));
        assert_eq!(*game.board(), Board::new());
    }

    #[tokio::test]
    async fn test_first_row_win_for_player_one() {
        let (game, mut players) = game_with(2, None);
        let handle = spawn_game(game);

        players.play(0, 0, 0).await;
        players.play(1, 1, 0).await;
        players.play(0, 0, 1).await;
        players.play(1, 1, 1).await;
        players.play(0, 0, 2).await;

        let terminal = players.expect_terminal().await;
        assert_eq!(terminal.message, "Player 1 won!");
        assert_eq!(terminal.player_id, 0);
        assert_eq!(terminal.mark, Some(Mark::X));
        assert_eq!(terminal.board.check_winner(), Some(Mark::X));

        players.finish_workers().await;
        let (result, board) = handle.await.unwrap();
        assert_eq!(
            result.unwrap(),
            GameOutcome::Win {
                slot: 0,
                mark: Mark::X
            }
        );
        assert_eq!(board.check_winner(), Some(Mark::X));
    }

    #[tokio::test]
    async fn test_prompts_alternate_and_carry_mark() {
        let (game, mut players) = game_with(2, None);
        let handle = spawn_game(game);

        let moves = [(0, 0), (0, 1), (0, 2), (1, 1), (1, 0), (1, 2), (2, 1), (2, 0), (2, 2)];
        for (turn, (row, col)) in moves.into_iter().enumerate() {
            let slot = turn % 2;
            let prompt = players.expect_prompt(slot).await;
            let mark = Mark::for_slot(slot);
            assert_eq!(prompt.mark, Some(mark));
            assert_eq!(prompt.message, move_prompt_text(mark));
            assert_eq!(prompt.acting_mark(), Some(mark));
            players
                .responses
                .send(ClientResponse::new(row, col, slot))
                .await
                .unwrap();
        }

        let terminal = players.expect_terminal().await;
        assert_eq!(terminal.message, DRAW_TEXT);
        assert!(terminal.board.check_draw());

        players.finish_workers().await;
        let (result, _) = handle.await.unwrap();
        assert_eq!(result.unwrap(), GameOutcome::Draw);
    }

    #[tokio::test]
    async fn test_disconnect_mid_turn_leaves_board_untouched() {
        let (game, mut players) = game_with(2, None);
        let handle = spawn_game(game);

        players.play(0, 1, 1).await;
        players.expect_prompt(1).await;
        players
            .responses
            .send(ClientResponse::leave(1))
            .await
            .unwrap();

        let terminal = players.expect_terminal().await;
        assert_eq!(terminal.message, DISCONNECT_TEXT);

        players.finish_workers().await;
        let (result, board) = handle.await.unwrap();
        assert_eq!(result.unwrap(), GameOutcome::Disconnected { slot: 1 });

        let mut expected = Board::new();
        expected.place(1, 1, Mark::X).unwrap();
        assert_eq!(board, expected);
    }

    #[tokio::test]
    async fn test_leave_from_unknown_slot_blames_active_player() {
        let (game, mut players) = game_with(2, None);
        let handle = spawn_game(game);

        players.expect_prompt(0).await;
        players
            .responses
            .send(ClientResponse::leave(7))
            .await
            .unwrap();

        let terminal = players.expect_terminal().await;
        assert_eq!(terminal.message, DISCONNECT_TEXT);

        players.finish_workers().await;
        let (result, _) = handle.await.unwrap();
        assert_eq!(result.unwrap(), GameOutcome::Disconnected { slot: 0 });
    }

    #[tokio::test]
    async fn test_desync_is_an_error() {
        let (game, mut players) = game_with(2, None);
        let handle = spawn_game(game);

        players.expect_prompt(0).await;
        players
            .responses
            .send(ClientResponse::new(0, 0, 1))
            .await
            .unwrap();

        let terminal = players.expect_terminal().await;
        assert_eq!(terminal.message, DESYNC_TEXT);

        players.finish_workers().await;
        let (result, board) = handle.await.unwrap();
        assert!(matches!(
            result,
            Err(GameError::Desync {
                expected: 0,
                actual: 1
            })
        ));
        assert_eq!(board, Board::new());
    }

    #[tokio::test]
    async fn test_invalid_move_reprompts_same_player() {
        let (game, mut players) = game_with(2, None);
        let handle = spawn_game(game);

        players.play(0, 0, 0).await;
        // taken tile
        players.play(1, 0, 0).await;
        let retry = players.expect_prompt(1).await;
        assert_eq!(retry.message, retry_prompt_text(Mark::O));
        assert_eq!(retry.mark, Some(Mark::O));
        assert_eq!(retry.board.cell(0, 0), Some(Cell::Marked(Mark::X)));
        assert_eq!(retry.board.cell(2, 2), Some(Cell::Empty));

        players
            .responses
            .send(ClientResponse::new(2, 2, 1))
            .await
            .unwrap();

        // turn advanced back to player 0 with O applied
        let next = players.expect_prompt(0).await;
        assert_eq!(next.message, move_prompt_text(Mark::X));
        assert_eq!(next.board.cell(2, 2), Some(Cell::Marked(Mark::O)));

        players
            .responses
            .send(ClientResponse::leave(0))
            .await
            .unwrap();
        players.expect_terminal().await;
        players.finish_workers().await;
        handle.await.unwrap().0.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_move_retries_are_unbounded() {
        let (game, mut players) = game_with(2, None);
        let handle = spawn_game(game);

        players.play(0, -1, 0).await;
        for attempt in 0..50 {
            let prompt = players.expect_prompt(0).await;
            assert_eq!(prompt.message, retry_prompt_text(Mark::X));
            assert_eq!(prompt.board, Board::new());
            players
                .responses
                .send(ClientResponse::new(3, attempt % 5, 0))
                .await
                .unwrap();
        }

        players.expect_prompt(0).await;
        players
            .responses
            .send(ClientResponse::new(1, 1, 0))
            .await
            .unwrap();
        players.expect_prompt(1).await;
        players
            .responses
            .send(ClientResponse::leave(1))
            .await
            .unwrap();

        players.expect_terminal().await;
        players.finish_workers().await;
        let (result, board) = handle.await.unwrap();
        assert_eq!(result.unwrap(), GameOutcome::Disconnected { slot: 1 });
        assert_eq!(board.cell(1, 1), Some(Cell::Marked(Mark::X)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_turn_timeout_counts_as_disconnect() {
        let (game, mut players) = game_with(2, Some(Duration::from_secs(5)));
        let handle = spawn_game(game);

        players.expect_prompt(0).await;

        let terminal = players.expect_terminal().await;
        assert_eq!(terminal.message, DISCONNECT_TEXT);

        players.finish_workers().await;
        let (result, _) = handle.await.unwrap();
        assert_eq!(result.unwrap(), GameOutcome::Disconnected { slot: 0 });
    }

    #[tokio::test]
    async fn test_broadcast_skips_departed_worker() {
        let (game, mut players) = game_with(2, None);
        let handle = spawn_game(game);

        players.expect_prompt(0).await;
        // worker 1 is gone entirely before the broadcast
        let departed = players.commands.remove(1);
        drop(departed);
        players.done.send(1).await.unwrap();
        players
            .responses
            .send(ClientResponse::leave(0))
            .await
            .unwrap();

        let terminal = players.commands[0].recv().await.unwrap();
        assert_eq!(terminal.message, DISCONNECT_TEXT);
        players.done.send(0).await.unwrap();

        let (result, _) = handle.await.unwrap();
        assert_eq!(result.unwrap(), GameOutcome::Disconnected { slot: 0 });
    }

    #[tokio::test]
    async fn test_wait_drains_stale_responses() {
        let (game, mut players) = game_with(2, None);
        let handle = spawn_game(game);

        players.expect_prompt(0).await;
        players
            .responses
            .send(ClientResponse::leave(0))
            .await
            .unwrap();
        players.expect_terminal().await;

        // more traffic than the inbound channel can hold
        for _ in 0..(REQUIRED_PLAYERS * 3) {
            players
                .responses
                .send(ClientResponse::leave(1))
                .await
                .unwrap();
        }
        players.finish_workers().await;

        let (result, _) = handle.await.unwrap();
        assert_eq!(result.unwrap(), GameOutcome::Disconnected { slot: 0 });
    }

    #[tokio::test]
    async fn test_run_closes_channels() {
        let (game, mut players) = game_with(2, None);
        let handle = tokio::spawn(game.run());

        players.expect_prompt(0).await;
        players
            .responses
            .send(ClientResponse::leave(0))
            .await
            .unwrap();
        players.expect_terminal().await;
        players.finish_workers().await;

        handle.await.unwrap().unwrap();
        assert!(players.commands[0].recv().await.is_none());
        assert!(players.commands[1].recv().await.is_none());
        assert!(players.responses.is_closed());
    }
}
