//! Terminal rendering of server updates

use shared::{Board, ServerMessage};

/// ANSI sequence that clears the screen and homes the cursor
pub const CLEAR_SCREEN: &str = "\x1B[2J\x1B[H";

/// Clears the screen, then shows the message text above the board
pub fn render(msg: &ServerMessage) -> String {
    format!("{}{}\n{}", CLEAR_SCREEN, msg.message, msg.board)
}

pub fn render_board(board: &Board) -> String {
    format!("{}{}", CLEAR_SCREEN, board)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Mark;

    #[test]
    fn test_render_message_above_board() {
        let mut board = Board::new();
        board.place(0, 2, Mark::X).unwrap();
        let msg = ServerMessage::new(board, 1, true, "Make your move O");

        assert_eq!(
            render(&msg),
            "\x1B[2J\x1B[HMake your move O\n _ _ X\n _ _ _\n _ _ _\n"
        );
    }

    #[test]
    fn test_render_board_clears_first() {
        let rendered = render_board(&Board::new());
        assert!(rendered.starts_with(CLEAR_SCREEN));
        assert!(rendered.ends_with(" _ _ _\n"));
    }
}
