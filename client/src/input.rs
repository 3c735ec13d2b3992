//! Parsing of typed moves with local validation

use shared::Board;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Unexpected number of arguments. Try again.")]
    ArgumentCount,
    #[error("Bad row. Try again.")]
    BadRow,
    #[error("Bad column. Try again.")]
    BadColumn,
    #[error("Bad tile. Try again.")]
    BadTile,
}

pub const MOVE_PROMPT: &str = "Enter a row and column (eg. 0 1): ";

/// Parses `"<row> <col>"` and checks the tile against the local board
pub fn parse_move(line: &str, board: &Board) -> Result<(i64, i64), InputError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let [row, col] = tokens.as_slice() else {
        return Err(InputError::ArgumentCount);
    };

    let row: i64 = row.parse().map_err(|_| InputError::BadRow)?;
    let col: i64 = col.parse().map_err(|_| InputError::BadColumn)?;

    if !board.is_legal_move(row, col) {
        return Err(InputError::BadTile);
    }

    Ok((row, col))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Mark;

    #[test]
    fn test_valid_move() {
        assert_eq!(parse_move("0 1", &Board::new()), Ok((0, 1)));
        assert_eq!(parse_move("  2\t2 \n", &Board::new()), Ok((2, 2)));
    }

    #[test]
    fn test_argument_count() {
        let board = Board::new();
        assert_eq!(parse_move("", &board), Err(InputError::ArgumentCount));
        assert_eq!(parse_move("1", &board), Err(InputError::ArgumentCount));
        assert_eq!(parse_move("1 2 3", &board), Err(InputError::ArgumentCount));
    }

    #[test]
    fn test_bad_numbers() {
        let board = Board::new();
        assert_eq!(parse_move("a 1", &board), Err(InputError::BadRow));
        assert_eq!(parse_move("1 b", &board), Err(InputError::BadColumn));
    }

    #[test]
    fn test_bad_tile() {
        let mut board = Board::new();
        board.place(1, 1, Mark::O).unwrap();
        assert_eq!(parse_move("1 1", &board), Err(InputError::BadTile));
        assert_eq!(parse_move("-1 0", &board), Err(InputError::BadTile));
        assert_eq!(parse_move("0 3", &board), Err(InputError::BadTile));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            InputError::ArgumentCount.to_string(),
            "Unexpected number of arguments. Try again."
        );
        assert_eq!(InputError::BadTile.to_string(), "Bad tile. Try again.");
    }
}
