//! The 3x3 tic-tac-toe grid shared by the server and the client
//!
//! The board is a plain value type: it knows which moves are legal, how to
//! place a mark, and whether the position is won or drawn. It carries no
//! concurrency concerns; the server mutates it from a single task only.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const BOARD_SIZE: usize = 3;

/// The symbol a player's moves place on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    /// Mark used by the player in the given slot; slot 0 moves first with X
    pub fn for_slot(slot: usize) -> Self {
        if slot % 2 == 0 {
            Mark::X
        } else {
            Mark::O
        }
    }

    /// Slot that plays this mark
    pub fn slot(self) -> usize {
        match self {
            Mark::X => 0,
            Mark::O => 1,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Mark::X => 'X',
            Mark::O => 'O',
        }
    }

    pub fn from_char(symbol: char) -> Option<Self> {
        match symbol {
            'X' => Some(Mark::X),
            'O' => Some(Mark::O),
            _ => None,
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

const EMPTY_SYMBOL: char = '_';

/// A single tile. Once marked, a tile never becomes empty again within a game.
///
/// On the wire a tile is the ASCII code of its symbol (`95`, `88`, `79`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawCell", into = "u8")]
pub enum Cell {
    #[default]
    Empty,
    Marked(Mark),
}

impl From<Cell> for char {
    fn from(cell: Cell) -> char {
        match cell {
            Cell::Empty => EMPTY_SYMBOL,
            Cell::Marked(mark) => mark.as_char(),
        }
    }
}

impl From<Cell> for u8 {
    fn from(cell: Cell) -> u8 {
        // every symbol is ASCII
        char::from(cell) as u8
    }
}

/// Cells arrive either as ASCII byte codes or as one-character strings
#[derive(Deserialize)]
#[serde(untagged)]
enum RawCell {
    Symbol(char),
    Code(u8),
}

impl TryFrom<RawCell> for Cell {
    type Error = String;

    fn try_from(raw: RawCell) -> Result<Self, Self::Error> {
        let symbol = match raw {
            RawCell::Symbol(symbol) => symbol,
            RawCell::Code(code) => char::from(code),
        };

        match symbol {
            EMPTY_SYMBOL => Ok(Cell::Empty),
            other => Mark::from_char(other)
                .map(Cell::Marked)
                .ok_or_else(|| format!("invalid board cell {:?}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("tile ({row}, {col}) is outside the board")]
    OutOfBounds { row: i64, col: i64 },
    #[error("tile ({row}, {col}) is already taken")]
    Occupied { row: i64, col: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    cells: [[Cell; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    /// Creates a board with every tile empty
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cell(&self, row: i64, col: i64) -> Option<Cell> {
        let (row, col) = Self::index(row, col)?;
        Some(self.cells[row][col])
    }

    /// True iff both coordinates are on the board and the tile is empty
    pub fn is_legal_move(&self, row: i64, col: i64) -> bool {
        self.cell(row, col) == Some(Cell::Empty)
    }

    /// Places `mark` on an empty tile
    ///
    /// Refuses out-of-range coordinates and taken tiles instead of
    /// overwriting, so a marked tile can never revert or change owner.
    pub fn place(&mut self, row: i64, col: i64, mark: Mark) -> Result<(), BoardError> {
        let (r, c) = Self::index(row, col).ok_or(BoardError::OutOfBounds { row, col })?;
        if self.cells[r][c] != Cell::Empty {
            return Err(BoardError::Occupied { row, col });
        }
        self.cells[r][c] = Cell::Marked(mark);
        Ok(())
    }

    /// Returns the mark owning a complete row, column or diagonal
    ///
    /// Rows are scanned before columns before diagonals. Only one winner can
    /// exist under alternating play, so the order only decides which check
    /// short-circuits first.
    pub fn check_winner(&self) -> Option<Mark> {
        self.lines().into_iter().find_map(line_owner)
    }

    /// True iff no empty tile remains. Check for a winner first: a full board
    /// with a complete line is a win, not a draw.
    pub fn check_draw(&self) -> bool {
        self.cells
            .iter()
            .flatten()
            .all(|cell| *cell != Cell::Empty)
    }

    pub fn rows(&self) -> &[[Cell; BOARD_SIZE]; BOARD_SIZE] {
        &self.cells
    }

    fn index(row: i64, col: i64) -> Option<(usize, usize)> {
        let row = usize::try_from(row).ok().filter(|r| *r < BOARD_SIZE)?;
        let col = usize::try_from(col).ok().filter(|c| *c < BOARD_SIZE)?;
        Some((row, col))
    }

    fn lines(&self) -> Vec<[Cell; BOARD_SIZE]> {
        let mut lines = Vec::with_capacity(2 * BOARD_SIZE + 2);
        lines.extend(self.cells.iter().copied());
        for col in 0..BOARD_SIZE {
            lines.push(std::array::from_fn(|row| self.cells[row][col]));
        }
        lines.push(std::array::from_fn(|i| self.cells[i][i]));
        lines.push(std::array::from_fn(|i| self.cells[i][BOARD_SIZE - 1 - i]));
        lines
    }
}

fn line_owner(line: [Cell; BOARD_SIZE]) -> Option<Mark> {
    match line[0] {
        Cell::Marked(mark) if line.iter().all(|cell| *cell == line[0]) => Some(mark),
        _ => None,
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            for cell in row {
                write!(f, " {}", char::from(*cell))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
