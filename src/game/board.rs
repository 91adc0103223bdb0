use std::fmt;

use super::moves::{CastlingSide, Move};
use super::piece::{Color, Piece, PieceType};
use crate::error::NotationError;

pub const SIZE: usize = 8;

/// A square on the board. Row 0 is rank 8, row 7 is rank 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Square {
    pub row: usize,
    pub col: usize,
}

impl Square {
    pub const fn new(row: usize, col: usize) -> Self {
        Square { row, col }
    }

    /// Step by a signed delta, `None` when the result leaves the board
    pub fn offset(self, d_row: i8, d_col: i8) -> Option<Square> {
        let row = self.row as i8 + d_row;
        let col = self.col as i8 + d_col;
        if (0..SIZE as i8).contains(&row) && (0..SIZE as i8).contains(&col) {
            Some(Square::new(row as usize, col as usize))
        } else {
            None
        }
    }

    /// Algebraic coordinate such as `e4`
    pub fn to_algebraic(self) -> String {
        let file = (b'a' + self.col as u8) as char;
        let rank = SIZE - self.row;
        format!("{file}{rank}")
    }

    pub fn from_algebraic(text: &str) -> Result<Square, NotationError> {
        let bytes = text.as_bytes();
        if bytes.len() != 2 {
            return Err(NotationError::InvalidSquare(text.to_string()));
        }
        let file = bytes[0].to_ascii_lowercase();
        let rank = bytes[1];
        if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
            return Err(NotationError::InvalidSquare(text.to_string()));
        }
        let col = (file - b'a') as usize;
        let row = SIZE - (rank - b'0') as usize;
        Ok(Square::new(row, col))
    }

    /// Doubled distance from the board center, Chebyshev style. Corners are 7, the
    /// four center squares are 1.
    pub fn center_distance(self) -> usize {
        let dr = (2 * self.row as i32 - 7).unsigned_abs() as usize;
        let dc = (2 * self.col as i32 - 7).unsigned_abs() as usize;
        dr.max(dc)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_algebraic())
    }
}

/// Fixed 8x8 grid of optional pieces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [[Option<Piece>; SIZE]; SIZE],
}

const BACK_RANK: [PieceType; SIZE] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

impl Board {
    /// Create an empty board
    pub fn new() -> Self {
        Board {
            cells: [[None; SIZE]; SIZE],
        }
    }

    /// Standard starting position, black on rows 0-1 and white on rows 6-7
    pub fn starting_position() -> Self {
        let mut board = Board::new();
        for (col, &piece_type) in BACK_RANK.iter().enumerate() {
            board.cells[0][col] = Some(Piece::new(piece_type, Color::Black));
            board.cells[1][col] = Some(Piece::new(PieceType::Pawn, Color::Black));
            board.cells[6][col] = Some(Piece::new(PieceType::Pawn, Color::White));
            board.cells[7][col] = Some(Piece::new(piece_type, Color::White));
        }
        board
    }

    /// Get the piece on a square
    pub fn get(&self, square: Square) -> Option<Piece> {
        self.cells[square.row][square.col]
    }

    pub fn set(&mut self, square: Square, piece: Option<Piece>) {
        self.cells[square.row][square.col] = piece;
    }

    /// Iterate occupied squares in row-major order
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.cells.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter_map(move |(col, cell)| cell.map(|p| (Square::new(row, col), p)))
        })
    }

    pub fn piece_count(&self) -> usize {
        self.pieces().count()
    }

    /// First king of `color` found in row-major order
    pub fn find_king(&self, color: Color) -> Option<Square> {
        self.pieces()
            .find(|(_, p)| p.piece_type == PieceType::King && p.color == color)
            .map(|(sq, _)| sq)
    }

    /// Return a new board with `mv` applied. The receiver is left untouched.
    pub fn with_move(&self, mv: &Move) -> Board {
        let mut next = *self;
        let placed = match mv.promotion {
            Some(piece_type) => Piece::new(piece_type, mv.piece.color),
            None => mv.piece,
        };
        next.set(mv.from, None);
        next.set(mv.to, Some(placed));

        if let Some(side) = mv.castling {
            let (rook_from, rook_to) = match side {
                CastlingSide::KingSide => (7, 5),
                CastlingSide::QueenSide => (0, 3),
            };
            let row = mv.from.row;
            let rook = next.cells[row][rook_from].take();
            next.cells[row][rook_to] = rook;
        }
        next
    }

    /// Piece letter per square (`.` when empty), concatenated row by row.
    pub fn fingerprint(&self) -> String {
        self.cells
            .iter()
            .flatten()
            .map(|cell| cell.map_or('.', Piece::fen_char))
            .collect()
    }

    /// Parse the piece-placement field of a FEN string. Any trailing fields are
    /// ignored.
    pub fn from_fen_placement(fen: &str) -> Result<Board, NotationError> {
        let placement = fen.split_whitespace().next().unwrap_or("");
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != SIZE {
            return Err(NotationError::Fen(format!(
                "expected 8 ranks, found {}",
                ranks.len()
            )));
        }

        let mut board = Board::new();
        for (row, rank) in ranks.iter().enumerate() {
            let mut col = 0;
            for c in rank.chars() {
                if let Some(skip) = c.to_digit(10) {
                    col += skip as usize;
                    continue;
                }
                let piece = Piece::from_fen_char(c)
                    .ok_or_else(|| NotationError::Fen(format!("unknown piece '{c}'")))?;
                if col >= SIZE {
                    return Err(NotationError::Fen(format!("rank {} overflows", SIZE - row)));
                }
                board.cells[row][col] = Some(piece);
                col += 1;
            }
            if col != SIZE {
                return Err(NotationError::Fen(format!(
                    "rank {} has {col} files",
                    SIZE - row
                )));
            }
        }
        Ok(board)
    }

    pub fn to_fen_placement(&self) -> String {
        let mut out = String::new();
        for (row, cells) in self.cells.iter().enumerate() {
            if row > 0 {
                out.push('/');
            }
            let mut empty = 0;
            for cell in cells {
                match cell {
                    Some(piece) => {
                        if empty > 0 {
                            out.push_str(&empty.to_string());
                            empty = 0;
                        }
                        out.push(piece.fen_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push_str(&empty.to_string());
            }
        }
        out
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, cells) in self.cells.iter().enumerate() {
            write!(f, "{} ", SIZE - row)?;
            for cell in cells {
                write!(f, " {}", cell.map_or('.', Piece::fen_char))?;
            }
            writeln!(f)?;
        }
        write!(f, "   a b c d e f g h")
    }
}
