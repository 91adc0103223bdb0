use crate::game::{Board, Color, PieceType};
use crate::weights::LearnedWeights;

/// Trait for scoring a board from the point of view of the side to move.
/// Lets an external engine stand in for the table-driven evaluator.
pub trait Heuristic: Send {
    fn evaluate(&self, board: &Board, color: Color) -> i32;
}

impl Heuristic for LearnedWeights {
    fn evaluate(&self, board: &Board, color: Color) -> i32 {
        evaluate(board, color, self)
    }
}

/// Material plus piece-square score, positive when `moving` is better off.
///
/// White reads each table at its own `row * 8 + col`; black reads the same
/// table with the row mirrored. Each side also earns
/// `queen_coordination_bonus` per queen beyond the first.
pub fn evaluate(board: &Board, moving: Color, weights: &LearnedWeights) -> i32 {
    let mut score = 0;
    let mut queens = [0i32; 2];

    for (square, piece) in board.pieces() {
        let row = match piece.color {
            Color::White => square.row,
            Color::Black => 7 - square.row,
        };
        let table = weights.position_bonus.table(piece.piece_type);
        let bonus = table.get(row * 8 + square.col).copied().unwrap_or(0);
        let value = weights.piece_values.get(piece.piece_type) + bonus;

        match piece.color {
            Color::White => score += value,
            Color::Black => score -= value,
        }
        if piece.piece_type == PieceType::Queen {
            queens[piece.color as usize] += 1;
        }
    }

    let extra = |count: i32| (count - 1).max(0) * weights.queen_coordination_bonus;
    score += extra(queens[Color::White as usize]);
    score -= extra(queens[Color::Black as usize]);

    match moving {
        Color::White => score,
        Color::Black => -score,
    }
}
