//! Pseudo-legal move generation. Moves that leave the mover's own king in
//! check are still produced here; see [`super::legality`] for filtering.

use super::board::{Board, Square};
use super::moves::Move;
use super::piece::{Color, Piece, PieceType};

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

const KING_OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

const ROOK_DIRECTIONS: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

/// Promotion pieces generated for a pawn reaching the last row. Bishop and rook
/// under-promotions are skipped.
const PROMOTIONS: [PieceType; 2] = [PieceType::Queen, PieceType::Knight];

/// Generate all pseudo-legal moves for `color`, square by square in row-major
/// order.
pub fn pseudo_legal_moves(board: &Board, color: Color) -> Vec<Move> {
    let mut moves = Vec::with_capacity(64);
    for (from, piece) in board.pieces() {
        if piece.color != color {
            continue;
        }
        match piece.piece_type {
            PieceType::Pawn => pawn_moves(board, from, piece, &mut moves),
            PieceType::Knight => step_moves(board, from, piece, &KNIGHT_OFFSETS, &mut moves),
            PieceType::King => step_moves(board, from, piece, &KING_OFFSETS, &mut moves),
            PieceType::Bishop => slide_moves(board, from, piece, &BISHOP_DIRECTIONS, &mut moves),
            PieceType::Rook => slide_moves(board, from, piece, &ROOK_DIRECTIONS, &mut moves),
            PieceType::Queen => {
                slide_moves(board, from, piece, &ROOK_DIRECTIONS, &mut moves);
                slide_moves(board, from, piece, &BISHOP_DIRECTIONS, &mut moves);
            }
        }
    }
    moves
}

fn pawn_moves(board: &Board, from: Square, pawn: Piece, moves: &mut Vec<Move>) {
    let forward = pawn.color.forward();

    if let Some(one) = from.offset(forward, 0) {
        if board.get(one).is_none() {
            push_pawn_move(from, one, pawn, None, moves);

            if from.row == pawn.color.pawn_row() {
                if let Some(two) = one.offset(forward, 0) {
                    if board.get(two).is_none() {
                        moves.push(Move::quiet(from, two, pawn));
                    }
                }
            }
        }
    }

    for d_col in [-1, 1] {
        let Some(target) = from.offset(forward, d_col) else {
            continue;
        };
        if let Some(victim) = board.get(target) {
            if victim.color != pawn.color {
                push_pawn_move(from, target, pawn, Some(victim), moves);
            }
        }
    }
}

/// Push a pawn move, expanding into promotions when it lands on the last row.
fn push_pawn_move(
    from: Square,
    to: Square,
    pawn: Piece,
    captured: Option<Piece>,
    moves: &mut Vec<Move>,
) {
    if to.row == pawn.color.promotion_row() {
        for promotion in PROMOTIONS {
            moves.push(Move {
                promotion: Some(promotion),
                ..Move::capturing(from, to, pawn, captured)
            });
        }
    } else {
        moves.push(Move::capturing(from, to, pawn, captured));
    }
}

fn step_moves(
    board: &Board,
    from: Square,
    piece: Piece,
    offsets: &[(i8, i8)],
    moves: &mut Vec<Move>,
) {
    for &(d_row, d_col) in offsets {
        let Some(to) = from.offset(d_row, d_col) else {
            continue;
        };
        match board.get(to) {
            None => moves.push(Move::quiet(from, to, piece)),
            Some(other) if other.color != piece.color => {
                moves.push(Move::capturing(from, to, piece, Some(other)))
            }
            Some(_) => {}
        }
    }
}

fn slide_moves(
    board: &Board,
    from: Square,
    piece: Piece,
    directions: &[(i8, i8)],
    moves: &mut Vec<Move>,
) {
    for &(d_row, d_col) in directions {
        let mut current = from;
        while let Some(to) = current.offset(d_row, d_col) {
            match board.get(to) {
                None => moves.push(Move::quiet(from, to, piece)),
                Some(other) => {
                    if other.color != piece.color {
                        moves.push(Move::capturing(from, to, piece, Some(other)));
                    }
                    break;
                }
            }
            current = to;
        }
    }
}
