use super::board::Board;
use super::movegen::pseudo_legal_moves;
use super::moves::Move;
use super::piece::Color;

/// Upper bound on candidates returned by [`legal_moves`]. Keeps the branching
/// factor of the search bounded; moves past the cap are dropped after ordering.
pub const MAX_CANDIDATES: usize = 60;

/// True when `color`'s king is attacked. A board without that king counts as
/// being in check, so a lost position can never be searched forever.
pub fn in_check(board: &Board, color: Color) -> bool {
    let Some(king) = board.find_king(color) else {
        return true;
    };
    pseudo_legal_moves(board, color.other())
        .iter()
        .any(|m| m.to == king)
}

/// Pseudo-legal moves that do not leave `color`'s own king in check, captures
/// first and then by destination distance from the center, capped at
/// [`MAX_CANDIDATES`].
pub fn legal_moves(board: &Board, color: Color) -> Vec<Move> {
    let mut moves: Vec<Move> = pseudo_legal_moves(board, color)
        .into_iter()
        .filter(|m| !in_check(&board.with_move(m), color))
        .collect();

    // stable: generation order breaks remaining ties
    moves.sort_by_key(|m| (!m.is_capture(), m.to.center_distance()));
    moves.truncate(MAX_CANDIDATES);
    moves
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{PieceType, Square};

    fn board(fen: &str) -> Board {
        Board::from_fen_placement(fen).unwrap()
    }

    #[test]
    fn test_starting_position_has_twenty_legal_moves() {
        let start = Board::starting_position();
        let moves = legal_moves(&start, Color::White);
        assert_eq!(moves.len(), 20);
        let pawn_moves = moves
            .iter()
            .filter(|m| m.piece.piece_type == PieceType::Pawn)
            .count();
        let knight_moves = moves
            .iter()
            .filter(|m| m.piece.piece_type == PieceType::Knight)
            .count();
        assert_eq!(pawn_moves, 16);
        assert_eq!(knight_moves, 4);
        assert_eq!(legal_moves(&start, Color::Black).len(), 20);
    }

    #[test]
    fn test_missing_king_counts_as_check() {
        let empty = Board::new();
        assert!(in_check(&empty, Color::White));
        assert!(in_check(&empty, Color::Black));
    }

    #[test]
    fn test_rook_gives_check() {
        let b = board("4k3/8/8/8/8/8/8/4R1K1");
        assert!(in_check(&b, Color::Black));
        assert!(!in_check(&b, Color::White));
    }

    #[test]
    fn test_blocked_ray_is_not_check() {
        let b = board("4k3/4p3/8/8/8/8/8/4R1K1");
        assert!(!in_check(&b, Color::Black));
    }

    #[test]
    fn test_pinned_piece_cannot_move_off_line() {
        // Black knight on e7 is pinned against the king by the rook on e1
        let b = board("4k3/4n3/8/8/8/8/8/4R1K1");
        let moves = legal_moves(&b, Color::Black);
        let knight = Square::from_algebraic("e7").unwrap();
        assert!(moves.iter().all(|m| m.from != knight));
    }

    #[test]
    fn test_king_cannot_step_into_attack() {
        let b = board("k7/8/8/8/8/8/1r6/K7");
        let moves = legal_moves(&b, Color::White);
        let mut dests: Vec<String> = moves.iter().map(|m| m.to.to_algebraic()).collect();
        dests.sort();
        // a2 and b1 are covered by the rook, capturing it is the only way out
        assert_eq!(dests, vec!["b2"]);
    }

    #[test]
    fn test_captures_sorted_first_then_center() {
        let b = board("4k3/8/8/8/3p4/8/8/3QK3");
        let moves = legal_moves(&b, Color::White);
        assert!(moves[0].is_capture());
        assert_eq!(moves[0].to_uci(), "d1d4");
        let quiet = &moves[1..];
        assert!(quiet
            .windows(2)
            .all(|w| w[0].to.center_distance() <= w[1].to.center_distance()));
    }

    #[test]
    fn test_candidates_are_capped() {
        // Two queens and two rooks on an open board exceed the cap
        let b = board("k7/8/8/3Q4/8/2Q5/8/R3K2R");
        assert!(crate::game::pseudo_legal_moves(&b, Color::White).len() > MAX_CANDIDATES);
        assert_eq!(legal_moves(&b, Color::White).len(), MAX_CANDIDATES);
    }

    #[test]
    fn test_checkmated_side_has_no_moves() {
        // Back-rank mate
        let b = board("R5k1/5ppp/8/8/8/8/8/6K1");
        assert!(in_check(&b, Color::Black));
        assert!(legal_moves(&b, Color::Black).is_empty());
    }

    #[test]
    fn test_stalemated_side_has_no_moves() {
        let b = board("7k/5Q2/6K1/8/8/8/8/8");
        assert!(!in_check(&b, Color::Black));
        assert!(legal_moves(&b, Color::Black).is_empty());
    }
}
