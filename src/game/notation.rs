//! Text encodings used to exchange moves with notation-based tooling.

use super::board::Square;
use super::moves::Move;
use super::piece::PieceType;
use crate::error::NotationError;

/// Resolve coordinate notation (`e2e4`, `e7e8q`) against a list of candidate
/// moves. A missing promotion suffix selects the queen promotion.
pub fn parse_uci(text: &str, candidates: &[Move]) -> Result<Move, NotationError> {
    let text = text.trim();
    if !(4..=5).contains(&text.len()) || !text.is_ascii() {
        return Err(NotationError::InvalidMove(text.to_string()));
    }
    let from = Square::from_algebraic(&text[0..2])?;
    let to = Square::from_algebraic(&text[2..4])?;
    let promotion = match text[4..].chars().next() {
        Some(c) => Some(
            PieceType::from_letter(c)
                .filter(|t| !matches!(t, PieceType::Pawn | PieceType::King))
                .ok_or_else(|| NotationError::InvalidMove(text.to_string()))?,
        ),
        None => None,
    };

    let mut matching = candidates.iter().filter(|m| m.from == from && m.to == to);
    let found = match promotion {
        Some(p) => matching.find(|m| m.promotion == Some(p)),
        None => matching.find(|m| m.promotion.is_none() || m.promotion == Some(PieceType::Queen)),
    };
    found
        .copied()
        .ok_or_else(|| NotationError::NotLegal(text.to_string()))
}
