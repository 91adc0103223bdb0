use std::fmt;

use serde::{Deserialize, Serialize};

use super::board::Square;
use super::piece::{Piece, PieceType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CastlingSide {
    KingSide,
    QueenSide,
}

/// A candidate move. Created once by the generator and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub piece: Piece,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture: Option<Piece>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<PieceType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub castling: Option<CastlingSide>,
}

impl Move {
    pub fn quiet(from: Square, to: Square, piece: Piece) -> Self {
        Move {
            from,
            to,
            piece,
            capture: None,
            promotion: None,
            castling: None,
        }
    }

    pub fn capturing(from: Square, to: Square, piece: Piece, captured: Option<Piece>) -> Self {
        Move {
            capture: captured,
            ..Move::quiet(from, to, piece)
        }
    }

    pub fn is_capture(&self) -> bool {
        self.capture.is_some()
    }

    /// Coordinate notation, e.g. `e2e4` or `e7e8q`
    pub fn to_uci(&self) -> String {
        let mut text = format!("{}{}", self.from, self.to);
        if let Some(promotion) = self.promotion {
            text.push(promotion.letter().to_ascii_lowercase());
        }
        text
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uci())
    }
}
