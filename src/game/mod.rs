//! Core chess rules: board representation, pseudo-legal move generation,
//! check filtering, and the self-play game state machine.

mod board;
mod legality;
mod movegen;
mod moves;
pub mod notation;
mod piece;
mod state;

pub use board::{Board, Square, SIZE};
pub use legality::{in_check, legal_moves, MAX_CANDIDATES};
pub use movegen::pseudo_legal_moves;
pub use moves::{CastlingSide, Move};
pub use piece::{Color, Piece, PieceType};
pub use state::{GameOutcome, GameState, Termination, DEFAULT_MAX_PLIES};
