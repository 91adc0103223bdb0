use std::collections::HashMap;

use super::board::Board;
use super::legality::{in_check, legal_moves};
use super::moves::Move;
use super::piece::Color;
use crate::error::MoveError;

/// Default ply cap for a self-play game.
pub const DEFAULT_MAX_PLIES: usize = 200;

/// Number of times a position has to occur before the game is drawn.
const REPETITION_LIMIT: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameOutcome {
    Winner(Color),
    Draw,
}

/// Why a game stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Termination {
    Checkmate,
    Stalemate,
    Repetition,
    InsufficientMaterial,
    MoveCap,
}

impl Termination {
    pub fn name(self) -> &'static str {
        match self {
            Termination::Checkmate => "checkmate",
            Termination::Stalemate => "stalemate",
            Termination::Repetition => "repetition",
            Termination::InsufficientMaterial => "insufficient material",
            Termination::MoveCap => "move cap",
        }
    }
}

/// A game in progress. Holds the board, whose turn it is, the fingerprints seen
/// so far and the legal moves of the side to move.
#[derive(Debug, Clone)]
pub struct GameState {
    board: Board,
    side_to_move: Color,
    ply: usize,
    max_plies: usize,
    seen: HashMap<String, u8>,
    moves: Vec<Move>,
    finished: Option<(GameOutcome, Termination)>,
}

impl GameState {
    /// Standard starting position, white to move
    pub fn initial(max_plies: usize) -> Self {
        Self::from_board(Board::starting_position(), Color::White, max_plies)
    }

    /// Start from an arbitrary position. If the side to move has no legal moves
    /// the game is already over.
    pub fn from_board(board: Board, side_to_move: Color, max_plies: usize) -> Self {
        let mut state = GameState {
            board,
            side_to_move,
            ply: 0,
            max_plies,
            seen: HashMap::new(),
            moves: Vec::new(),
            finished: None,
        };
        state.refresh_moves();
        state
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    /// Plies played so far
    pub fn ply(&self) -> usize {
        self.ply
    }

    /// Legal moves for the side to move, empty once the game is over
    pub fn legal_moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.finished.map(|(outcome, _)| outcome)
    }

    pub fn termination(&self) -> Option<Termination> {
        self.finished.map(|(_, termination)| termination)
    }

    pub fn is_terminal(&self) -> bool {
        self.finished.is_some()
    }

    /// Play one of the current legal moves and detect draws.
    pub fn apply_move(&mut self, mv: Move) -> Result<(), MoveError> {
        if self.is_terminal() {
            return Err(MoveError::GameOver);
        }
        if !self.moves.contains(&mv) {
            return Err(MoveError::Illegal {
                uci: mv.to_uci(),
                ply: self.ply,
            });
        }

        self.board = self.board.with_move(&mv);
        self.side_to_move = self.side_to_move.other();
        self.ply += 1;

        let count = self.seen.entry(self.board.fingerprint()).or_insert(0);
        *count += 1;

        if *count >= REPETITION_LIMIT {
            self.finish(GameOutcome::Draw, Termination::Repetition);
        } else if self.board.piece_count() == 2 {
            self.finish(GameOutcome::Draw, Termination::InsufficientMaterial);
        } else if self.ply >= self.max_plies {
            self.finish(GameOutcome::Draw, Termination::MoveCap);
        } else {
            self.refresh_moves();
        }
        Ok(())
    }

    fn refresh_moves(&mut self) {
        self.moves = legal_moves(&self.board, self.side_to_move);
        if self.moves.is_empty() {
            if in_check(&self.board, self.side_to_move) {
                self.finish(
                    GameOutcome::Winner(self.side_to_move.other()),
                    Termination::Checkmate,
                );
            } else {
                self.finish(GameOutcome::Draw, Termination::Stalemate);
            }
        }
    }

    fn finish(&mut self, outcome: GameOutcome, termination: Termination) {
        self.moves.clear();
        self.finished = Some((outcome, termination));
    }
}
