use crate::game::{GameState, Move};

/// Anything that can pick a move for the side to move.
pub trait Agent {
    /// Select a move from the state's legal moves, or `None` when there are
    /// none. When `training` is true the agent may explore.
    fn select_move(&mut self, state: &GameState, training: bool) -> Option<Move>;

    /// Return the agent's display name.
    fn name(&self) -> &str;
}
