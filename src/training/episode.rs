use std::sync::atomic::{AtomicBool, Ordering};

use crate::ai::{Agent, NegamaxAgent, RandomAgent};
use crate::error::TrainingError;
use crate::game::{Color, GameOutcome, GameState, Move, Termination};
use crate::training::metrics::EpisodeResult;
use crate::weights::LearnedWeights;

/// A finished game.
#[derive(Debug, Clone)]
pub struct GameRecord {
    pub outcome: GameOutcome,
    pub termination: Termination,
    pub moves: Vec<Move>,
}

impl GameRecord {
    pub fn plies(&self) -> usize {
        self.moves.len()
    }

    pub fn winner(&self) -> Option<Color> {
        match self.outcome {
            GameOutcome::Winner(color) => Some(color),
            GameOutcome::Draw => None,
        }
    }

    pub fn result(&self) -> EpisodeResult {
        EpisodeResult {
            winner: self.winner(),
            game_length: self.plies(),
            termination: self.termination,
        }
    }
}

/// Play one game from the starting position.
///
/// `stop` is polled before every ply; once raised the game is abandoned and
/// `Ok(None)` is returned. `game` only labels errors.
pub fn play_game<'a>(
    white: &'a mut dyn Agent,
    black: &'a mut dyn Agent,
    max_plies: usize,
    training: bool,
    stop: Option<&AtomicBool>,
    game: usize,
) -> Result<Option<GameRecord>, TrainingError> {
    let mut state = GameState::initial(max_plies);
    let mut moves = Vec::new();

    while !state.is_terminal() {
        if stop.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            tracing::debug!(game, ply = state.ply(), "game abandoned");
            return Ok(None);
        }

        let agent = match state.side_to_move() {
            Color::White => &mut *white,
            Color::Black => &mut *black,
        };
        let mv = agent
            .select_move(&state, training)
            .ok_or(TrainingError::NoMoveSelected {
                ply: state.ply(),
                legal: state.legal_moves().len(),
            })?;
        state
            .apply_move(mv)
            .map_err(|source| TrainingError::Move { game, source })?;
        tracing::trace!(game, ply = state.ply(), mv = %mv, "move played");
        moves.push(mv);
    }

    match (state.outcome(), state.termination()) {
        (Some(outcome), Some(termination)) => Ok(Some(GameRecord {
            outcome,
            termination,
            moves,
        })),
        _ => Err(TrainingError::MissingOutcome {
            game,
            ply: state.ply(),
        }),
    }
}

/// Play a single evaluation game between two agents without exploration.
/// Returns Some(true) if agent won, Some(false) if agent lost, None if draw.
pub fn play_eval_game(
    agent: &mut dyn Agent,
    opponent: &mut dyn Agent,
    agent_is_white: bool,
    max_plies: usize,
    game: usize,
) -> Result<Option<bool>, TrainingError> {
    let record = if agent_is_white {
        play_game(agent, opponent, max_plies, false, None, game)?
    } else {
        play_game(opponent, agent, max_plies, false, None, game)?
    };

    Ok(record
        .and_then(|r| r.winner())
        .map(|winner| (winner == Color::White) == agent_is_white))
}

/// Win rate of a search agent using `weights` against a random mover over
/// `games` games, alternating colors. Noise is off for the search agent.
pub fn evaluate_vs_random(
    weights: &LearnedWeights,
    depth: usize,
    games: usize,
    max_plies: usize,
    seed: u64,
) -> Result<f32, TrainingError> {
    if games == 0 {
        return Ok(0.0);
    }

    let mut wins = 0;
    for game_idx in 0..games {
        let mut agent = NegamaxAgent::with_seed(
            depth,
            Box::new(weights.clone()),
            episode_seed(seed, 2 * game_idx),
        );
        let mut random = RandomAgent::with_seed(episode_seed(seed, 2 * game_idx + 1));
        let agent_is_white = game_idx % 2 == 0;
        if let Some(true) =
            play_eval_game(&mut agent, &mut random, agent_is_white, max_plies, game_idx)?
        {
            wins += 1;
        }
    }

    Ok(wins as f32 / games as f32)
}

/// Derive a deterministic seed for a given game index.
pub fn episode_seed(base_seed: u64, episode_index: usize) -> u64 {
    // FNV-1a style mixing
    let mut hash = base_seed ^ 0x517cc1b727220a95;
    let index = episode_index as u64;
    hash = hash.wrapping_mul(0x100000001b3);
    hash ^= index;
    hash = hash.wrapping_mul(0x100000001b3);
    hash ^= index >> 32;
    hash
}
