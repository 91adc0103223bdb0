use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::game::{in_check, legal_moves, Board, Color, GameState, Move};

use super::agent::Agent;
use super::evaluation::Heuristic;

/// Score of a side that is checkmated, from its own point of view.
pub const MATE_SCORE: i32 = 20_000;
/// Search window bound, well outside any reachable score.
pub const INFINITY: i32 = 1_000_000;
/// Root noise is drawn uniformly from `-NOISE_RANGE..=NOISE_RANGE`.
pub const NOISE_RANGE: i32 = 10;

/// Counters collected while searching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Positions visited by `minimax`, leaves included
    pub nodes: u64,
}

/// Depth-limited negamax agent with fail-hard alpha-beta pruning.
pub struct NegamaxAgent {
    depth: usize,
    heuristic: Box<dyn Heuristic>,
    rng: StdRng,
    stats: SearchStats,
}

impl NegamaxAgent {
    pub fn new(depth: usize, heuristic: Box<dyn Heuristic>) -> Self {
        Self::with_rng(depth, heuristic, StdRng::from_os_rng())
    }

    /// Reproducible noise for a given seed.
    pub fn with_seed(depth: usize, heuristic: Box<dyn Heuristic>, seed: u64) -> Self {
        Self::with_rng(depth, heuristic, StdRng::seed_from_u64(seed))
    }

    fn with_rng(depth: usize, heuristic: Box<dyn Heuristic>, rng: StdRng) -> Self {
        NegamaxAgent {
            depth: depth.max(1),
            heuristic,
            rng,
            stats: SearchStats::default(),
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = SearchStats::default();
    }

    /// Pick the best of `candidates` for `color`, or `None` if there are none.
    pub fn best_move(
        &mut self,
        board: &Board,
        candidates: &[Move],
        color: Color,
        depth: usize,
        inject_noise: bool,
    ) -> Option<Move> {
        self.best_move_scored(board, candidates, color, depth, inject_noise)
            .map(|(mv, _)| mv)
    }

    /// Like [`best_move`](Self::best_move) but also returns the winning score,
    /// noise included.
    ///
    /// Every root child is searched with a full window. Only a strictly higher
    /// score replaces the current best, so ties keep the earlier candidate.
    pub fn best_move_scored(
        &mut self,
        board: &Board,
        candidates: &[Move],
        color: Color,
        depth: usize,
        inject_noise: bool,
    ) -> Option<(Move, i32)> {
        let depth = depth.max(1);
        let mut best: Option<(Move, i32)> = None;

        for mv in candidates {
            let child = board.with_move(mv);
            let mut score = -self.minimax(&child, color.other(), depth - 1, -INFINITY, INFINITY);
            if inject_noise {
                score += self.rng.random_range(-NOISE_RANGE..=NOISE_RANGE);
            }
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((*mv, score)),
            }
        }

        best
    }

    /// Negamax value of `board` for `side`, the side to move.
    pub fn minimax(
        &mut self,
        board: &Board,
        side: Color,
        depth: usize,
        mut alpha: i32,
        beta: i32,
    ) -> i32 {
        self.stats.nodes += 1;

        if depth == 0 {
            return self.heuristic.evaluate(board, side);
        }

        let moves = legal_moves(board, side);
        if moves.is_empty() {
            return if in_check(board, side) { -MATE_SCORE } else { 0 };
        }

        for mv in &moves {
            let score = -self.minimax(&board.with_move(mv), side.other(), depth - 1, -beta, -alpha);
            if score >= beta {
                return beta;
            }
            if score > alpha {
                alpha = score;
            }
        }

        alpha
    }
}

impl Agent for NegamaxAgent {
    fn select_move(&mut self, state: &GameState, training: bool) -> Option<Move> {
        let depth = self.depth;
        self.best_move(
            state.board(),
            state.legal_moves(),
            state.side_to_move(),
            depth,
            training,
        )
    }

    fn name(&self) -> &str {
        "Negamax"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::notation::parse_uci;
    use crate::game::DEFAULT_MAX_PLIES;
    use crate::weights::LearnedWeights;

    /// Scores every position the same.
    struct Flat;

    impl Heuristic for Flat {
        fn evaluate(&self, _board: &Board, _color: Color) -> i32 {
            0
        }
    }

    fn weighted(depth: usize) -> NegamaxAgent {
        NegamaxAgent::with_seed(depth, Box::new(LearnedWeights::default()), 42)
    }

    fn board(fen: &str) -> Board {
        Board::from_fen_placement(fen).unwrap()
    }

    #[test]
    fn checkmated_side_scores_minus_mate() {
        // Back-rank mate already on the board, black to move
        let mated = board("R5k1/5ppp/8/8/8/8/8/6K1");
        let mut agent = weighted(2);
        assert_eq!(agent.minimax(&mated, Color::Black, 1, -INFINITY, INFINITY), -MATE_SCORE);
    }

    #[test]
    fn mating_move_scores_plus_mate() {
        let b = board("6k1/5ppp/8/8/8/8/8/R5K1");
        let legal = legal_moves(&b, Color::White);
        let mut agent = weighted(2);
        let (mv, score) = agent
            .best_move_scored(&b, &legal, Color::White, 2, false)
            .unwrap();
        assert_eq!(mv.to_uci(), "a1a8");
        assert_eq!(score, MATE_SCORE);
    }

    #[test]
    fn stalemate_scores_zero() {
        let b = board("k7/2Q5/1K6/8/8/8/8/8");
        let mut agent = weighted(2);
        assert_eq!(agent.minimax(&b, Color::Black, 3, -INFINITY, INFINITY), 0);
    }

    #[test]
    fn captures_hanging_queen() {
        let b = board("4k3/8/8/3q4/8/8/8/3RK3");
        let legal = legal_moves(&b, Color::White);
        let mut agent = weighted(2);
        let mv = agent.best_move(&b, &legal, Color::White, 2, false).unwrap();
        assert_eq!(mv.to_uci(), "d1d5");
    }

    #[test]
    fn ties_keep_first_candidate() {
        let b = Board::starting_position();
        let legal = legal_moves(&b, Color::White);
        let mut agent = NegamaxAgent::with_seed(2, Box::new(Flat), 0);
        let mv = agent.best_move(&b, &legal, Color::White, 2, false).unwrap();
        assert_eq!(mv, legal[0]);
    }

    #[test]
    fn noise_stays_within_range() {
        let b = Board::starting_position();
        let legal = legal_moves(&b, Color::White);
        let mut agent = NegamaxAgent::with_seed(1, Box::new(Flat), 9);
        for _ in 0..50 {
            let (_, score) = agent
                .best_move_scored(&b, &legal, Color::White, 1, true)
                .unwrap();
            assert!((-NOISE_RANGE..=NOISE_RANGE).contains(&score), "score {score}");
        }
    }

    #[test]
    fn empty_candidates_give_none() {
        let mut agent = weighted(2);
        let b = Board::starting_position();
        assert_eq!(agent.best_move(&b, &[], Color::White, 2, true), None);
    }

    #[test]
    fn depth_zero_is_clamped_to_one() {
        let b = Board::starting_position();
        let legal = legal_moves(&b, Color::White);
        let mut agent = weighted(1);
        assert!(agent.best_move(&b, &legal, Color::White, 0, false).is_some());
        // one leaf per root move
        assert_eq!(agent.stats().nodes, 20);

        agent.reset_stats();
        assert_eq!(agent.stats(), SearchStats::default());
    }

    #[test]
    fn select_move_returns_legal_move() {
        let mut agent = weighted(2);
        let mut state = GameState::initial(DEFAULT_MAX_PLIES);
        for uci in ["e2e4", "e7e5"] {
            let mv = parse_uci(uci, state.legal_moves()).unwrap();
            state.apply_move(mv).unwrap();
        }
        let mv = agent.select_move(&state, true).unwrap();
        assert!(state.legal_moves().contains(&mv));
        assert!(agent.stats().nodes > 0);
    }

    #[test]
    fn black_finds_mate_too() {
        let b = board("r5k1/8/8/8/8/8/5PPP/6K1");
        let legal = legal_moves(&b, Color::Black);
        let mut agent = weighted(2);
        let (mv, score) = agent
            .best_move_scored(&b, &legal, Color::Black, 2, false)
            .unwrap();
        assert_eq!(mv.to_uci(), "a8a1");
        assert_eq!(score, MATE_SCORE);
    }

    #[test]
    fn agent_name_and_depth() {
        let agent = NegamaxAgent::new(0, Box::new(Flat));
        assert_eq!(agent.name(), "Negamax");
        assert_eq!(agent.depth(), 1);
    }
}
