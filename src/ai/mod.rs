mod agent;
mod evaluation;
mod negamax;
mod random;

pub use agent::Agent;
pub use evaluation::{evaluate, Heuristic};
pub use negamax::{NegamaxAgent, SearchStats, INFINITY, MATE_SCORE, NOISE_RANGE};
pub use random::RandomAgent;
