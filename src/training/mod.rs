//! Self-play training: game loop, learning sessions and metrics.

pub mod episode;
pub mod metrics;
pub mod trainer;

pub use episode::{episode_seed, evaluate_vs_random, play_eval_game, play_game, GameRecord};
pub use metrics::{EpisodeResult, TimingMetrics, TrainingMetrics};
pub use trainer::{
    watch_for_quit, GameReport, SessionCallbacks, SessionConfig, SessionSummary, Trainer,
    TrainerConfig,
};
