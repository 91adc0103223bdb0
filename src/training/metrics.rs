use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::game::{Color, Termination};

/// Result of a single finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeResult {
    pub winner: Option<Color>,
    pub game_length: usize,
    pub termination: Termination,
}

/// Training metrics tracker with rolling window computations.
pub struct TrainingMetrics {
    episode_results: VecDeque<EpisodeResult>,
    capacity: usize,
    total_episodes: usize, // lifetime count, never capped
}

impl TrainingMetrics {
    pub fn with_capacity(capacity: usize) -> Self {
        TrainingMetrics {
            episode_results: VecDeque::with_capacity(capacity),
            capacity,
            total_episodes: 0,
        }
    }

    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    pub fn record_episode(&mut self, result: EpisodeResult) {
        self.total_episodes += 1;
        self.episode_results.push_back(result);
        if self.episode_results.len() > self.capacity {
            self.episode_results.pop_front();
        }
    }

    fn recent(&self, last_n: usize) -> impl Iterator<Item = &EpisodeResult> {
        self.episode_results.iter().rev().take(last_n)
    }

    fn rate(&self, last_n: usize, pred: impl Fn(&EpisodeResult) -> bool) -> f32 {
        let n = self.episode_results.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let hits = self.recent(n).filter(|r| pred(r)).count();
        hits as f32 / n as f32
    }

    /// Win rate for White in the last N episodes.
    pub fn win_rate(&self, last_n: usize) -> f32 {
        self.rate(last_n, |r| r.winner == Some(Color::White))
    }

    /// Draw rate in the last N episodes.
    pub fn draw_rate(&self, last_n: usize) -> f32 {
        self.rate(last_n, |r| r.winner.is_none())
    }

    /// Average game length in plies over the last N episodes.
    pub fn average_game_length(&self, last_n: usize) -> f32 {
        let n = self.episode_results.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let total: usize = self.recent(n).map(|r| r.game_length).sum();
        total as f32 / n as f32
    }

    /// How many of the last N episodes ended by `termination`.
    pub fn termination_count(&self, termination: Termination, last_n: usize) -> usize {
        self.recent(last_n)
            .filter(|r| r.termination == termination)
            .count()
    }

    pub fn total_episodes(&self) -> usize {
        self.total_episodes
    }
}

impl Default for TrainingMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-game timing tracker for the progress line.
pub struct TimingMetrics {
    game_micros: VecDeque<u64>,
    capacity: usize,
    window_start: Instant,
    window_count: usize,
}

impl TimingMetrics {
    pub fn with_capacity(capacity: usize) -> Self {
        TimingMetrics {
            game_micros: VecDeque::with_capacity(capacity),
            capacity,
            window_start: Instant::now(),
            window_count: 0,
        }
    }

    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    pub fn record_game_time(&mut self, d: Duration) {
        self.game_micros.push_back(d.as_micros() as u64);
        if self.game_micros.len() > self.capacity {
            self.game_micros.pop_front();
        }
        self.window_count += 1;
    }

    /// Mean of the last `last_n` game times in milliseconds.
    pub fn avg_game_ms(&self, last_n: usize) -> f32 {
        let n = self.game_micros.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let mean = self
            .game_micros
            .iter()
            .rev()
            .take(n)
            .map(|&v| v as f64)
            .sum::<f64>()
            / n as f64;
        (mean / 1000.0) as f32
    }

    /// Games per second since the last `reset_window` call.
    pub fn games_per_sec(&self) -> f32 {
        let micros = self.window_start.elapsed().as_micros();
        if micros == 0 {
            return 0.0;
        }
        self.window_count as f32 / (micros as f32 / 1_000_000.0)
    }

    /// Reset the throughput window (call after each log interval).
    pub fn reset_window(&mut self) {
        self.window_start = Instant::now();
        self.window_count = 0;
    }
}

impl Default for TimingMetrics {
    fn default() -> Self {
        Self::new()
    }
}
