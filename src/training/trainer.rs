use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::ai::NegamaxAgent;
use crate::error::TrainingError;
use crate::game::{Color, GameOutcome, Termination, DEFAULT_MAX_PLIES};
use crate::training::episode::{episode_seed, play_game};
use crate::training::metrics::TrainingMetrics;
use crate::weights::{LearnedWeights, WeightStore, PENALIZE_FACTOR, REINFORCE_FACTOR};

/// Trainer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub games_per_session: usize,
    pub depth_white: usize,
    pub depth_black: usize,
    pub max_plies: usize,
    pub log_interval: usize,
    /// Base seed for reproducible sessions; random when unset
    pub seed: Option<u64>,
    /// Games against a random mover after the session, 0 to skip
    pub eval_games: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            games_per_session: 10,
            depth_white: 2,
            depth_black: 2,
            max_plies: DEFAULT_MAX_PLIES,
            log_interval: 10,
            seed: None,
            eval_games: 0,
        }
    }
}

/// Parameters of one training session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub games: usize,
    pub depth_white: usize,
    pub depth_black: usize,
    pub max_plies: usize,
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig::from(&TrainerConfig::default())
    }
}

impl From<&TrainerConfig> for SessionConfig {
    fn from(config: &TrainerConfig) -> Self {
        SessionConfig {
            games: config.games_per_session,
            depth_white: config.depth_white,
            depth_black: config.depth_black,
            max_plies: config.max_plies,
            seed: config.seed,
        }
    }
}

/// Progress after one finished game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameReport {
    /// 1-based index of the game within the session
    pub game: usize,
    pub games: usize,
    pub outcome: GameOutcome,
    pub termination: Termination,
    pub plies: usize,
    /// Positions searched by both sides
    pub nodes: u64,
    pub elapsed_ms: u64,
    pub wins: usize,
    pub losses: usize,
    pub draws: usize,
    pub generation: u64,
}

/// Totals for a session, white's perspective.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub wins: usize,
    pub losses: usize,
    pub draws: usize,
    /// Games completed and learned from
    pub games: usize,
    /// True when the session ended early on request
    pub stopped: bool,
}

impl SessionSummary {
    /// Share of completed games that had a winner.
    pub fn decisive_rate(&self) -> f32 {
        if self.games == 0 {
            return 0.0;
        }
        (self.wins + self.losses) as f32 / self.games as f32
    }

    fn tally(&mut self, outcome: GameOutcome) {
        self.games += 1;
        match outcome {
            GameOutcome::Winner(Color::White) => self.wins += 1,
            GameOutcome::Winner(Color::Black) => self.losses += 1,
            GameOutcome::Draw => self.draws += 1,
        }
    }
}

/// Optional observers for a session.
#[derive(Default)]
pub struct SessionCallbacks<'a> {
    pub on_progress: Option<Box<dyn FnMut(&GameReport) + 'a>>,
    pub on_complete: Option<Box<dyn FnMut(&SessionSummary) + 'a>>,
    pub on_error: Option<Box<dyn FnMut(&TrainingError) + 'a>>,
}

/// Self-play trainer. Both sides search with the same learned weights and
/// every finished game nudges those weights.
pub struct Trainer {
    store: WeightStore,
    stop: Arc<AtomicBool>,
    metrics: TrainingMetrics,
}

impl Trainer {
    pub fn new(store: WeightStore) -> Self {
        Trainer {
            store,
            stop: Arc::new(AtomicBool::new(false)),
            metrics: TrainingMetrics::new(),
        }
    }

    /// Flag that ends the running session early. It is polled between plies
    /// and between games and cleared when a session starts.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    pub fn weights(&self) -> &LearnedWeights {
        self.store.weights()
    }

    pub fn store(&self) -> &WeightStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut WeightStore {
        &mut self.store
    }

    pub fn metrics(&self) -> &TrainingMetrics {
        &self.metrics
    }

    /// Play `config.games` self-play games in sequence, learning after each.
    ///
    /// On error the remaining games are skipped; updates already applied stay
    /// persisted.
    pub fn run_session(
        &mut self,
        config: SessionConfig,
        mut callbacks: SessionCallbacks<'_>,
    ) -> Result<SessionSummary, TrainingError> {
        self.stop.store(false, Ordering::Relaxed);
        let result = self.play_session(&config, &mut callbacks);
        conclude(result, &mut callbacks)
    }

    fn play_session(
        &mut self,
        config: &SessionConfig,
        callbacks: &mut SessionCallbacks<'_>,
    ) -> Result<SessionSummary, TrainingError> {
        let base_seed = config.seed.unwrap_or_else(|| rand::rng().random());
        let mut summary = SessionSummary::default();

        tracing::info!(
            games = config.games,
            depth_white = config.depth_white,
            depth_black = config.depth_black,
            max_plies = config.max_plies,
            generation = self.store.weights().generation,
            "starting training session"
        );

        for index in 0..config.games {
            if self.stop.load(Ordering::Relaxed) {
                summary.stopped = true;
                break;
            }

            let seed = episode_seed(base_seed, index);
            let weights = self.store.weights().clone();
            let mut white = NegamaxAgent::with_seed(
                config.depth_white,
                Box::new(weights.clone()),
                episode_seed(seed, 0),
            );
            let mut black = NegamaxAgent::with_seed(
                config.depth_black,
                Box::new(weights),
                episode_seed(seed, 1),
            );

            let started = Instant::now();
            let Some(record) = play_game(
                &mut white,
                &mut black,
                config.max_plies,
                true,
                Some(&*self.stop),
                index,
            )?
            else {
                summary.stopped = true;
                break;
            };

            let mut rng = StdRng::seed_from_u64(episode_seed(seed, 2));
            let new_generation = self.learn_from(record.outcome, &mut rng);
            summary.tally(record.outcome);
            self.metrics.record_episode(record.result());

            let nodes = white.stats().nodes + black.stats().nodes;
            let elapsed_ms = started.elapsed().as_millis() as u64;
            tracing::debug!(
                game = index + 1,
                outcome = ?record.outcome,
                termination = record.termination.name(),
                plies = record.plies(),
                nodes,
                elapsed_ms,
                "game finished"
            );
            if new_generation {
                tracing::info!(
                    generation = self.store.weights().generation,
                    games_played = self.store.weights().games_played,
                    "generation complete"
                );
            }

            if let Some(on_progress) = callbacks.on_progress.as_mut() {
                on_progress(&GameReport {
                    game: index + 1,
                    games: config.games,
                    outcome: record.outcome,
                    termination: record.termination,
                    plies: record.plies(),
                    nodes,
                    elapsed_ms,
                    wins: summary.wins,
                    losses: summary.losses,
                    draws: summary.draws,
                    generation: self.store.weights().generation,
                });
            }

            std::thread::yield_now();
        }

        tracing::info!(
            wins = summary.wins,
            losses = summary.losses,
            draws = summary.draws,
            stopped = summary.stopped,
            "training session complete"
        );
        Ok(summary)
    }

    /// Apply the learning rule for one finished game and persist. Decisive
    /// games reinforce then weaken the shared weights; draws only count.
    /// Returns true when the game completed a generation.
    pub fn learn_from<R: Rng + ?Sized>(&mut self, outcome: GameOutcome, rng: &mut R) -> bool {
        let mut new_generation = false;
        self.store.update(|weights| {
            if let GameOutcome::Winner(_) = outcome {
                weights.adapt(REINFORCE_FACTOR, rng);
                weights.adapt(PENALIZE_FACTOR, rng);
            }
            new_generation = weights.record_game(outcome);
        });
        new_generation
    }
}

/// Raise `stop` when a line reading `q` or `quit` arrives on `input`. The
/// thread ends at that line or at end of input, whichever comes first.
pub fn watch_for_quit<R>(input: R, stop: Arc<AtomicBool>) -> JoinHandle<()>
where
    R: BufRead + Send + 'static,
{
    std::thread::spawn(move || {
        for line in input.lines() {
            let Ok(line) = line else {
                break;
            };
            if matches!(line.trim().to_ascii_lowercase().as_str(), "q" | "quit") {
                tracing::info!("quit requested, finishing the current game");
                stop.store(true, Ordering::Relaxed);
                break;
            }
        }
    })
}

fn conclude(
    result: Result<SessionSummary, TrainingError>,
    callbacks: &mut SessionCallbacks<'_>,
) -> Result<SessionSummary, TrainingError> {
    match result {
        Ok(summary) => {
            if let Some(on_complete) = callbacks.on_complete.as_mut() {
                on_complete(&summary);
            }
            Ok(summary)
        }
        Err(err) => {
            tracing::error!(error = %err, "training session failed");
            if let Some(on_error) = callbacks.on_error.as_mut() {
                on_error(&err);
            }
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MoveError;
    use crate::weights::MemoryStore;

    fn quick(games: usize, seed: u64) -> SessionConfig {
        SessionConfig {
            games,
            depth_white: 1,
            depth_black: 1,
            max_plies: 16,
            seed: Some(seed),
        }
    }

    fn trainer_with_backend() -> (Trainer, MemoryStore) {
        let backend = MemoryStore::new();
        let store = WeightStore::load(Box::new(backend.clone()), "w");
        (Trainer::new(store), backend)
    }

    #[test]
    fn test_default_config_values() {
        let config = TrainerConfig::default();
        assert_eq!(config.games_per_session, 10);
        assert_eq!(config.depth_white, 2);
        assert_eq!(config.depth_black, 2);
        assert_eq!(config.max_plies, 200);
        assert_eq!(config.seed, None);

        let session = SessionConfig::default();
        assert_eq!(session.games, 10);
        assert_eq!(session.max_plies, 200);
    }

    #[test]
    fn test_session_plays_and_persists_every_game() {
        let (mut trainer, backend) = trainer_with_backend();
        let mut reports = Vec::new();
        let mut completed = None;

        let summary = trainer
            .run_session(
                quick(3, 1),
                SessionCallbacks {
                    on_progress: Some(Box::new(|r: &GameReport| reports.push(r.clone()))),
                    on_complete: Some(Box::new(|s: &SessionSummary| completed = Some(*s))),
                    on_error: None,
                },
            )
            .unwrap();

        assert_eq!(summary.games, 3);
        assert_eq!(summary.wins + summary.losses + summary.draws, 3);
        assert!(!summary.stopped);
        assert_eq!(completed, Some(summary));
        assert_eq!(reports.len(), 3);
        assert_eq!(reports[2].game, 3);
        assert!(reports.iter().all(|r| r.plies <= 16 && r.nodes > 0));

        assert_eq!(trainer.weights().games_played, 3);
        assert_eq!(trainer.metrics().total_episodes(), 3);
        let saved = LearnedWeights::merge_saved(&backend.raw("w").unwrap()).unwrap();
        assert_eq!(&saved, trainer.weights());
    }

    #[test]
    fn test_seeded_sessions_are_reproducible() {
        let (mut first, _) = trainer_with_backend();
        let (mut second, _) = trainer_with_backend();
        let a = first.run_session(quick(2, 99), SessionCallbacks::default()).unwrap();
        let b = second.run_session(quick(2, 99), SessionCallbacks::default()).unwrap();
        assert_eq!(a, b);
        assert_eq!(first.weights(), second.weights());
    }

    #[test]
    fn test_decisive_game_adapts_weights() {
        let mut trainer = Trainer::new(WeightStore::in_memory());
        let mut rng = StdRng::seed_from_u64(5);
        trainer.learn_from(GameOutcome::Winner(Color::Black), &mut rng);

        let weights = trainer.weights();
        assert_eq!(weights.losses, 1);
        assert_eq!(weights.games_played, 1);
        assert_eq!(weights.piece_values.king, 20_000);
        assert_ne!(weights.piece_values, LearnedWeights::default().piece_values);
    }

    #[test]
    fn test_draw_only_counts() {
        let mut trainer = Trainer::new(WeightStore::in_memory());
        let mut rng = StdRng::seed_from_u64(5);
        trainer.learn_from(GameOutcome::Draw, &mut rng);

        let mut expected = LearnedWeights::default();
        expected.games_played = 1;
        expected.draws = 1;
        assert_eq!(trainer.weights(), &expected);
    }

    #[test]
    fn test_generation_advances_every_hundred_games() {
        let mut trainer = Trainer::new(WeightStore::in_memory());
        trainer.store_mut().update(|w| w.games_played = 98);
        let mut rng = StdRng::seed_from_u64(0);
        assert!(!trainer.learn_from(GameOutcome::Draw, &mut rng));
        assert!(trainer.learn_from(GameOutcome::Winner(Color::White), &mut rng));
        assert_eq!(trainer.weights().generation, 1);
    }

    #[test]
    fn test_stop_flag_ends_session_early() {
        let (mut trainer, _) = trainer_with_backend();
        let stop = trainer.stop_handle();

        let summary = trainer
            .run_session(
                quick(5, 3),
                SessionCallbacks {
                    on_progress: Some(Box::new(move |_: &GameReport| {
                        stop.store(true, Ordering::Relaxed)
                    })),
                    ..Default::default()
                },
            )
            .unwrap();

        assert!(summary.stopped);
        assert_eq!(summary.games, 1);
        assert_eq!(trainer.weights().games_played, 1);
    }

    #[test]
    fn test_quit_line_raises_stop_flag() {
        let stop = Arc::new(AtomicBool::new(false));
        let input = std::io::Cursor::new("\nkeep going\n  Q \nignored\n");
        watch_for_quit(input, Arc::clone(&stop)).join().unwrap();
        assert!(stop.load(Ordering::Relaxed));

        let stop = Arc::new(AtomicBool::new(false));
        let input = std::io::Cursor::new("quitting soon\n");
        watch_for_quit(input, Arc::clone(&stop)).join().unwrap();
        assert!(!stop.load(Ordering::Relaxed));
    }

    #[test]
    fn test_stop_from_another_thread_ends_session() {
        let (mut trainer, _) = trainer_with_backend();
        let stop = trainer.stop_handle();
        let (tx, rx) = std::sync::mpsc::channel::<()>();
        let watcher = std::thread::spawn(move || {
            if rx.recv().is_ok() {
                stop.store(true, Ordering::Relaxed);
            }
        });

        let summary = trainer
            .run_session(
                quick(50, 4),
                SessionCallbacks {
                    on_progress: Some(Box::new(move |r: &GameReport| {
                        if r.game == 2 {
                            let _ = tx.send(());
                            std::thread::sleep(std::time::Duration::from_millis(50));
                        }
                    })),
                    ..Default::default()
                },
            )
            .unwrap();
        watcher.join().unwrap();

        assert!(summary.stopped);
        assert!(summary.games >= 2 && summary.games < 50);
    }

    #[test]
    fn test_error_reaches_callback_and_caller() {
        let mut seen = None;
        let mut completed = false;
        let mut callbacks = SessionCallbacks {
            on_progress: None,
            on_complete: Some(Box::new(|_: &SessionSummary| completed = true)),
            on_error: Some(Box::new(|e: &TrainingError| seen = Some(e.to_string()))),
        };

        let err = TrainingError::Move {
            game: 2,
            source: MoveError::GameOver,
        };
        let result = conclude(Err(err), &mut callbacks);
        drop(callbacks);

        assert!(matches!(result, Err(TrainingError::Move { game: 2, .. })));
        assert_eq!(seen.as_deref(), Some("game 2: game is already over"));
        assert!(!completed);
    }

    #[test]
    fn test_decisive_rate() {
        let summary = SessionSummary {
            wins: 3,
            losses: 1,
            draws: 4,
            games: 8,
            stopped: false,
        };
        assert!((summary.decisive_rate() - 0.5).abs() < 1e-6);
        assert_eq!(SessionSummary::default().decisive_rate(), 0.0);
    }
}
