use std::io::BufReader;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use selfplay_chess::config::AppConfig;
use selfplay_chess::error::TrainingError;
use selfplay_chess::game::Termination;
use selfplay_chess::training::{
    evaluate_vs_random, watch_for_quit, GameReport, SessionCallbacks, SessionConfig,
    TimingMetrics, Trainer,
};

/// Tune chess evaluation weights via self-play.
#[derive(Parser)]
#[command(name = "train", about = "Tune chess evaluation weights via self-play")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Override number of games in the session
    #[arg(long)]
    games: Option<usize>,

    /// Override search depth for white
    #[arg(long)]
    depth_white: Option<usize>,

    /// Override search depth for black
    #[arg(long)]
    depth_black: Option<usize>,

    /// Seed for a reproducible session
    #[arg(long)]
    seed: Option<u64>,

    /// Override directory holding the learned weights
    #[arg(long)]
    weights_dir: Option<PathBuf>,

    /// Games against a random mover after training, 0 to skip
    #[arg(long)]
    eval_games: Option<usize>,

    /// Discard saved weights and start from the defaults
    #[arg(long)]
    reset: bool,

    /// Print the default configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", AppConfig::default_toml()?);
        return Ok(());
    }

    // Load configuration
    let mut app_config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    // Apply CLI overrides
    if let Some(games) = cli.games {
        app_config.training.games_per_session = games;
    }
    if let Some(depth) = cli.depth_white {
        app_config.training.depth_white = depth;
    }
    if let Some(depth) = cli.depth_black {
        app_config.training.depth_black = depth;
    }
    if cli.seed.is_some() {
        app_config.training.seed = cli.seed;
    }
    if let Some(dir) = cli.weights_dir {
        app_config.store.dir = dir;
    }
    if let Some(eval_games) = cli.eval_games {
        app_config.training.eval_games = eval_games;
    }
    app_config
        .validate()
        .context("invalid configuration after command-line overrides")?;

    let mut store = app_config.store.open();
    if cli.reset {
        store.reset();
        println!("Weights reset to defaults");
    }

    let training = app_config.training.clone();
    let mut trainer = Trainer::new(store);
    let weights = trainer.weights();
    println!(
        "Starting self-play for {} games (depth {}/{}, generation {}, {} games played)...",
        training.games_per_session,
        training.depth_white,
        training.depth_black,
        weights.generation,
        weights.games_played,
    );
    println!("Type q and press Enter to stop after the current game.");
    println!("-------------------------------------------");

    // Detached: it may still be waiting on stdin when main returns.
    watch_for_quit(BufReader::new(std::io::stdin()), trainer.stop_handle());

    let mut timing = TimingMetrics::new();
    let log_interval = training.log_interval;
    let callbacks = SessionCallbacks {
        on_progress: Some(Box::new(|report: &GameReport| {
            timing.record_game_time(Duration::from_millis(report.elapsed_ms));
            if report.game % log_interval == 0 || report.game == report.games {
                println!(
                    "Game {}/{} | W/L/D: {}/{}/{} | last: {} in {} plies | {:.1} ms/game | {:.2} games/s | gen {}",
                    report.game,
                    report.games,
                    report.wins,
                    report.losses,
                    report.draws,
                    report.termination.name(),
                    report.plies,
                    timing.avg_game_ms(log_interval),
                    timing.games_per_sec(),
                    report.generation,
                );
                timing.reset_window();
            }
        })),
        on_complete: None,
        on_error: Some(Box::new(|err: &TrainingError| eprintln!("Training aborted: {err}"))),
    };

    let summary = trainer
        .run_session(SessionConfig::from(&training), callbacks)
        .context("training session failed")?;

    println!("-------------------------------------------");
    if summary.stopped {
        println!("Session stopped early.");
    }
    println!(
        "Session complete: {} games | white {} / black {} / draws {} | decisive {:.1}%",
        summary.games,
        summary.wins,
        summary.losses,
        summary.draws,
        summary.decisive_rate() * 100.0,
    );

    let metrics = trainer.metrics();
    let window = summary.games.max(1);
    let endings: Vec<String> = [
        Termination::Checkmate,
        Termination::Stalemate,
        Termination::Repetition,
        Termination::InsufficientMaterial,
        Termination::MoveCap,
    ]
    .into_iter()
    .map(|t| format!("{} {}", t.name(), metrics.termination_count(t, window)))
    .collect();
    println!(
        "Average length: {:.1} plies | endings: {}",
        metrics.average_game_length(window),
        endings.join(", "),
    );

    let weights = trainer.weights();
    let values = &weights.piece_values;
    println!(
        "Weights (generation {}): P {} N {} B {} R {} Q {}",
        weights.generation, values.pawn, values.knight, values.bishop, values.rook, values.queen,
    );

    if training.eval_games > 0 {
        let win_rate = evaluate_vs_random(
            weights,
            training.depth_white,
            training.eval_games,
            training.max_plies,
            training.seed.unwrap_or_default(),
        )
        .context("evaluation against random mover failed")?;
        println!(
            "Eval vs Random ({} games): {:.1}% win rate",
            training.eval_games,
            win_rate * 100.0
        );
    }

    Ok(())
}
