use std::path::PathBuf;

/// Errors raised by a key-value store backing the learned weights.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to access record {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Errors from applying a move to a game in progress.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("move {uci} is not legal at ply {ply}")]
    Illegal { uci: String, ply: usize },

    #[error("game is already over")]
    GameOver,
}

/// Errors that abort a training session.
#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error("search returned no move at ply {ply} with {legal} legal moves")]
    NoMoveSelected { ply: usize, legal: usize },

    #[error("game {game}: {source}")]
    Move { game: usize, source: MoveError },

    #[error("game {game}: finished at ply {ply} without an outcome")]
    MissingOutcome { game: usize, ply: usize },
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

/// Errors from reading squares, moves or FEN text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotationError {
    #[error("invalid square '{0}'")]
    InvalidSquare(String),

    #[error("invalid move text '{0}'")]
    InvalidMove(String),

    #[error("move '{0}' is not among the legal moves")]
    NotLegal(String),

    #[error("invalid FEN: {0}")]
    Fen(String),
}
