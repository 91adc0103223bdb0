//! # Self-play chess
//!
//! A chess engine that tunes its own evaluation weights by playing against
//! itself. Both sides search with depth-limited negamax over a material and
//! piece-square evaluation; every decisive game perturbs the shared weights and
//! the result is persisted after each game.
//!
//! ## Modules
//!
//! - [`game`]: board, move generation, legality and the game state machine
//! - [`ai`]: agent trait, evaluation and alpha-beta search
//! - [`weights`]: learned weights, adaptation rule and key-value persistence
//! - [`training`]: self-play sessions, evaluation games and metrics
//! - [`config`]: TOML configuration loading and validation
//! - [`error`]: structured error types

pub mod ai;
pub mod config;
pub mod error;
pub mod game;
pub mod training;
pub mod weights;
