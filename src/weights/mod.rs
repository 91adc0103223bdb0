//! Learned evaluation weights and their persistence.

mod learned;
mod store;

pub use learned::{
    LearnedWeights, PieceValues, PositionBonus, GAMES_PER_GENERATION, PENALIZE_FACTOR,
    REINFORCE_FACTOR, SCALAR_WEIGHT_RANGE,
};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore, WeightStore, DEFAULT_RECORD_KEY};
