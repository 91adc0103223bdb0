use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::game::{Color, GameOutcome, PieceType};

/// Games between generation checkpoints.
pub const GAMES_PER_GENERATION: u64 = 100;

/// Learning factor applied to the winning side after a decisive game.
pub const REINFORCE_FACTOR: f64 = 0.01;
/// Learning factor applied to the losing side after a decisive game.
pub const PENALIZE_FACTOR: f64 = -0.01;

/// Bounds for the scalar evaluation weights.
pub const SCALAR_WEIGHT_RANGE: (i32, i32) = (0, 200);

/// Saved king values outside this range are replaced by the default.
pub const KING_VALUE_RANGE: (i32, i32) = (1_000, 100_000);

/// Bounds for a single piece-square entry loaded from a saved record.
pub const POSITION_BONUS_RANGE: (i32, i32) = (-500, 500);

/// Material value per piece type, in centipawns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PieceValues {
    #[serde(rename = "P")]
    pub pawn: i32,
    #[serde(rename = "N")]
    pub knight: i32,
    #[serde(rename = "B")]
    pub bishop: i32,
    #[serde(rename = "R")]
    pub rook: i32,
    #[serde(rename = "Q")]
    pub queen: i32,
    #[serde(rename = "K")]
    pub king: i32,
}

impl Default for PieceValues {
    fn default() -> Self {
        PieceValues {
            pawn: 100,
            knight: 320,
            bishop: 330,
            rook: 500,
            queen: 900,
            king: 20_000,
        }
    }
}

impl PieceValues {
    pub fn get(&self, piece_type: PieceType) -> i32 {
        match piece_type {
            PieceType::Pawn => self.pawn,
            PieceType::Knight => self.knight,
            PieceType::Bishop => self.bishop,
            PieceType::Rook => self.rook,
            PieceType::Queen => self.queen,
            PieceType::King => self.king,
        }
    }

    fn get_mut(&mut self, piece_type: PieceType) -> &mut i32 {
        match piece_type {
            PieceType::Pawn => &mut self.pawn,
            PieceType::Knight => &mut self.knight,
            PieceType::Bishop => &mut self.bishop,
            PieceType::Rook => &mut self.rook,
            PieceType::Queen => &mut self.queen,
            PieceType::King => &mut self.king,
        }
    }

    /// Allowed range for an adapted piece value. The king is never adapted.
    pub fn bounds(piece_type: PieceType) -> Option<(i32, i32)> {
        match piece_type {
            PieceType::Pawn => Some((50, 150)),
            PieceType::Knight | PieceType::Bishop => Some((250, 400)),
            PieceType::Rook => Some((400, 600)),
            PieceType::Queen => Some((800, 1100)),
            PieceType::King => None,
        }
    }
}

// Tables are laid out row by row from row 0 (rank 8) to row 7 (rank 1), as
// seen by white. Black reads them with the row mirrored.

#[rustfmt::skip]
const PAWN_TABLE: [i32; 64] = [
     0,   0,   0,   0,   0,   0,   0,   0,
    50,  50,  50,  50,  50,  50,  50,  50,
    10,  10,  20,  30,  30,  20,  10,  10,
     5,   5,  10,  25,  25,  10,   5,   5,
     0,   0,   0,  20,  20,   0,   0,   0,
     5,  -5, -10,   0,   0, -10,  -5,   5,
     5,  10,  10, -20, -20,  10,  10,   5,
     0,   0,   0,   0,   0,   0,   0,   0,
];

#[rustfmt::skip]
const KNIGHT_TABLE: [i32; 64] = [
   -50, -40, -30, -30, -30, -30, -40, -50,
   -40, -20,   0,   0,   0,   0, -20, -40,
   -30,   0,  10,  15,  15,  10,   0, -30,
   -30,   5,  15,  20,  20,  15,   5, -30,
   -30,   0,  15,  20,  20,  15,   0, -30,
   -30,   5,  10,  15,  15,  10,   5, -30,
   -40, -20,   0,   5,   5,   0, -20, -40,
   -50, -40, -30, -30, -30, -30, -40, -50,
];

#[rustfmt::skip]
const BISHOP_TABLE: [i32; 64] = [
   -20, -10, -10, -10, -10, -10, -10, -20,
   -10,   0,   0,   0,   0,   0,   0, -10,
   -10,   0,   5,  10,  10,   5,   0, -10,
   -10,   5,   5,  10,  10,   5,   5, -10,
   -10,   0,  10,  10,  10,  10,   0, -10,
   -10,  10,  10,  10,  10,  10,  10, -10,
   -10,   5,   0,   0,   0,   0,   5, -10,
   -20, -10, -10, -10, -10, -10, -10, -20,
];

#[rustfmt::skip]
const ROOK_TABLE: [i32; 64] = [
     0,   0,   0,   0,   0,   0,   0,   0,
     5,  10,  10,  10,  10,  10,  10,   5,
    -5,   0,   0,   0,   0,   0,   0,  -5,
    -5,   0,   0,   0,   0,   0,   0,  -5,
    -5,   0,   0,   0,   0,   0,   0,  -5,
    -5,   0,   0,   0,   0,   0,   0,  -5,
    -5,   0,   0,   0,   0,   0,   0,  -5,
     0,   0,   0,   5,   5,   0,   0,   0,
];

#[rustfmt::skip]
const QUEEN_TABLE: [i32; 64] = [
   -20, -10, -10,  -5,  -5, -10, -10, -20,
   -10,   0,   0,   0,   0,   0,   0, -10,
   -10,   0,   5,   5,   5,   5,   0, -10,
    -5,   0,   5,   5,   5,   5,   0,  -5,
     0,   0,   5,   5,   5,   5,   0,  -5,
   -10,   5,   5,   5,   5,   5,   0, -10,
   -10,   0,   5,   0,   0,   0,   0, -10,
   -20, -10, -10,  -5,  -5, -10, -10, -20,
];

#[rustfmt::skip]
const KING_TABLE: [i32; 64] = [
   -30, -40, -40, -50, -50, -40, -40, -30,
   -30, -40, -40, -50, -50, -40, -40, -30,
   -30, -40, -40, -50, -50, -40, -40, -30,
   -30, -40, -40, -50, -50, -40, -40, -30,
   -20, -30, -30, -40, -40, -30, -30, -20,
   -10, -20, -20, -20, -20, -20, -20, -10,
    20,  20,   0,   0,   0,   0,  20,  20,
    20,  30,  10,   0,   0,  10,  30,  20,
];

/// Piece-square tables, 64 entries per piece type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionBonus {
    #[serde(rename = "P")]
    pub pawn: Vec<i32>,
    #[serde(rename = "N")]
    pub knight: Vec<i32>,
    #[serde(rename = "B")]
    pub bishop: Vec<i32>,
    #[serde(rename = "R")]
    pub rook: Vec<i32>,
    #[serde(rename = "Q")]
    pub queen: Vec<i32>,
    #[serde(rename = "K")]
    pub king: Vec<i32>,
}

impl Default for PositionBonus {
    fn default() -> Self {
        PositionBonus {
            pawn: PAWN_TABLE.to_vec(),
            knight: KNIGHT_TABLE.to_vec(),
            bishop: BISHOP_TABLE.to_vec(),
            rook: ROOK_TABLE.to_vec(),
            queen: QUEEN_TABLE.to_vec(),
            king: KING_TABLE.to_vec(),
        }
    }
}

impl PositionBonus {
    pub fn table(&self, piece_type: PieceType) -> &[i32] {
        match piece_type {
            PieceType::Pawn => &self.pawn,
            PieceType::Knight => &self.knight,
            PieceType::Bishop => &self.bishop,
            PieceType::Rook => &self.rook,
            PieceType::Queen => &self.queen,
            PieceType::King => &self.king,
        }
    }

    fn tables_mut(&mut self) -> [&mut Vec<i32>; 6] {
        [
            &mut self.pawn,
            &mut self.knight,
            &mut self.bishop,
            &mut self.rook,
            &mut self.queen,
            &mut self.king,
        ]
    }

    /// Replace any table that does not have exactly 64 entries with the default.
    /// Returns the number of tables replaced.
    fn repair(&mut self) -> usize {
        let defaults = PositionBonus::default();
        let mut repaired = 0;
        for (table, fallback) in [
            (&mut self.pawn, defaults.pawn),
            (&mut self.knight, defaults.knight),
            (&mut self.bishop, defaults.bishop),
            (&mut self.rook, defaults.rook),
            (&mut self.queen, defaults.queen),
            (&mut self.king, defaults.king),
        ] {
            if table.len() != 64 {
                *table = fallback;
                repaired += 1;
            }
        }
        repaired
    }
}

/// Evaluation parameters plus the running self-play record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LearnedWeights {
    pub piece_values: PieceValues,
    pub position_bonus: PositionBonus,
    pub center_control_bonus: i32,
    pub development_bonus: i32,
    pub king_safety_weight: i32,
    pub pawn_structure_weight: i32,
    pub piece_activity_weight: i32,
    pub queen_coordination_bonus: i32,
    pub multi_queen_defense_weight: i32,
    pub games_played: u64,
    pub wins: u64,
    pub losses: u64,
    pub draws: u64,
    pub generation: u64,
}

impl Default for LearnedWeights {
    fn default() -> Self {
        LearnedWeights {
            piece_values: PieceValues::default(),
            position_bonus: PositionBonus::default(),
            center_control_bonus: 10,
            development_bonus: 15,
            king_safety_weight: 20,
            pawn_structure_weight: 10,
            piece_activity_weight: 5,
            queen_coordination_bonus: 50,
            multi_queen_defense_weight: 30,
            games_played: 0,
            wins: 0,
            losses: 0,
            draws: 0,
            generation: 0,
        }
    }
}

impl LearnedWeights {
    /// Overlay a saved record onto the defaults field by field. Inside
    /// `pieceValues` and `positionBonus` each piece is overlaid on its own.
    /// Fields that are missing, unknown or fail to decode keep their default, so
    /// records written by older versions keep loading. Loaded values are then
    /// pulled back into their bounds. Returns `None` when the text is not a
    /// JSON object at all.
    pub fn merge_saved(text: &str) -> Option<LearnedWeights> {
        let Ok(Value::Object(saved)) = serde_json::from_str::<Value>(text) else {
            return None;
        };
        let Ok(Value::Object(mut merged)) = serde_json::to_value(LearnedWeights::default()) else {
            return None;
        };

        for (key, value) in saved {
            let Some(slot) = merged.get(&key) else {
                continue;
            };
            let candidate = match (slot, value) {
                (Value::Object(defaults), Value::Object(fields)) => {
                    let mut nested = defaults.clone();
                    for (field, inner) in fields {
                        if !nested.contains_key(&field) {
                            continue;
                        }
                        let mut attempt = nested.clone();
                        attempt.insert(field.clone(), inner);
                        if decodes_with(&merged, &key, Value::Object(attempt.clone())) {
                            nested = attempt;
                        } else {
                            tracing::debug!(field = %format!("{key}.{field}"), "ignoring undecodable saved field");
                        }
                    }
                    Value::Object(nested)
                }
                (_, value) => value,
            };
            if decodes_with(&merged, &key, candidate.clone()) {
                merged.insert(key, candidate);
            } else {
                tracing::debug!(field = %key, "ignoring undecodable saved field");
            }
        }

        let mut weights: LearnedWeights = serde_json::from_value(Value::Object(merged)).ok()?;
        let repaired = weights.position_bonus.repair();
        if repaired > 0 {
            tracing::debug!(repaired, "replaced malformed position tables with defaults");
        }
        let adjusted = weights.clamp_to_bounds();
        if adjusted > 0 {
            tracing::warn!(adjusted, "saved weights were out of range and have been clamped");
        }
        Some(weights)
    }

    /// Pull every evaluation value into its allowed range. A king value outside
    /// [`KING_VALUE_RANGE`] goes back to the default. Returns how many values
    /// changed.
    fn clamp_to_bounds(&mut self) -> usize {
        let mut adjusted = 0;
        let mut clamp = |value: &mut i32, (lo, hi): (i32, i32)| {
            let bounded = (*value).clamp(lo, hi);
            if bounded != *value {
                *value = bounded;
                adjusted += 1;
            }
        };

        for piece_type in PieceType::ALL {
            if let Some(bounds) = PieceValues::bounds(piece_type) {
                clamp(self.piece_values.get_mut(piece_type), bounds);
            }
        }
        for weight in self.scalar_weights_mut() {
            clamp(weight, SCALAR_WEIGHT_RANGE);
        }
        for table in self.position_bonus.tables_mut() {
            for entry in table.iter_mut() {
                clamp(entry, POSITION_BONUS_RANGE);
            }
        }

        let (lo, hi) = KING_VALUE_RANGE;
        if !(lo..=hi).contains(&self.piece_values.king) {
            self.piece_values.king = PieceValues::default().king;
            adjusted += 1;
        }
        adjusted
    }

    fn scalar_weights_mut(&mut self) -> [&mut i32; 7] {
        [
            &mut self.center_control_bonus,
            &mut self.development_bonus,
            &mut self.king_safety_weight,
            &mut self.pawn_structure_weight,
            &mut self.piece_activity_weight,
            &mut self.queen_coordination_bonus,
            &mut self.multi_queen_defense_weight,
        ]
    }

    /// Perturb the evaluation weights in proportion to `factor`, then clamp them.
    /// A positive factor pushes each value further in its own direction, a
    /// negative one pulls it back.
    pub fn adapt<R: Rng + ?Sized>(&mut self, factor: f64, rng: &mut R) {
        for piece_type in PieceType::ALL {
            let Some((lo, hi)) = PieceValues::bounds(piece_type) else {
                continue;
            };
            let value = self.piece_values.get_mut(piece_type);
            *value = perturb(*value, factor, rng).clamp(lo, hi);
        }

        // scalars are small, so they move by at least one point
        let (lo, hi) = SCALAR_WEIGHT_RANGE;
        for weight in self.scalar_weights_mut() {
            *weight = perturb_at_least_one(*weight, factor, rng).clamp(lo, hi);
        }
    }

    /// Update counters for a finished game, white's perspective. Returns true when
    /// this game completed a generation.
    pub fn record_game(&mut self, outcome: GameOutcome) -> bool {
        self.games_played += 1;
        match outcome {
            GameOutcome::Winner(Color::White) => self.wins += 1,
            GameOutcome::Winner(Color::Black) => self.losses += 1,
            GameOutcome::Draw => self.draws += 1,
        }
        if self.games_played % GAMES_PER_GENERATION == 0 {
            self.generation += 1;
            true
        } else {
            false
        }
    }
}

/// Whether the record still decodes with `merged[key]` replaced by `value`.
fn decodes_with(merged: &Map<String, Value>, key: &str, value: Value) -> bool {
    let mut attempt = merged.clone();
    attempt.insert(key.to_string(), value);
    serde_json::from_value::<LearnedWeights>(Value::Object(attempt)).is_ok()
}

fn step<R: Rng + ?Sized>(value: i32, factor: f64, rng: &mut R) -> i32 {
    let scale: f64 = rng.random_range(0.5..1.5);
    (f64::from(value) * factor * scale).round() as i32
}

fn perturb<R: Rng + ?Sized>(value: i32, factor: f64, rng: &mut R) -> i32 {
    value.saturating_add(step(value, factor, rng))
}

/// Like [`perturb`], but a nonzero value never rounds to a zero step.
fn perturb_at_least_one<R: Rng + ?Sized>(value: i32, factor: f64, rng: &mut R) -> i32 {
    let mut delta = step(value, factor, rng);
    if delta == 0 && value != 0 && factor != 0.0 {
        delta = value.signum() * if factor > 0.0 { 1 } else { -1 };
    }
    value.saturating_add(delta)
}
