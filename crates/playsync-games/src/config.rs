//! Tunables for the five games.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Game settings shared by every room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Rock-paper-scissors match length. The match ends once a seat has
    /// earned more than `rps_best_of / 2` points.
    pub rps_best_of: u32,

    /// Questions per would-you-rather match.
    pub wyr_rounds: u32,

    /// Bounds of the random reaction go-signal delay, in milliseconds.
    pub reaction_delay_ms: RangeInclusive<u64>,

    /// Largest quick-math operand. Operands are drawn from `1..=max`.
    pub math_operand_max: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rps_best_of: 3,
            wyr_rounds: 3,
            reaction_delay_ms: 1000..=3000,
            math_operand_max: 99,
        }
    }
}
