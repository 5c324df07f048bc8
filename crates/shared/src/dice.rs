//! Dice roller protocol
//!
//! The engine sends a notation and later receives a total tagged with the same
//! roll id. Transport belongs to the host.

use serde::{Deserialize, Serialize};

/// Who sees a roll's result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollTarget {
    #[default]
    Everyone,
    #[serde(rename = "self")]
    OnlyMe,
    Dm,
    GmOnly,
}

/// Outgoing roll request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiceRollRequest {
    pub roll_id: String,
    pub dice_notation: String,
    #[serde(default)]
    pub roll_target: RollTarget,
    #[serde(default = "default_show_results")]
    pub show_results: bool,
}

fn default_show_results() -> bool {
    true
}

impl DiceRollRequest {
    pub fn new(roll_id: impl Into<String>, dice_notation: impl Into<String>) -> Self {
        Self {
            roll_id: roll_id.into(),
            dice_notation: dice_notation.into(),
            roll_target: RollTarget::Everyone,
            show_results: true,
        }
    }
}

/// Incoming roll result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiceRollResult {
    pub roll_id: String,
    pub total: i32,
}
