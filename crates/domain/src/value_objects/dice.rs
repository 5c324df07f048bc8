//! Dice notation for the external dice roller
//!
//! Every roll is a d12. Bonus and penalty dice add extra d12s and keep the
//! highest or lowest one:
//! - "1d12+3 # Stealth" - no net dice
//! - "2d12kh1+3 # Stealth" - one bonus die
//! - "3d12kl1-1 # Pistols" - two penalty dice
//!
//! The engine only formats requests; the roll itself happens elsewhere.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Die size used by every Whisperspace roll
pub const DIE_SIZE: u8 = 12;

/// Most bonus or penalty dice a single roll can carry
pub const MAX_NET_DICE: i8 = 2;

/// Error when building a dice notation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotationError {
    /// Net dice must already be cancelled down to [-2, 2]
    #[error("Net dice out of range: {0} (expected -2..=2)")]
    NetDiceOutOfRange(i32),
}

/// Bonus dice (positive) or penalty dice (negative), already cancelled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct NetDice(i8);

impl NetDice {
    pub const NONE: NetDice = NetDice(0);

    pub fn new(value: i32) -> Result<Self, NotationError> {
        if value.unsigned_abs() > MAX_NET_DICE as u32 {
            return Err(NotationError::NetDiceOutOfRange(value));
        }
        Ok(Self(value as i8))
    }

    /// Cancels bonus and penalty dice pairwise, then clamps to the legal range.
    pub fn cancel(bonus: u32, penalty: u32) -> Self {
        let net = bonus as i64 - penalty as i64;
        Self(net.clamp(-(MAX_NET_DICE as i64), MAX_NET_DICE as i64) as i8)
    }

    pub fn value(self) -> i32 {
        self.0 as i32
    }
}

impl TryFrom<i32> for NetDice {
    type Error = NotationError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NetDice> for i32 {
    fn from(value: NetDice) -> Self {
        value.value()
    }
}

/// A fully specified roll request: dice, flat modifier, and a label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollNotation {
    pub net_dice: NetDice,
    pub modifier: i32,
    pub label: String,
}

impl RollNotation {
    pub fn new(net_dice: NetDice, modifier: i32, label: impl Into<String>) -> Self {
        Self {
            net_dice,
            modifier,
            label: label.into(),
        }
    }

    /// A crucible test: composure as a flat modifier, never extra dice.
    pub fn crucible(composure: u32, dc: u32) -> Self {
        Self::new(
            NetDice::NONE,
            composure as i32,
            format!("Crucible Test (DC {dc})"),
        )
    }

    /// Number of d12s thrown.
    pub fn dice_count(&self) -> u32 {
        1 + self.net_dice.value().unsigned_abs()
    }
}

impl fmt::Display for RollNotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.dice_count(), DIE_SIZE)?;
        match self.net_dice.value() {
            n if n > 0 => write!(f, "kh1")?,
            n if n < 0 => write!(f, "kl1")?,
            _ => {}
        }
        if self.modifier > 0 {
            write!(f, "+{}", self.modifier)?;
        } else if self.modifier < 0 {
            write!(f, "{}", self.modifier)?;
        }
        let label = self.label.trim();
        if !label.is_empty() {
            write!(f, " # {label}")?;
        }
        Ok(())
    }
}

/// Builds the dice roller's request string from raw inputs.
pub fn build_skill_notation(net_dice: i32, modifier: i32, label: &str) -> Result<String, NotationError> {
    let net_dice = NetDice::new(net_dice)?;
    Ok(RollNotation::new(net_dice, modifier, label).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_roll_has_single_die() {
        assert_eq!(build_skill_notation(0, 3, "Stealth").as_deref(), Ok("1d12+3 # Stealth"));
    }

    #[test]
    fn test_bonus_dice_keep_highest() {
        assert_eq!(build_skill_notation(1, 3, "Stealth").as_deref(), Ok("2d12kh1+3 # Stealth"));
    }

    #[test]
    fn test_penalty_dice_keep_lowest() {
        assert_eq!(build_skill_notation(-2, -1, "Pistols").as_deref(), Ok("3d12kl1-1 # Pistols"));
    }

    #[test]
    fn test_zero_modifier_and_empty_label_are_omitted() {
        assert_eq!(build_skill_notation(0, 0, "  ").as_deref(), Ok("1d12"));
    }

    #[test]
    fn test_out_of_range_net_dice_is_rejected() {
        assert_eq!(build_skill_notation(3, 0, "x"), Err(NotationError::NetDiceOutOfRange(3)));
        assert!(NetDice::new(-3).is_err());
    }

    #[test]
    fn test_cancel_pairs_then_clamps() {
        assert_eq!(NetDice::cancel(2, 2), NetDice::NONE);
        assert_eq!(NetDice::cancel(1, 2).value(), -1);
        assert_eq!(NetDice::cancel(5, 0).value(), 2);
        assert_eq!(NetDice::cancel(0, 4).value(), -2);
    }

    #[test]
    fn test_crucible_notation_uses_flat_composure() {
        assert_eq!(RollNotation::crucible(3, 10).to_string(), "1d12+3 # Crucible Test (DC 10)");
        assert_eq!(RollNotation::crucible(0, 9).to_string(), "1d12 # Crucible Test (DC 9)");
    }

    #[test]
    fn test_net_dice_deserialization_validates_range() {
        assert!(serde_json::from_str::<NetDice>("2").is_ok());
        assert!(serde_json::from_str::<NetDice>("-5").is_err());
    }
}
