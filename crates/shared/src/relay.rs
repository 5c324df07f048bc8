//! Request and response bodies of the calculation relay
//!
//! Numeric fields are read leniently: integers, floats (truncated) and numeric
//! strings are all accepted. Anything else counts as missing, so the handler
//! can name every absent field in one error.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use whisperspace_domain::{build_skill_notation, AttackOutcome, NotationError};

/// Label used when an attack request names none
pub const DEFAULT_ATTACK_LABEL: &str = "Attack";

/// One or more required numeric fields were absent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing required fields: {}", .0.join(", "))]
pub struct MissingFields(pub Vec<&'static str>);

fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(int_from_value))
}

fn int_from_value(value: &serde_json::Value) -> Option<i32> {
    let number = match value {
        serde_json::Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok().map(|f| f.trunc() as i64),
        _ => None,
    }?;
    i32::try_from(number).ok()
}

fn require(
    value: Option<i32>,
    name: &'static str,
    missing: &mut Vec<&'static str>,
) -> i32 {
    value.unwrap_or_else(|| {
        missing.push(name);
        0
    })
}

// =============================================================================
// Attack outcome
// =============================================================================

/// `POST /rules-api/calc/attack`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackOutcomeRequest {
    #[serde(default, deserialize_with = "lenient_int")]
    pub total: Option<i32>,
    #[serde(rename = "useDC", default, deserialize_with = "lenient_int")]
    pub use_dc: Option<i32>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub weapon_damage: Option<i32>,
    #[serde(default)]
    pub label: Option<String>,
}

/// A validated attack request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackInput {
    pub total: i32,
    pub use_dc: i32,
    pub weapon_damage: i32,
    pub label: String,
}

impl AttackOutcomeRequest {
    pub fn validate(self) -> Result<AttackInput, MissingFields> {
        let mut missing = Vec::new();
        let total = require(self.total, "total", &mut missing);
        let use_dc = require(self.use_dc, "useDC", &mut missing);
        let weapon_damage = require(self.weapon_damage, "weaponDamage", &mut missing);
        if !missing.is_empty() {
            return Err(MissingFields(missing));
        }

        Ok(AttackInput {
            total,
            use_dc,
            weapon_damage,
            label: self
                .label
                .filter(|l| !l.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_ATTACK_LABEL.to_string()),
        })
    }
}

impl AttackInput {
    pub fn resolve(&self) -> AttackOutcome {
        AttackOutcome::resolve(self.total, self.use_dc, self.weapon_damage, &self.label)
    }
}

/// Attack outcome as sent over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackOutcomeResponse {
    pub total: i32,
    #[serde(rename = "useDC")]
    pub use_dc: i32,
    pub margin: i64,
    pub hit: bool,
    pub is_crit: bool,
    pub crit_extra: u32,
    pub base_damage: i32,
    pub total_damage: i64,
    pub stress_delta: u32,
    pub message: String,
}

impl From<AttackOutcome> for AttackOutcomeResponse {
    fn from(outcome: AttackOutcome) -> Self {
        Self {
            total: outcome.total,
            use_dc: outcome.use_dc,
            margin: outcome.margin,
            hit: outcome.hit,
            is_crit: outcome.is_crit,
            crit_extra: outcome.crit_extra,
            base_damage: outcome.base_damage,
            total_damage: outcome.total_damage,
            stress_delta: outcome.stress_delta,
            message: outcome.message,
        }
    }
}

// =============================================================================
// Skill notation
// =============================================================================

/// `POST /rules-api/calc/notation`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillNotationRequest {
    #[serde(default, deserialize_with = "lenient_int")]
    pub net_dice: Option<i32>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub modifier: Option<i32>,
    #[serde(default)]
    pub label: Option<String>,
}

/// Why a notation request was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotationRequestError {
    #[error(transparent)]
    Missing(#[from] MissingFields),
    #[error(transparent)]
    Invalid(#[from] NotationError),
}

impl SkillNotationRequest {
    /// Builds the dice roller request string.
    pub fn build(self) -> Result<NotationResponse, NotationRequestError> {
        let mut missing = Vec::new();
        let net_dice = require(self.net_dice, "netDice", &mut missing);
        let modifier = require(self.modifier, "modifier", &mut missing);
        if !missing.is_empty() {
            return Err(MissingFields(missing).into());
        }

        let label = self.label.unwrap_or_default();
        let dice_notation = build_skill_notation(net_dice, modifier, &label)?;
        Ok(NotationResponse { dice_notation })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotationResponse {
    pub dice_notation: String,
}
