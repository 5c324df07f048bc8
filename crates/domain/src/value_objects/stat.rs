//! Stat value objects - the four core attributes and the closed set of keys a
//! status effect can target.
//!
//! Provides type safety for stat references instead of matching reserved
//! words like "phys" or "cuf" at every call site.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::entities::SkillIndex;
use crate::error::UnknownAttribute;
use crate::lenient;

/// Core attributes. Every inherent skill belongs to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attribute {
    /// Physique - strength, endurance, toughness
    Phys,
    /// Reflexes - speed, coordination, perception
    Ref,
    /// Social - presence and reading people
    Soc,
    /// Mental - reasoning and willpower
    Ment,
}

impl Attribute {
    pub const ALL: [Attribute; 4] = [Self::Phys, Self::Ref, Self::Soc, Self::Ment];

    /// Returns the lowercase key used in documents and status text.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Phys => "phys",
            Self::Ref => "ref",
            Self::Soc => "soc",
            Self::Ment => "ment",
        }
    }

    /// Returns the uppercase label shown on the sheet.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Phys => "PHYS",
            Self::Ref => "REF",
            Self::Soc => "SOC",
            Self::Ment => "MENT",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Attribute {
    type Err = UnknownAttribute;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "phys" => Ok(Self::Phys),
            "ref" => Ok(Self::Ref),
            "soc" => Ok(Self::Soc),
            "ment" => Ok(Self::Ment),
            _ => Err(UnknownAttribute(s.to_string())),
        }
    }
}

/// Derived attribute values. Never set directly by a user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSet {
    #[serde(default, deserialize_with = "lenient::count")]
    pub phys: u32,
    #[serde(default, rename = "ref", deserialize_with = "lenient::count")]
    pub reflex: u32,
    #[serde(default, deserialize_with = "lenient::count")]
    pub soc: u32,
    #[serde(default, deserialize_with = "lenient::count")]
    pub ment: u32,
}

impl AttributeSet {
    pub fn get(&self, attribute: Attribute) -> u32 {
        match attribute {
            Attribute::Phys => self.phys,
            Attribute::Ref => self.reflex,
            Attribute::Soc => self.soc,
            Attribute::Ment => self.ment,
        }
    }

    fn slot(&mut self, attribute: Attribute) -> &mut u32 {
        match attribute {
            Attribute::Phys => &mut self.phys,
            Attribute::Ref => &mut self.reflex,
            Attribute::Soc => &mut self.soc,
            Attribute::Ment => &mut self.ment,
        }
    }

    pub fn set(&mut self, attribute: Attribute, value: u32) {
        *self.slot(attribute) = value;
    }

    /// Applies a signed adjustment, flooring at zero.
    pub fn adjusted(mut self, attribute: Attribute, delta: i32) -> Self {
        let current = self.get(attribute) as i64;
        *self.slot(attribute) = (current + delta as i64).max(0) as u32;
        self
    }
}

/// A stat a status effect can adjust.
///
/// Reserved words map to the closed variants; anything else is looked up in
/// the skill catalog and lands in `Skill`, or stays `Unrecognized`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StatKey {
    Attribute(Attribute),
    CarryingCapacity,
    Speed,
    CoolUnderFire,
    Skill(SkillIndex),
    Unrecognized(String),
}

impl StatKey {
    /// Resolves a reserved word (or one of its aliases).
    ///
    /// Returns `None` for keys that must go through the skill lookup.
    pub fn reserved(key: &str) -> Option<Self> {
        if let Ok(attribute) = key.parse::<Attribute>() {
            return Some(Self::Attribute(attribute));
        }
        match key {
            "carrying_capacity" | "carry" | "capacity" => Some(Self::CarryingCapacity),
            "speed" | "spd" => Some(Self::Speed),
            "cool_under_fire" | "cuf" => Some(Self::CoolUnderFire),
            _ => None,
        }
    }
}
