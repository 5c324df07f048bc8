//! Status effects - free-text "key+N"/"key-N" tags on feats and items.
//!
//! Parsing is fail-open: a malformed token is skipped, never reported, so a
//! bad tag can not keep the rest of a sheet from rendering.

use std::collections::{BTreeMap, HashMap};

use crate::entities::{SkillCatalog, SkillIndex};
use crate::value_objects::{Attribute, StatKey};

/// Signed adjustments keyed by lowercase stat key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusDeltas(BTreeMap<String, i32>);

impl StatusDeltas {
    /// Parses one comma-separated status string.
    pub fn parse(text: &str) -> Self {
        let mut deltas = Self::default();
        for token in text.split(',') {
            if let Some((key, delta)) = parse_token(token) {
                deltas.add(key, delta);
            }
        }
        deltas
    }

    /// Sums the deltas of several sources per key.
    pub fn merge<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        sources
            .into_iter()
            .map(|text| Self::parse(text.as_ref()))
            .fold(Self::default(), |mut acc, next| {
                acc.absorb(next);
                acc
            })
    }

    /// Adds every entry of `other` into `self`.
    pub fn absorb(&mut self, other: StatusDeltas) {
        for (key, delta) in other.0 {
            self.add(key, delta);
        }
    }

    fn add(&mut self, key: String, delta: i32) {
        let slot = self.0.entry(key).or_insert(0);
        *slot = slot.saturating_add(delta);
    }

    /// Delta for a key, compared case-insensitively.
    pub fn get(&self, key: &str) -> i32 {
        self.0.get(&normalize_key(key)).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i32)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Classifies every key against the reserved words and the skill catalog.
    pub fn resolve(&self, catalog: &SkillCatalog) -> ResolvedStatus {
        let mut resolved = ResolvedStatus::default();
        for (key, delta) in self.iter() {
            let stat = StatKey::reserved(key)
                .or_else(|| catalog.lookup(key).map(StatKey::Skill))
                .unwrap_or_else(|| StatKey::Unrecognized(key.to_string()));
            resolved.add(stat, delta);
        }
        resolved
    }
}

fn normalize_key(key: &str) -> String {
    key.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}

/// Splits "stealth+1" into ("stealth", 1). `None` for anything malformed.
fn parse_token(token: &str) -> Option<(String, i32)> {
    let token = token.trim();
    let head = token.trim_end_matches(|c: char| c.is_ascii_digit());
    let digits = &token[head.len()..];
    if digits.is_empty() {
        return None;
    }

    let head = head.trim_end();
    let (key, negative) = if let Some(key) = head.strip_suffix('+') {
        (key, false)
    } else if let Some(key) = head.strip_suffix('-') {
        (key, true)
    } else {
        return None;
    };

    let key = normalize_key(key);
    if key.is_empty() {
        return None;
    }

    let magnitude: i32 = digits.parse().ok()?;
    Some((key, if negative { -magnitude } else { magnitude }))
}

/// Merged deltas grouped by what they adjust.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedStatus {
    deltas: HashMap<StatKey, i32>,
}

impl ResolvedStatus {
    fn add(&mut self, key: StatKey, delta: i32) {
        let slot = self.deltas.entry(key).or_insert(0);
        *slot = slot.saturating_add(delta);
    }

    pub fn get(&self, key: &StatKey) -> i32 {
        self.deltas.get(key).copied().unwrap_or(0)
    }

    pub fn attribute(&self, attribute: Attribute) -> i32 {
        self.get(&StatKey::Attribute(attribute))
    }

    pub fn skill(&self, index: SkillIndex) -> i32 {
        self.get(&StatKey::Skill(index))
    }

    pub fn carrying_capacity(&self) -> i32 {
        self.get(&StatKey::CarryingCapacity)
    }

    pub fn speed(&self) -> i32 {
        self.get(&StatKey::Speed)
    }

    pub fn cool_under_fire(&self) -> i32 {
        self.get(&StatKey::CoolUnderFire)
    }

    /// Keys that matched neither a reserved word nor a skill.
    pub fn unrecognized(&self) -> impl Iterator<Item = (&str, i32)> {
        self.deltas.iter().filter_map(|(key, delta)| match key {
            StatKey::Unrecognized(name) => Some((name.as_str(), *delta)),
            _ => None,
        })
    }
}
