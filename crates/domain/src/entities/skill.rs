//! Skill catalog - inherent and learned skill definitions
//!
//! Skills are either:
//! - Inherent: tied to one attribute, full rank range for everyone
//! - Learned: tied to one learning focus, full range only inside the
//!   character's chosen focus
//!
//! The catalog is an arena indexed by `SkillIndex`, with a lookup table from
//! status-effect keys (ids and normalized labels) built once at construction.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::value_objects::Attribute;

/// Specialization group that unlocks the full rank range for its learned skills.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LearningFocus {
    #[default]
    Combat,
    Education,
    /// Older documents call this group "vehicles"
    #[serde(alias = "vehicles")]
    Vocations,
}

impl LearningFocus {
    pub const ALL: [LearningFocus; 3] = [Self::Combat, Self::Education, Self::Vocations];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Combat => "combat",
            Self::Education => "education",
            Self::Vocations => "vocations",
        }
    }
}

impl fmt::Display for LearningFocus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a skill hangs off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillKind {
    Inherent(Attribute),
    Learned(LearningFocus),
}

/// A skill definition from the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillDef {
    pub id: String,
    pub label: String,
    pub kind: SkillKind,
}

impl SkillDef {
    pub fn inherent(id: &str, label: &str, attribute: Attribute) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            kind: SkillKind::Inherent(attribute),
        }
    }

    pub fn learned(id: &str, label: &str, focus: LearningFocus) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            kind: SkillKind::Learned(focus),
        }
    }

    pub fn attribute(&self) -> Option<Attribute> {
        match self.kind {
            SkillKind::Inherent(attribute) => Some(attribute),
            SkillKind::Learned(_) => None,
        }
    }

    pub fn focus(&self) -> Option<LearningFocus> {
        match self.kind {
            SkillKind::Learned(focus) => Some(focus),
            SkillKind::Inherent(_) => None,
        }
    }
}

/// Position of a skill inside its catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SkillIndex(u16);

impl SkillIndex {
    pub fn get(self) -> usize {
        self.0 as usize
    }
}

/// Normalizes a skill label into the snake_case key status text uses.
///
/// "Melee (Sharp)" becomes "melee_(sharp)".
pub fn normalize_skill_key(label: &str) -> String {
    label
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '-' | '(' | ')'))
        .collect()
}

/// Arena of skill definitions plus the key lookup table.
#[derive(Debug, Clone)]
pub struct SkillCatalog {
    skills: Vec<SkillDef>,
    by_key: HashMap<String, SkillIndex>,
}

impl SkillCatalog {
    /// Builds a catalog. Later definitions never shadow an earlier id.
    pub fn from_defs(defs: Vec<SkillDef>) -> Self {
        let mut skills = Vec::with_capacity(defs.len());
        let mut by_key = HashMap::new();

        for def in defs {
            let duplicate = skills
                .iter()
                .any(|s: &SkillDef| s.id.eq_ignore_ascii_case(&def.id));
            if duplicate || skills.len() >= u16::MAX as usize {
                continue;
            }
            let index = SkillIndex(skills.len() as u16);
            // ids win over labels
            by_key.insert(def.id.to_lowercase(), index);
            let label_key = normalize_skill_key(&def.label);
            if !label_key.is_empty() {
                by_key.entry(label_key).or_insert(index);
            }
            skills.push(def);
        }

        Self { skills, by_key }
    }

    /// The built-in Whisperspace catalog, built on first use.
    pub fn whisperspace() -> &'static SkillCatalog {
        static CATALOG: OnceLock<SkillCatalog> = OnceLock::new();
        CATALOG.get_or_init(|| Self::from_defs(whisperspace_skills()))
    }

    pub fn get(&self, index: SkillIndex) -> Option<&SkillDef> {
        self.skills.get(index.get())
    }

    /// Finds a skill by its exact (case-insensitive) id.
    pub fn by_id(&self, id: &str) -> Option<&SkillDef> {
        self.index_of(id).and_then(|index| self.get(index))
    }

    pub fn index_of(&self, id: &str) -> Option<SkillIndex> {
        let index = *self.by_key.get(&id.to_lowercase())?;
        let def = self.get(index)?;
        def.id.eq_ignore_ascii_case(id).then_some(index)
    }

    /// Resolves a status-effect key by id or normalized label.
    pub fn lookup(&self, key: &str) -> Option<SkillIndex> {
        let lowered = key.trim().to_lowercase();
        self.by_key
            .get(&lowered)
            .or_else(|| self.by_key.get(&normalize_skill_key(&lowered)))
            .copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SkillIndex, &SkillDef)> {
        self.skills
            .iter()
            .enumerate()
            .map(|(i, def)| (SkillIndex(i as u16), def))
    }

    pub fn inherent(&self) -> impl Iterator<Item = &SkillDef> {
        self.skills.iter().filter(|s| s.attribute().is_some())
    }

    pub fn learned(&self, focus: LearningFocus) -> impl Iterator<Item = &SkillDef> {
        self.skills.iter().filter(move |s| s.focus() == Some(focus))
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

fn whisperspace_skills() -> Vec<SkillDef> {
    use Attribute::*;
    use LearningFocus::*;

    vec![
        SkillDef::inherent("athletics", "Athletics", Phys),
        SkillDef::inherent("brawling", "Brawling", Phys),
        SkillDef::inherent("endurance", "Endurance", Phys),
        SkillDef::inherent("might", "Might", Phys),
        SkillDef::inherent("acrobatics", "Acrobatics", Ref),
        SkillDef::inherent("perception", "Perception", Ref),
        SkillDef::inherent("sleight_of_hand", "Sleight of Hand", Ref),
        SkillDef::inherent("stealth", "Stealth", Ref),
        SkillDef::inherent("deception", "Deception", Soc),
        SkillDef::inherent("empathy", "Empathy", Soc),
        SkillDef::inherent("intimidation", "Intimidation", Soc),
        SkillDef::inherent("persuasion", "Persuasion", Soc),
        SkillDef::inherent("investigation", "Investigation", Ment),
        SkillDef::inherent("memory", "Memory", Ment),
        SkillDef::inherent("resolve", "Resolve", Ment),
        SkillDef::inherent("willpower", "Willpower", Ment),
        SkillDef::learned("melee_(sharp)", "Melee (Sharp)", Combat),
        SkillDef::learned("melee_(blunt)", "Melee (Blunt)", Combat),
        SkillDef::learned("pistols", "Pistols", Combat),
        SkillDef::learned("rifles", "Rifles", Combat),
        SkillDef::learned("heavy_weapons", "Heavy Weapons", Combat),
        SkillDef::learned("computers", "Computers", Education),
        SkillDef::learned("engineering", "Engineering", Education),
        SkillDef::learned("medicine", "Medicine", Education),
        SkillDef::learned("sciences", "Sciences", Education),
        SkillDef::learned("linguistics", "Linguistics", Education),
        SkillDef::learned("piloting", "Piloting", Vocations),
        SkillDef::learned("mechanics", "Mechanics", Vocations),
        SkillDef::learned("streetwise", "Streetwise", Vocations),
        SkillDef::learned("survival", "Survival", Vocations),
        SkillDef::learned("trade", "Trade", Vocations),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_has_four_inherent_skills_per_attribute() {
        let catalog = SkillCatalog::whisperspace();
        for attribute in Attribute::ALL {
            let count = catalog
                .inherent()
                .filter(|s| s.attribute() == Some(attribute))
                .count();
            assert_eq!(count, 4, "{attribute}");
        }
    }

    #[test]
    fn test_builtin_catalog_has_learned_skills_for_every_focus() {
        let catalog = SkillCatalog::whisperspace();
        for focus in LearningFocus::ALL {
            assert_eq!(catalog.learned(focus).count(), 5, "{focus}");
        }
    }

    #[test]
    fn test_normalize_label_keeps_parentheses() {
        assert_eq!(normalize_skill_key("Melee (Sharp)"), "melee_(sharp)");
        assert_eq!(normalize_skill_key("  Sleight  of Hand "), "sleight_of_hand");
        assert_eq!(normalize_skill_key("Heavy Weapons!"), "heavy_weapons");
    }

    #[test]
    fn test_lookup_resolves_ids_and_labels() {
        let catalog = SkillCatalog::whisperspace();
        let by_id = catalog.lookup("stealth").expect("id");
        let by_label = catalog.lookup("Sleight of Hand").expect("label");
        assert_eq!(catalog.get(by_id).map(|s| s.id.as_str()), Some("stealth"));
        assert_eq!(
            catalog.get(by_label).map(|s| s.id.as_str()),
            Some("sleight_of_hand")
        );
        assert!(catalog.lookup("basket_weaving").is_none());
    }

    #[test]
    fn test_by_id_ignores_label_keys() {
        let catalog = SkillCatalog::from_defs(vec![SkillDef::learned(
            "gun",
            "Pistols",
            LearningFocus::Combat,
        )]);
        assert!(catalog.by_id("gun").is_some());
        assert!(catalog.by_id("pistols").is_none());
        assert!(catalog.lookup("pistols").is_some());
    }

    #[test]
    fn test_duplicate_ids_keep_the_first_definition() {
        let catalog = SkillCatalog::from_defs(vec![
            SkillDef::inherent("stealth", "Stealth", Attribute::Ref),
            SkillDef::inherent("stealth", "Stealth Again", Attribute::Ment),
        ]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(
            catalog.by_id("stealth").and_then(|s| s.attribute()),
            Some(Attribute::Ref)
        );
    }

    #[test]
    fn test_vehicles_deserializes_as_vocations() {
        let focus: LearningFocus = serde_json::from_str("\"vehicles\"").expect("parse");
        assert_eq!(focus, LearningFocus::Vocations);
    }
}
