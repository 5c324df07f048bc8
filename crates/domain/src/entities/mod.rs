//! Entities - catalog definitions and loadout items

mod item;
mod skill;

pub use item::{Armor, Durability, Feat, InventoryItem, ItemKind, KeywordParam, Weapon};
pub use skill::{normalize_skill_key, LearningFocus, SkillCatalog, SkillDef, SkillIndex, SkillKind};
