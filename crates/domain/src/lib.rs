//! Whisperspace domain - the tabletop rules engine
//!
//! Pure calculations over plain character data: attribute and composure
//! derivation, skill modifiers, status effects, attack and damage resolution,
//! the crucible check, and the initiative ledger. Nothing here performs I/O or
//! generates randomness; die totals come from an external roller.

pub mod aggregates;
pub mod character_sheet;
pub mod entities;
pub mod error;
pub mod ids;
mod lenient;
pub mod rules;
pub mod value_objects;

pub use aggregates::{InitiativeEntry, InitiativeLedger, TurnAdvance, UpsertEntry};
pub use character_sheet::{
    AttackPlan, CharacterSheet, DerivedStats, Encumbrance, InitiativeRoll,
};
pub use entities::{
    Armor, Durability, Feat, InventoryItem, ItemKind, KeywordParam, LearningFocus, SkillCatalog,
    SkillDef, SkillIndex, SkillKind, Weapon,
};
pub use error::{DomainError, FireError, RankEditError, UnknownAttribute};
pub use ids::{RollRequestId, TokenId};
pub use rules::{
    AttackKind, AttackOutcome, Crucible, CrucibleStatus, CrucibleTest, DamageEvent, DamageReport,
    ResolvedStatus, RulesEngine, SkillRanks, StatusDeltas,
};
pub use value_objects::{
    build_skill_notation, Attribute, AttributeSet, NetDice, NotationError, RollNotation, StatKey,
    StressState, WoundFill, WoundTier, WoundTrack,
};
