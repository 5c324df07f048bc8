//! Whisperspace rules engine
//!
//! One authoritative implementation of the sheet math. Character panels, the
//! initiative tracker and the calculation relay all route through
//! [`RulesEngine`] instead of keeping their own copies.

pub mod combat;
pub mod crucible;
pub mod derivation;
pub mod skills;
pub mod status_effects;

pub use combat::{
    apply_damage, crit_extra_for_margin, AttackKind, AttackOutcome, DamageEvent, DamageReport,
    CRIT_STRESS,
};
pub use crucible::{Crucible, CrucibleStatus, CrucibleTest, CRUCIBLE_BASE_DC};
pub use derivation::{
    derive_attributes, derive_composure, effective_composure, rank_of, SkillRanks,
    ATTRIBUTE_DIVISOR, COMPOSURE_DIVISOR, COMPOSURE_SKILLS,
};
pub use skills::{
    adjust_skill_points, cost_to_reach, max_rank_for, modifier_for, remaining_points, set_rank,
    spent_points, MAX_RANK, OUT_OF_FOCUS_MAX_RANK,
};
pub use status_effects::{ResolvedStatus, StatusDeltas};

use crate::entities::{Armor, LearningFocus, SkillCatalog};
use crate::error::RankEditError;
use crate::value_objects::{AttributeSet, NetDice, WoundTrack};

/// Rules bound to one skill catalog.
#[derive(Debug, Clone, Copy)]
pub struct RulesEngine<'c> {
    catalog: &'c SkillCatalog,
}

impl RulesEngine<'static> {
    /// Engine over the built-in Whisperspace skill list.
    pub fn whisperspace() -> Self {
        Self::new(SkillCatalog::whisperspace())
    }
}

impl<'c> RulesEngine<'c> {
    pub fn new(catalog: &'c SkillCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'c SkillCatalog {
        self.catalog
    }

    pub fn attributes(&self, ranks: &SkillRanks) -> AttributeSet {
        derive_attributes(ranks, self.catalog)
    }

    pub fn composure(&self, ranks: &SkillRanks) -> u32 {
        derive_composure(ranks)
    }

    pub fn resolve_status(&self, deltas: &StatusDeltas) -> ResolvedStatus {
        deltas.resolve(self.catalog)
    }

    pub fn modifier_for(
        &self,
        skill_id: &str,
        ranks: &SkillRanks,
        focus: LearningFocus,
        status: &ResolvedStatus,
    ) -> i32 {
        modifier_for(self.catalog, skill_id, ranks, focus, status)
    }

    pub fn max_rank_for(&self, skill_id: &str, focus: LearningFocus) -> u32 {
        max_rank_for(self.catalog, skill_id, focus)
    }

    pub fn set_rank(
        &self,
        ranks: &mut SkillRanks,
        skill_id: &str,
        rank: i32,
        focus: LearningFocus,
        total_points: u32,
    ) -> Result<u32, RankEditError> {
        set_rank(self.catalog, ranks, skill_id, rank, focus, total_points)
    }

    /// Cancels bonus against penalty dice.
    pub fn net_dice(&self, bonus: u32, penalty: u32) -> NetDice {
        NetDice::cancel(bonus, penalty)
    }

    pub fn resolve_attack(&self, total: i32, use_dc: i32, weapon_damage: i32, label: &str) -> AttackOutcome {
        AttackOutcome::resolve(total, use_dc, weapon_damage, label)
    }

    pub fn apply_damage(
        &self,
        event: &DamageEvent,
        wounds: WoundTrack,
        armor: Option<&Armor>,
        stress: u32,
    ) -> DamageReport {
        apply_damage(event, wounds, armor, stress)
    }
}

impl Default for RulesEngine<'static> {
    fn default() -> Self {
        Self::whisperspace()
    }
}
