//! Skill modifiers, rank clamps and the skill-point economy.

use crate::entities::{LearningFocus, SkillCatalog};
use crate::error::RankEditError;
use crate::rules::derivation::{clamp_rank, rank_of, SkillRanks};
use crate::rules::status_effects::ResolvedStatus;

/// Highest rank any skill can reach.
pub const MAX_RANK: u32 = 5;

/// Highest rank for a learned skill outside the chosen focus.
pub const OUT_OF_FOCUS_MAX_RANK: u32 = 2;

/// Roll modifier for a skill.
///
/// A trained skill adds its rank. An untrained skill starts at -1, except a
/// learned skill in the character's focus which starts at 0. Status deltas
/// that resolved to the skill are added on top in every case.
pub fn modifier_for(
    catalog: &SkillCatalog,
    skill_id: &str,
    ranks: &SkillRanks,
    focus: LearningFocus,
    status: &ResolvedStatus,
) -> i32 {
    let bonus = catalog.index_of(skill_id).map_or(0, |index| status.skill(index));
    let rank = rank_of(ranks, skill_id);
    if rank > 0 {
        return rank as i32 + bonus;
    }

    let in_focus = catalog
        .by_id(skill_id)
        .and_then(|skill| skill.focus())
        .is_some_and(|f| f == focus);
    if in_focus {
        bonus
    } else {
        bonus - 1
    }
}

/// Rank clamp for edits. Unknown ids behave like inherent skills.
pub fn max_rank_for(catalog: &SkillCatalog, skill_id: &str, focus: LearningFocus) -> u32 {
    match catalog.by_id(skill_id).and_then(|skill| skill.focus()) {
        Some(f) if f != focus => OUT_OF_FOCUS_MAX_RANK,
        _ => MAX_RANK,
    }
}

/// Points needed to raise a skill from 0 to `rank`: the triangular number.
///
/// Ranks above `MAX_RANK` cost the same as `MAX_RANK`.
pub const fn cost_to_reach(rank: u32) -> u32 {
    let rank = if rank > MAX_RANK { MAX_RANK } else { rank };
    rank * (rank + 1) / 2
}

/// Points already spent across every ranked skill.
pub fn spent_points(ranks: &SkillRanks) -> u32 {
    ranks
        .values()
        .map(|rank| cost_to_reach(clamp_rank(*rank)))
        .fold(0, u32::saturating_add)
}

/// Points still available, never negative.
pub fn remaining_points(total: u32, ranks: &SkillRanks) -> u32 {
    total.saturating_sub(spent_points(ranks))
}

/// Changes the total allotment by `delta`, never dropping below what is spent.
pub fn adjust_skill_points(total: u32, ranks: &SkillRanks, delta: i32) -> u32 {
    let next = u32::try_from((i64::from(total) + i64::from(delta)).max(0)).unwrap_or(u32::MAX);
    next.max(spent_points(ranks))
}

/// Sets a rank after clamping it to `max_rank_for`.
///
/// Lowering a rank always succeeds. Raising one fails when its extra cost
/// exceeds the remaining points. Rank 0 removes the entry. Returns the rank
/// actually stored.
pub fn set_rank(
    catalog: &SkillCatalog,
    ranks: &mut SkillRanks,
    skill_id: &str,
    requested: i32,
    focus: LearningFocus,
    total_points: u32,
) -> Result<u32, RankEditError> {
    let skill = catalog
        .by_id(skill_id)
        .ok_or_else(|| RankEditError::UnknownSkill(skill_id.to_string()))?;

    let current = rank_of(ranks, &skill.id);
    let target = (requested.max(0) as u32).min(max_rank_for(catalog, &skill.id, focus));
    if target == current {
        return Ok(current);
    }

    if target > current {
        let needed = cost_to_reach(target) - cost_to_reach(current);
        let remaining = remaining_points(total_points, ranks);
        if needed > remaining {
            return Err(RankEditError::InsufficientPoints { needed, remaining });
        }
    }

    if target == 0 {
        ranks.remove(&skill.id);
    } else {
        ranks.insert(skill.id.clone(), target as i32);
    }
    Ok(target)
}
