//! Attack outcomes and damage application
//!
//! Both steps are pure: an attack is classified from an already-rolled total,
//! and damage maps the old wound/armor/stress state to a new one. Callers decide
//! which character the results are written back to.

use serde::{Deserialize, Serialize};

use crate::entities::Armor;
use crate::rules::crucible::CrucibleTest;
use crate::value_objects::{WoundFill, WoundTrack};

/// Extra damage for beating the DC by `margin`. 0 below the first crit tier.
pub fn crit_extra_for_margin(margin: i64) -> u32 {
    match margin {
        m if m >= 9 => 4,
        m if m >= 7 => 3,
        m if m >= 4 => 2,
        _ => 0,
    }
}

/// Stress a crit adds on top of its damage
pub const CRIT_STRESS: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttackKind {
    Miss,
    Hit,
    Crit,
}

/// Classified result of one attack roll
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackOutcome {
    pub total: i32,
    #[serde(rename = "useDC")]
    pub use_dc: i32,
    /// Widened so any pair of `i32` inputs fits
    pub margin: i64,
    pub hit: bool,
    pub is_crit: bool,
    pub crit_extra: u32,
    pub base_damage: i32,
    pub total_damage: i64,
    /// Stress incurred by this attack's crit
    pub stress_delta: u32,
    pub message: String,
}

impl AttackOutcome {
    /// Classifies a rolled `total` against `use_dc`.
    pub fn resolve(total: i32, use_dc: i32, weapon_damage: i32, label: &str) -> Self {
        let margin = i64::from(total) - i64::from(use_dc);
        let hit = total >= use_dc;
        let crit_extra = if hit { crit_extra_for_margin(margin) } else { 0 };
        let is_crit = hit && crit_extra > 0;
        let total_damage = if hit {
            i64::from(weapon_damage) + i64::from(crit_extra)
        } else {
            0
        };
        let label = if label.trim().is_empty() { "Attack" } else { label };

        let message = if !hit {
            format!("Miss. {label} rolled {total} vs DC {use_dc}.")
        } else if is_crit {
            format!(
                "Extreme success - crit! {label} rolled {total} vs DC {use_dc}. \
                 Damage: {weapon_damage}+{crit_extra}={total_damage}. (+{CRIT_STRESS} Stress)"
            )
        } else {
            format!("Hit. {label} rolled {total} vs DC {use_dc}. Damage: {weapon_damage}.")
        };

        Self {
            total,
            use_dc,
            margin,
            hit,
            is_crit,
            crit_extra,
            base_damage: weapon_damage,
            total_damage,
            stress_delta: if is_crit { CRIT_STRESS } else { 0 },
            message,
        }
    }

    /// Prepends a source tag such as "(Initiative)" to the message.
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        let prefix = prefix.trim();
        if !prefix.is_empty() {
            self.message = format!("{prefix} {}", self.message);
        }
        self
    }

    pub fn kind(&self) -> AttackKind {
        match (self.hit, self.is_crit) {
            (false, _) => AttackKind::Miss,
            (true, false) => AttackKind::Hit,
            (true, true) => AttackKind::Crit,
        }
    }

    /// The damage event this outcome inflicts on its target.
    pub fn damage_event(&self) -> DamageEvent {
        DamageEvent {
            incoming: u32::try_from(self.total_damage.max(0)).unwrap_or(u32::MAX),
            stress_delta: self.stress_delta,
            unmitigated: false,
        }
    }
}

/// Damage about to land on a character.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageEvent {
    pub incoming: u32,
    /// Extra stress on top of the wound-tier stress (e.g., from a crit)
    #[serde(default)]
    pub stress_delta: u32,
    /// Bypasses armor entirely and does not wear it
    #[serde(default)]
    pub unmitigated: bool,
}

impl DamageEvent {
    pub fn new(incoming: u32) -> Self {
        Self {
            incoming,
            ..Self::default()
        }
    }

    pub fn with_stress(mut self, stress_delta: u32) -> Self {
        self.stress_delta = stress_delta;
        self
    }

    pub fn unmitigated(mut self) -> Self {
        self.unmitigated = true;
        self
    }
}

/// New state after a damage event, plus what changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageReport {
    pub wounds: WoundTrack,
    pub armor: Option<Armor>,
    /// Stress total after the event
    pub stress: u32,
    /// Stress this event added
    pub stress_applied: u32,
    pub after_armor: u32,
    /// Boxes added per tier, and the points that did not fit
    pub fill: WoundFill,
    /// True when every wound tier is full after the event
    pub defeated: bool,
    /// Set when this event pushed stress across the crucible threshold
    pub crucible: Option<CrucibleTest>,
}

impl DamageReport {
    pub fn overflow(&self) -> u32 {
        self.fill.overflow
    }
}

/// Applies one damage event to wound, armor and stress state.
pub fn apply_damage(
    event: &DamageEvent,
    wounds: WoundTrack,
    armor: Option<&Armor>,
    stress: u32,
) -> DamageReport {
    let mut wounds = wounds;
    let mut armor = armor.cloned();

    let protection = armor
        .as_ref()
        .map_or(0, |a| a.effective_protection(event.unmitigated));
    let after_armor = event.incoming.saturating_sub(protection);

    let fill = wounds.fill(after_armor);
    let stress_applied = fill
        .worst_tier()
        .map_or(0, |tier| tier.stress())
        .saturating_add(event.stress_delta);

    if let Some(armor) = armor.as_mut() {
        if !event.unmitigated && !armor.is_broken() && after_armor > 0 {
            armor.wear();
        }
    }

    let next_stress = stress.saturating_add(stress_applied);
    let report = DamageReport {
        wounds,
        armor,
        stress: next_stress,
        stress_applied,
        after_armor,
        fill,
        defeated: wounds.is_full(),
        crucible: CrucibleTest::for_stress_change(stress, next_stress),
    };

    if report.overflow() > 0 {
        tracing::debug!(overflow = report.overflow(), "damage exceeded wound track capacity");
    }
    report
}
