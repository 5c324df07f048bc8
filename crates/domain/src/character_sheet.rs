//! Whisperspace character document
//!
//! Mirrors the fields the host stores on a character. Every field defaults, so
//! partial or older documents deserialize. Operations take the old state and
//! leave the new one in place; persisting it is the caller's job.
//!
//! The `attributes` and `stress.cuf` fields are caches of values derived from
//! skill ranks. [`CharacterSheet::refresh_derived`] keeps them current.

use serde::{Deserialize, Serialize};

use crate::aggregates::UpsertEntry;
use crate::entities::{Armor, Feat, InventoryItem, LearningFocus, Weapon};
use crate::error::{DomainError, FireError, RankEditError};
use crate::ids::TokenId;
use crate::lenient;
use crate::rules::{
    adjust_skill_points, effective_composure, AttackOutcome, Crucible, CrucibleStatus,
    CrucibleTest, DamageEvent, DamageReport, ResolvedStatus, RulesEngine, SkillRanks,
    StatusDeltas,
};
use crate::value_objects::{
    Attribute, AttributeSet, NetDice, RollNotation, StressState, WoundTier, WoundTrack,
    CRUCIBLE_THRESHOLD,
};

/// Base speed before PHYS
pub const BASE_SPEED: i32 = 30;
/// Base carrying capacity before PHYS
pub const BASE_CARRYING_CAPACITY: i32 = 5;
/// Speed and carrying capacity gained per point of PHYS
pub const PER_PHYS: i32 = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CharacterSheet {
    #[serde(deserialize_with = "lenient::text")]
    pub name: String,
    /// Cache of the attributes derived from `skills`
    #[serde(deserialize_with = "lenient::or_default")]
    pub attributes: AttributeSet,
    #[serde(deserialize_with = "lenient::or_default")]
    pub stress: StressState,
    #[serde(deserialize_with = "lenient::or_default")]
    pub wounds: WoundTrack,
    #[serde(deserialize_with = "lenient::ranks")]
    pub skills: SkillRanks,
    #[serde(deserialize_with = "lenient::or_default")]
    pub learning_focus: LearningFocus,
    #[serde(deserialize_with = "lenient::count")]
    pub skill_points: u32,
    #[serde(deserialize_with = "lenient::list")]
    pub weapons: Vec<Weapon>,
    #[serde(deserialize_with = "lenient::optional", skip_serializing_if = "Option::is_none")]
    pub armor: Option<Armor>,
    #[serde(deserialize_with = "lenient::wide_int")]
    pub credits: i64,
    #[serde(deserialize_with = "lenient::list")]
    pub inventory: Vec<InventoryItem>,
    #[serde(deserialize_with = "lenient::flag")]
    pub indomitable: bool,
    #[serde(deserialize_with = "lenient::list")]
    pub feats: Vec<Feat>,
    /// Sheet-level status text, merged with feats and items
    #[serde(deserialize_with = "lenient::optional_text", skip_serializing_if = "Option::is_none")]
    pub status_effects: Option<String>,
    #[serde(deserialize_with = "lenient::optional_text", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Encumbrance {
    Unencumbered,
    Encumbered,
    HeavilyEncumbered,
}

impl Encumbrance {
    pub fn for_bulk(total_bulk: i64, capacity: i32) -> Self {
        let capacity = capacity as i64;
        if total_bulk > capacity * 2 {
            Self::HeavilyEncumbered
        } else if total_bulk > capacity {
            Self::Encumbered
        } else {
            Self::Unencumbered
        }
    }
}

/// Display view of a sheet after status effects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedStats {
    /// Attributes from skill ranks alone
    pub base_attributes: AttributeSet,
    /// Attributes after status deltas, floored at 0
    pub attributes: AttributeSet,
    pub base_composure: u32,
    /// Composure after burned points and status deltas
    pub composure: u32,
    pub speed: i32,
    pub carrying_capacity: i32,
    pub total_bulk: i64,
    pub encumbrance: Encumbrance,
    /// Stress is above composure; every roll takes a penalty die
    pub stressed: bool,
}

/// Everything needed to roll one weapon attack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackPlan {
    pub weapon_index: usize,
    pub label: String,
    pub notation: RollNotation,
    pub use_dc: i32,
    pub damage: i32,
}

impl AttackPlan {
    /// Classifies the rolled total for this plan.
    pub fn resolve(&self, total: i32) -> AttackOutcome {
        AttackOutcome::resolve(total, self.use_dc, self.damage, &self.label)
    }
}

/// A REF-based initiative roll for one character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitiativeRoll {
    pub name: String,
    pub notation: RollNotation,
}

impl InitiativeRoll {
    /// Net dice -1 when stressed, effective REF as modifier.
    pub fn for_sheet(sheet: &CharacterSheet, engine: &RulesEngine<'_>) -> Self {
        let derived = sheet.derived_view(engine);
        let name = if sheet.name.trim().is_empty() {
            "Token".to_string()
        } else {
            sheet.name.trim().to_string()
        };
        let net_dice = if derived.stressed {
            NetDice::cancel(0, 1)
        } else {
            NetDice::NONE
        };
        let notation = RollNotation::new(
            net_dice,
            derived.attributes.get(Attribute::Ref) as i32,
            format!("{name} Initiative"),
        );
        Self { name, notation }
    }

    /// Ledger entry for the rolled total.
    pub fn entry(&self, token_id: impl Into<TokenId>, total: i32) -> UpsertEntry {
        UpsertEntry::new(token_id, self.name.clone(), total)
    }
}

impl CharacterSheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            ..Self::default()
        }
    }

    // =========================================================================
    // Derived values
    // =========================================================================

    /// Merged status deltas from feats, inventory and the sheet-level text.
    pub fn status(&self) -> StatusDeltas {
        let feats = self.feats.iter().map(|f| f.status_effects.as_str());
        let items = self.inventory.iter().map(|i| i.status_effects.as_str());
        let sheet = self.status_effects.as_deref();
        StatusDeltas::merge(feats.chain(items).chain(sheet))
    }

    pub fn resolved_status(&self, engine: &RulesEngine<'_>) -> ResolvedStatus {
        engine.resolve_status(&self.status())
    }

    /// Recomputes the attribute and composure caches from skill ranks.
    pub fn refresh_derived(&mut self, engine: &RulesEngine<'_>) {
        self.attributes = engine.attributes(&self.skills);
        self.stress.cuf = engine.composure(&self.skills);
    }

    pub fn total_bulk(&self) -> i64 {
        let weapons = self
            .weapons
            .iter()
            .map(|w| i64::from(w.bulk.unwrap_or(0)))
            .fold(0, i64::saturating_add);
        let armor = i64::from(self.armor.as_ref().and_then(|a| a.bulk).unwrap_or(0));
        let items = self
            .inventory
            .iter()
            .map(InventoryItem::total_bulk)
            .fold(0, i64::saturating_add);
        weapons + armor + items
    }

    pub fn derived_view(&self, engine: &RulesEngine<'_>) -> DerivedStats {
        let status = self.resolved_status(engine);
        let base_attributes = engine.attributes(&self.skills);
        let attributes = Attribute::ALL.iter().fold(base_attributes, |set, attribute| {
            set.adjusted(*attribute, status.attribute(*attribute))
        });

        let base_composure = engine.composure(&self.skills);
        let composure = effective_composure(
            base_composure,
            self.stress.cuf_loss,
            status.cool_under_fire(),
        );

        let phys = attributes.phys as i32;
        let carrying_capacity = BASE_CARRYING_CAPACITY + PER_PHYS * phys + status.carrying_capacity();
        let total_bulk = self.total_bulk();

        DerivedStats {
            base_attributes,
            attributes,
            base_composure,
            composure,
            speed: BASE_SPEED + PER_PHYS * phys + status.speed(),
            carrying_capacity,
            total_bulk,
            encumbrance: Encumbrance::for_bulk(total_bulk, carrying_capacity),
            stressed: self.stress.current > composure,
        }
    }

    // =========================================================================
    // Rolls
    // =========================================================================

    pub fn skill_modifier(&self, engine: &RulesEngine<'_>, skill_id: &str) -> i32 {
        engine.modifier_for(
            skill_id,
            &self.skills,
            self.learning_focus,
            &self.resolved_status(engine),
        )
    }

    /// Penalty dice from stress: 1 while stressed.
    fn stress_penalty(&self, engine: &RulesEngine<'_>) -> u32 {
        u32::from(self.derived_view(engine).stressed)
    }

    /// Skill roll request. Bonus and penalty dice cancel, stress adds one
    /// penalty die.
    pub fn skill_roll(
        &self,
        engine: &RulesEngine<'_>,
        skill_id: &str,
        bonus: u32,
        penalty: u32,
    ) -> RollNotation {
        let label = engine
            .catalog()
            .by_id(skill_id)
            .map_or(skill_id, |skill| skill.label.as_str());
        RollNotation::new(
            NetDice::cancel(bonus, penalty + self.stress_penalty(engine)),
            self.skill_modifier(engine, skill_id),
            label,
        )
    }

    /// Plans an attack with the weapon in `index`.
    ///
    /// Fails before any roll is requested when the slot is empty or the
    /// weapon is out of ammo.
    pub fn attack_plan(
        &self,
        engine: &RulesEngine<'_>,
        index: usize,
        bonus: u32,
        penalty: u32,
    ) -> Result<AttackPlan, FireError> {
        let weapon = self.weapons.get(index).ok_or(FireError::NoWeapon { index })?;
        weapon.ensure_can_fire()?;

        let label = weapon.display_name().to_string();
        let notation = RollNotation::new(
            NetDice::cancel(bonus, penalty + self.stress_penalty(engine)),
            self.skill_modifier(engine, &weapon.skill_id),
            label.clone(),
        );

        Ok(AttackPlan {
            weapon_index: index,
            label,
            notation,
            use_dc: weapon.use_dc,
            damage: weapon.damage,
        })
    }

    pub fn initiative_roll(&self, engine: &RulesEngine<'_>) -> InitiativeRoll {
        InitiativeRoll::for_sheet(self, engine)
    }

    /// Crucible roll request using current effective composure.
    pub fn crucible_roll(&self, engine: &RulesEngine<'_>, test: &CrucibleTest) -> RollNotation {
        test.notation(self.derived_view(engine).composure)
    }

    // =========================================================================
    // Combat state
    // =========================================================================

    /// Applies damage to wounds, armor and stress.
    pub fn apply_damage(&mut self, engine: &RulesEngine<'_>, event: &DamageEvent) -> DamageReport {
        let report = engine.apply_damage(event, self.wounds, self.armor.as_ref(), self.stress.current);
        self.wounds = report.wounds;
        self.armor = report.armor.clone();
        self.stress.current = report.stress;
        report
    }

    /// Sets stress directly and evaluates one crucible trigger for the change.
    pub fn apply_stress(&mut self, next: u32) -> Option<Crucible> {
        let previous = self.stress.current;
        self.stress.current = next;
        CrucibleTest::for_stress_change(previous, next).map(Crucible::pending)
    }

    /// Records the crucible roll; success clamps stress and grants indomitable.
    pub fn resolve_crucible(
        &mut self,
        crucible: &mut Crucible,
        total: i32,
    ) -> Result<CrucibleStatus, DomainError> {
        let status = crucible.record_roll(total)?;
        if status == CrucibleStatus::Succeeded {
            self.withstand_crucible();
        }
        Ok(status)
    }

    /// Burns one point of composure to turn a failed crucible into a success.
    pub fn burn_composure_to_pass(&mut self, crucible: &mut Crucible) -> Result<(), DomainError> {
        crucible.burn_composure()?;
        self.stress.cuf_loss += 1;
        self.withstand_crucible();
        Ok(())
    }

    fn withstand_crucible(&mut self) {
        self.stress.current = CRUCIBLE_THRESHOLD;
        self.indomitable = true;
    }

    pub fn toggle_wound(&mut self, tier: WoundTier, index: u32) {
        self.wounds.toggle(tier, index);
    }

    // =========================================================================
    // Loadout
    // =========================================================================

    pub fn fire_weapon(&mut self, index: usize) -> Result<(), FireError> {
        self.weapons
            .get_mut(index)
            .ok_or(FireError::NoWeapon { index })?
            .fire()
    }

    pub fn reload_weapon(&mut self, index: usize) -> Result<(), FireError> {
        self.weapons
            .get_mut(index)
            .ok_or(FireError::NoWeapon { index })?
            .reload();
        Ok(())
    }

    // =========================================================================
    // Skills
    // =========================================================================

    /// Edits one rank under the clamp and point rules, then refreshes caches.
    pub fn set_skill_rank(
        &mut self,
        engine: &RulesEngine<'_>,
        skill_id: &str,
        rank: i32,
    ) -> Result<u32, RankEditError> {
        let stored = engine.set_rank(
            &mut self.skills,
            skill_id,
            rank,
            self.learning_focus,
            self.skill_points,
        )?;
        self.refresh_derived(engine);
        Ok(stored)
    }

    pub fn adjust_skill_points(&mut self, delta: i32) -> u32 {
        self.skill_points = adjust_skill_points(self.skill_points, &self.skills, delta);
        self.skill_points
    }
}
