//! Weapon attacks driven through the dice roller.
//!
//! The flow is:
//! 1. Plan the attack (refuses empty slots and empty magazines)
//! 2. Send the notation to the dice roller and wait for its total
//! 3. Classify the total against the weapon's DC
//! 4. Spend one round of ammo

use whisperspace_domain::{AttackOutcome, CharacterSheet, FireError, RulesEngine};

use crate::infrastructure::dice::{RollDispatcher, RollError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttackError {
    #[error(transparent)]
    Fire(#[from] FireError),
    #[error("attack roll failed: {0}")]
    Roll(#[from] RollError),
}

/// One attack: which weapon, extra dice, and an optional message prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttackRequest {
    pub weapon_index: usize,
    pub bonus: u32,
    pub penalty: u32,
    pub prefix: Option<String>,
}

impl AttackRequest {
    pub fn with_weapon(weapon_index: usize) -> Self {
        Self {
            weapon_index,
            ..Self::default()
        }
    }

    pub fn bonus(mut self, bonus: u32) -> Self {
        self.bonus = bonus;
        self
    }

    pub fn penalty(mut self, penalty: u32) -> Self {
        self.penalty = penalty;
        self
    }

    pub fn prefixed(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }
}

pub struct AttackService {
    dice: RollDispatcher,
    rules: RulesEngine<'static>,
}

impl AttackService {
    pub fn new(dice: RollDispatcher) -> Self {
        Self::with_rules(dice, RulesEngine::whisperspace())
    }

    pub fn with_rules(dice: RollDispatcher, rules: RulesEngine<'static>) -> Self {
        Self { dice, rules }
    }

    /// Rolls an attack for `sheet` and spends ammo once the roll settles.
    ///
    /// Nothing is spent when the roll fails or times out.
    pub async fn execute(
        &self,
        sheet: &mut CharacterSheet,
        request: &AttackRequest,
    ) -> Result<AttackOutcome, AttackError> {
        let plan = sheet
            .attack_plan(&self.rules, request.weapon_index, request.bonus, request.penalty)
            .inspect_err(|e| tracing::info!(error = %e, "Attack refused"))?;

        let total = self.dice.roll(&plan.notation).await?;

        let mut outcome = plan.resolve(total);
        if let Some(prefix) = request.prefix.as_deref() {
            outcome = outcome.with_prefix(prefix);
        }
        sheet.fire_weapon(plan.weapon_index)?;

        tracing::info!(
            weapon = %plan.label,
            total,
            use_dc = plan.use_dc,
            hit = outcome.hit,
            damage = outcome.total_damage,
            "Attack resolved"
        );
        Ok(outcome)
    }

    /// Attacks with the first weapon on the sheet.
    pub async fn execute_top_weapon(
        &self,
        sheet: &mut CharacterSheet,
        prefix: Option<&str>,
    ) -> Result<AttackOutcome, AttackError> {
        let mut request = AttackRequest::with_weapon(0);
        request.prefix = prefix.map(str::to_string);
        self.execute(sheet, &request).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use whisperspace_domain::Weapon;
    use whisperspace_shared::DiceRollResult;

    use super::*;
    use crate::infrastructure::dice::RollCorrelator;
    use crate::infrastructure::ports::MockDiceRollerPort;

    fn sheet_with_pistol(ammo_max: u32) -> CharacterSheet {
        let mut sheet = CharacterSheet::new("Vex");
        sheet.skills.insert("pistols".into(), 2);
        sheet
            .weapons
            .push(Weapon::new("Pistol", "pistols", 8, 5).with_ammo_max(ammo_max));
        sheet
    }

    fn service_answering(total: i32) -> AttackService {
        let correlator = Arc::new(RollCorrelator::new());
        let answer = correlator.clone();
        let mut roller = MockDiceRollerPort::new();
        roller.expect_request_roll().times(1).returning(move |request| {
            answer.resolve(&DiceRollResult {
                roll_id: request.roll_id,
                total,
            });
            Ok(())
        });
        AttackService::new(RollDispatcher::new(
            Arc::new(roller),
            correlator,
            Duration::from_secs(1),
        ))
    }

    #[tokio::test]
    async fn test_hit_spends_one_round() {
        let service = service_answering(12);
        let mut sheet = sheet_with_pistol(2);

        let outcome = service
            .execute(&mut sheet, &AttackRequest::with_weapon(0))
            .await
            .unwrap();

        assert!(outcome.hit);
        assert_eq!(outcome.total_damage, 7);
        assert_eq!(sheet.weapons[0].ammo, Some(1));
    }

    #[tokio::test]
    async fn test_miss_still_spends_ammo() {
        let service = service_answering(3);
        let mut sheet = sheet_with_pistol(2);

        let outcome = service.execute_top_weapon(&mut sheet, None).await.unwrap();

        assert!(!outcome.hit);
        assert_eq!(sheet.weapons[0].ammo, Some(1));
    }

    #[tokio::test]
    async fn test_prefix_is_added_to_message() {
        let service = service_answering(12);
        let mut sheet = sheet_with_pistol(2);

        let outcome = service
            .execute_top_weapon(&mut sheet, Some("(Initiative)"))
            .await
            .unwrap();

        assert!(outcome.message.starts_with("(Initiative) "));
    }

    #[tokio::test]
    async fn test_empty_magazine_sends_no_roll() {
        let mut roller = MockDiceRollerPort::new();
        roller.expect_request_roll().never();
        let service = AttackService::new(RollDispatcher::new(
            Arc::new(roller),
            Arc::new(RollCorrelator::new()),
            Duration::from_secs(1),
        ));
        let mut sheet = sheet_with_pistol(1);
        sheet.weapons[0].ammo = Some(0);

        let result = service.execute(&mut sheet, &AttackRequest::with_weapon(0)).await;

        assert!(matches!(result, Err(AttackError::Fire(FireError::OutOfAmmo { .. }))));
    }

    #[tokio::test]
    async fn test_missing_weapon_is_refused() {
        let mut roller = MockDiceRollerPort::new();
        roller.expect_request_roll().never();
        let service = AttackService::new(RollDispatcher::new(
            Arc::new(roller),
            Arc::new(RollCorrelator::new()),
            Duration::from_secs(1),
        ));
        let mut sheet = CharacterSheet::new("Unarmed");

        let result = service.execute_top_weapon(&mut sheet, None).await;

        assert_eq!(result, Err(AttackError::Fire(FireError::NoWeapon { index: 0 })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_out_roll_keeps_ammo() {
        let mut roller = MockDiceRollerPort::new();
        roller.expect_request_roll().times(1).returning(|_| Ok(()));
        let service = AttackService::new(RollDispatcher::new(
            Arc::new(roller),
            Arc::new(RollCorrelator::new()),
            Duration::from_millis(4000),
        ));
        let mut sheet = sheet_with_pistol(2);

        let result = service.execute(&mut sheet, &AttackRequest::with_weapon(0)).await;

        assert_eq!(
            result,
            Err(AttackError::Roll(RollError::TimedOut { after_ms: 4000 }))
        );
        assert_eq!(sheet.weapons[0].ammo, Some(2));
    }

    #[tokio::test]
    async fn test_stressed_attacker_rolls_penalty_die() {
        let correlator = Arc::new(RollCorrelator::new());
        let answer = correlator.clone();
        let mut roller = MockDiceRollerPort::new();
        roller
            .expect_request_roll()
            .withf(|request| request.dice_notation.starts_with("2d12kl1"))
            .times(1)
            .returning(move |request| {
                answer.resolve(&DiceRollResult {
                    roll_id: request.roll_id,
                    total: 9,
                });
                Ok(())
            });
        let service = AttackService::new(RollDispatcher::new(
            Arc::new(roller),
            correlator,
            Duration::from_secs(1),
        ));
        let mut sheet = sheet_with_pistol(2);
        sheet.stress.current = 4;

        service
            .execute(&mut sheet, &AttackRequest::with_weapon(0))
            .await
            .unwrap();
    }
}
