//! Initiative tracking for one scene.
//!
//! Owns a single ledger behind a lock so every mutation lands one at a time.
//! Rolls are awaited before the lock is taken.

use std::sync::Arc;

use tokio::sync::Mutex;

use whisperspace_domain::{
    CharacterSheet, DomainError, InitiativeEntry, InitiativeLedger, RulesEngine, TokenId,
    TurnAdvance,
};

use crate::infrastructure::dice::{RollDispatcher, RollError};
use crate::infrastructure::ports::ClockPort;

pub struct InitiativeService {
    dice: RollDispatcher,
    rules: RulesEngine<'static>,
    clock: Arc<dyn ClockPort>,
    ledger: Mutex<InitiativeLedger>,
}

impl InitiativeService {
    pub fn new(dice: RollDispatcher, clock: Arc<dyn ClockPort>) -> Self {
        let ledger = InitiativeLedger::new(clock.now());
        Self::with_ledger(dice, clock, ledger)
    }

    /// Resumes tracking from a stored ledger.
    pub fn with_ledger(
        dice: RollDispatcher,
        clock: Arc<dyn ClockPort>,
        ledger: InitiativeLedger,
    ) -> Self {
        Self {
            dice,
            rules: RulesEngine::whisperspace(),
            clock,
            ledger: Mutex::new(ledger),
        }
    }

    /// Rolls REF initiative for a token and records the total.
    pub async fn roll_for(
        &self,
        token_id: TokenId,
        sheet: &CharacterSheet,
        thumb_url: Option<String>,
    ) -> Result<InitiativeEntry, RollError> {
        let roll = sheet.initiative_roll(&self.rules);
        let total = self.dice.roll(&roll.notation).await?;

        let mut entry = roll.entry(token_id, total);
        if let Some(url) = thumb_url {
            entry = entry.with_thumb(url);
        }

        let mut ledger = self.ledger.lock().await;
        let recorded = ledger.upsert(entry, self.clock.now()).clone();
        tracing::info!(
            token_id = %recorded.token_id,
            initiative = recorded.initiative,
            "Initiative recorded"
        );
        Ok(recorded)
    }

    pub async fn advance(&self) -> Option<TurnAdvance> {
        let mut ledger = self.ledger.lock().await;
        let advance = ledger.advance(self.clock.now())?;
        tracing::info!(
            active = %advance.active,
            round = advance.round,
            wrapped = advance.wrapped,
            "Turn advanced"
        );
        Some(advance)
    }

    pub async fn remove(&self, token_id: &TokenId) -> Option<InitiativeEntry> {
        self.ledger.lock().await.remove(token_id, self.clock.now())
    }

    pub async fn set_surprised(&self, token_id: &TokenId, surprised: bool) -> Result<(), DomainError> {
        self.ledger
            .lock()
            .await
            .set_surprised(token_id, surprised, self.clock.now())
    }

    pub async fn clear(&self) {
        self.ledger.lock().await.clear(self.clock.now());
    }

    /// Copy of the current ledger for persistence or display.
    pub async fn snapshot(&self) -> InitiativeLedger {
        self.ledger.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use chrono::{DateTime, TimeZone, Utc};
    use whisperspace_shared::DiceRollResult;

    use super::*;
    use crate::infrastructure::dice::RollCorrelator;
    use crate::infrastructure::ports::{MockClockPort, MockDiceRollerPort};

    fn fixed_clock(now: DateTime<Utc>) -> Arc<dyn ClockPort> {
        let mut clock = MockClockPort::new();
        clock.expect_now().returning(move || now);
        Arc::new(clock)
    }

    /// Roller answering by the label in the notation (`<name> Initiative`).
    fn roller_by_name(totals: &[(&str, i32)], correlator: Arc<RollCorrelator>) -> MockDiceRollerPort {
        let totals: HashMap<String, i32> = totals
            .iter()
            .map(|(name, total)| (format!("# {name} Initiative"), *total))
            .collect();
        let mut roller = MockDiceRollerPort::new();
        roller.expect_request_roll().returning(move |request| {
            let total = totals
                .iter()
                .find(|(suffix, _)| request.dice_notation.ends_with(suffix.as_str()))
                .map(|(_, total)| *total)
                .unwrap_or(1);
            correlator.resolve(&DiceRollResult {
                roll_id: request.roll_id,
                total,
            });
            Ok(())
        });
        roller
    }

    fn service(totals: &[(&str, i32)]) -> InitiativeService {
        let correlator = Arc::new(RollCorrelator::new());
        let roller = roller_by_name(totals, correlator.clone());
        let dice = RollDispatcher::new(Arc::new(roller), correlator, Duration::from_secs(1));
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 20, 0, 0).unwrap();
        InitiativeService::new(dice, fixed_clock(now))
    }

    #[tokio::test]
    async fn test_rolled_entries_sort_by_total() {
        let service = service(&[("Vex", 9), ("Mara", 15)]);

        service
            .roll_for(TokenId::new("t-vex"), &CharacterSheet::new("Vex"), None)
            .await
            .unwrap();
        let mara = service
            .roll_for(
                TokenId::new("t-mara"),
                &CharacterSheet::new("Mara"),
                Some("https://img.example/mara.png".into()),
            )
            .await
            .unwrap();

        assert_eq!(mara.initiative, 15);
        assert_eq!(mara.thumb_url.as_deref(), Some("https://img.example/mara.png"));
        let ledger = service.snapshot().await;
        let order: Vec<&str> = ledger.entries().iter().map(|e| e.token_id.as_str()).collect();
        assert_eq!(order, vec!["t-mara", "t-vex"]);
    }

    #[tokio::test]
    async fn test_unnamed_sheet_rolls_as_token() {
        let service = service(&[("Token", 11)]);

        let entry = service
            .roll_for(TokenId::new("t-1"), &CharacterSheet::default(), None)
            .await
            .unwrap();

        assert_eq!(entry.name, "Token");
        assert_eq!(entry.initiative, 11);
    }

    #[tokio::test]
    async fn test_advancing_wraps_and_clears_surprise() {
        let service = service(&[("Vex", 9), ("Mara", 15)]);
        for name in ["Vex", "Mara"] {
            service
                .roll_for(TokenId::new(name), &CharacterSheet::new(name), None)
                .await
                .unwrap();
        }
        service.set_surprised(&TokenId::new("Vex"), true).await.unwrap();

        // The first token to roll holds the turn; Mara sorts to the top
        let ledger = service.snapshot().await;
        assert_eq!(ledger.active_token_id().map(TokenId::as_str), Some("Vex"));

        let wrap = service.advance().await.unwrap();
        assert_eq!(wrap.active.as_str(), "Mara");
        assert!(wrap.wrapped);
        assert_eq!(wrap.round, 2);
        assert!(service.snapshot().await.entries().iter().all(|e| !e.surprised));

        let next = service.advance().await.unwrap();
        assert_eq!(next.active.as_str(), "Vex");
        assert!(!next.wrapped);
    }

    #[tokio::test]
    async fn test_surprising_unknown_token_is_not_found() {
        let service = service(&[]);

        let result = service.set_surprised(&TokenId::new("ghost"), true).await;

        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_remove_and_clear_empty_the_ledger() {
        let service = service(&[("Vex", 9), ("Mara", 15)]);
        for name in ["Vex", "Mara"] {
            service
                .roll_for(TokenId::new(name), &CharacterSheet::new(name), None)
                .await
                .unwrap();
        }

        assert!(service.remove(&TokenId::new("Vex")).await.is_some());
        assert_eq!(service.snapshot().await.len(), 1);

        service.clear().await;
        assert!(service.snapshot().await.is_empty());
        assert!(service.advance().await.is_none());
    }
}
