//! Initiative ledger - shared turn order for a scene
//!
//! The ledger owns entry ordering and the active-turn cursor. It knows nothing
//! about character stats; callers feed it rolled totals.
//!
//! Order is initiative descending, then most recently updated first, then
//! token id ascending so that the order is total even for identical timestamps.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::TokenId;

/// One combatant's row in the turn order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiativeEntry {
    pub token_id: TokenId,
    #[serde(default = "default_entry_name")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumb_url: Option<String>,
    #[serde(default)]
    pub initiative: i32,
    #[serde(default)]
    pub surprised: bool,
    #[serde(with = "chrono::serde::ts_milliseconds", default = "epoch")]
    pub updated_at: DateTime<Utc>,
}

fn default_entry_name() -> String {
    "Unnamed".to_string()
}

fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

fn turn_order(a: &InitiativeEntry, b: &InitiativeEntry) -> Ordering {
    b.initiative
        .cmp(&a.initiative)
        .then_with(|| b.updated_at.cmp(&a.updated_at))
        .then_with(|| a.token_id.as_str().cmp(b.token_id.as_str()))
}

/// A rolled initiative to insert or replace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertEntry {
    pub token_id: TokenId,
    pub name: String,
    pub thumb_url: Option<String>,
    pub initiative: i32,
    /// `None` keeps the surprised flag of an existing entry
    pub surprised: Option<bool>,
}

impl UpsertEntry {
    pub fn new(token_id: impl Into<TokenId>, name: impl Into<String>, initiative: i32) -> Self {
        Self {
            token_id: token_id.into(),
            name: name.into(),
            thumb_url: None,
            initiative,
            surprised: None,
        }
    }

    pub fn with_thumb(mut self, url: impl Into<String>) -> Self {
        self.thumb_url = Some(url.into());
        self
    }

    pub fn with_surprised(mut self, surprised: bool) -> Self {
        self.surprised = Some(surprised);
        self
    }
}

/// Result of moving the turn cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnAdvance {
    pub active: TokenId,
    /// True when the cursor went from the last entry back to the first
    pub wrapped: bool,
    pub round: u32,
}

/// Ordered turn list plus the active-turn cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiativeLedger {
    entries: Vec<InitiativeEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    active_token_id: Option<TokenId>,
    round: u32,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    updated_at: DateTime<Utc>,
}

impl Default for InitiativeLedger {
    fn default() -> Self {
        Self::new(epoch())
    }
}

impl InitiativeLedger {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            entries: Vec::new(),
            active_token_id: None,
            round: 1,
            updated_at: now,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Entries in turn order.
    pub fn entries(&self) -> &[InitiativeEntry] {
        &self.entries
    }

    pub fn active(&self) -> Option<&InitiativeEntry> {
        let active = self.active_token_id.as_ref()?;
        self.entries.iter().find(|e| &e.token_id == active)
    }

    pub fn active_token_id(&self) -> Option<&TokenId> {
        self.active_token_id.as_ref()
    }

    pub fn get(&self, token_id: &TokenId) -> Option<&InitiativeEntry> {
        self.entries.iter().find(|e| &e.token_id == token_id)
    }

    /// Current round, starting at 1 and counting wraparounds.
    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Inserts or replaces the entry for a token and re-sorts.
    ///
    /// When no valid active entry exists, the top of the new order becomes
    /// active.
    pub fn upsert(&mut self, entry: UpsertEntry, now: DateTime<Utc>) -> &InitiativeEntry {
        let previous = self
            .entries
            .iter()
            .position(|e| e.token_id == entry.token_id)
            .map(|i| self.entries.remove(i));

        let surprised = entry
            .surprised
            .or(previous.map(|e| e.surprised))
            .unwrap_or(false);

        let token_id = entry.token_id.clone();
        self.entries.push(InitiativeEntry {
            token_id: entry.token_id,
            name: entry.name,
            thumb_url: entry.thumb_url,
            initiative: entry.initiative,
            surprised,
            updated_at: now,
        });
        self.normalize();
        self.updated_at = now;

        let index = self
            .entries
            .iter()
            .position(|e| e.token_id == token_id)
            .unwrap_or(0);
        &self.entries[index]
    }

    /// Drops a token's entry. Removing the active entry hands the turn to the
    /// top of the remaining order.
    pub fn remove(&mut self, token_id: &TokenId, now: DateTime<Utc>) -> Option<InitiativeEntry> {
        let index = self.entries.iter().position(|e| &e.token_id == token_id)?;
        let removed = self.entries.remove(index);
        if self.active_token_id.as_ref() == Some(token_id) {
            self.active_token_id = None;
        }
        self.normalize();
        self.updated_at = now;
        Some(removed)
    }

    pub fn set_surprised(
        &mut self,
        token_id: &TokenId,
        surprised: bool,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| &e.token_id == token_id)
            .ok_or_else(|| DomainError::not_found("InitiativeEntry", token_id.as_str()))?;
        entry.surprised = surprised;
        self.updated_at = now;
        Ok(())
    }

    /// Moves the cursor to the next entry, cyclically.
    ///
    /// Wrapping back to the first entry clears every surprised flag and starts
    /// a new round. With no active entry the cursor lands on the first one
    /// without wrapping. Returns `None` on an empty ledger.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Option<TurnAdvance> {
        if self.entries.is_empty() {
            return None;
        }

        let current = self
            .active_token_id
            .as_ref()
            .and_then(|id| self.entries.iter().position(|e| &e.token_id == id));
        let next = current.map_or(0, |i| (i + 1) % self.entries.len());
        let wrapped = current.is_some() && next == 0;

        if wrapped {
            for entry in &mut self.entries {
                entry.surprised = false;
            }
            self.round += 1;
            tracing::debug!(round = self.round, "initiative wrapped to a new round");
        }

        let active = self.entries[next].token_id.clone();
        self.active_token_id = Some(active.clone());
        self.updated_at = now;

        Some(TurnAdvance {
            active,
            wrapped,
            round: self.round,
        })
    }

    /// Empties the ledger and resets the round counter.
    pub fn clear(&mut self, now: DateTime<Utc>) {
        *self = Self::new(now);
    }

    /// Sorts entries and repairs a missing or stale active cursor.
    fn normalize(&mut self) {
        self.entries.sort_by(turn_order);
        let active_is_valid = self
            .active_token_id
            .as_ref()
            .is_some_and(|id| self.entries.iter().any(|e| &e.token_id == id));
        if !active_is_valid {
            self.active_token_id = self.entries.first().map(|e| e.token_id.clone());
        }
    }
}

/// Stored shape; entries may arrive unsorted and the cursor may be stale.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LedgerDocument {
    #[serde(default)]
    entries: Vec<InitiativeEntry>,
    #[serde(default)]
    active_token_id: Option<TokenId>,
    #[serde(default = "first_round")]
    round: u32,
    #[serde(with = "chrono::serde::ts_milliseconds", default = "epoch")]
    updated_at: DateTime<Utc>,
}

fn first_round() -> u32 {
    1
}

impl<'de> Deserialize<'de> for InitiativeLedger {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let doc = LedgerDocument::deserialize(deserializer)?;
        let mut ledger = Self {
            entries: doc.entries,
            active_token_id: doc.active_token_id,
            round: doc.round.max(1),
            updated_at: doc.updated_at,
        };
        ledger.normalize();
        Ok(ledger)
    }
}
