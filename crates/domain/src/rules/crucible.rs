//! Crucible test: the composure check when stress climbs past the threshold.
//!
//! A test starts `Pending` when one stress change crosses from at most 5 to
//! above 5. Rolling resolves it to `Success` or `Fail`. A failed test can be
//! turned into a success by burning one point of composure; that is the only
//! transition out of `Fail`.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::{RollNotation, StressState};

/// DC before incoming stress is added.
pub const CRUCIBLE_BASE_DC: u32 = 8;

/// The check itself: how much stress came in and what has to be beaten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrucibleTest {
    pub incoming: u32,
    pub dc: u32,
}

impl CrucibleTest {
    pub fn new(incoming: u32) -> Self {
        Self {
            incoming,
            dc: CRUCIBLE_BASE_DC + incoming,
        }
    }

    /// A test for a single stress change, if it crosses the threshold.
    pub fn for_stress_change(before: u32, after: u32) -> Option<Self> {
        if !StressState::crosses_threshold(before, after) {
            return None;
        }
        tracing::debug!(before, after, "stress crossed crucible threshold");
        Some(Self::new(after - before))
    }

    /// Roll request: composure as a flat modifier, no bonus or penalty dice.
    pub fn notation(&self, composure: u32) -> RollNotation {
        RollNotation::crucible(composure, self.dc)
    }

    pub fn passes(&self, total: i32) -> bool {
        total >= self.dc as i32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrucibleStatus {
    Pending,
    #[serde(rename = "success")]
    Succeeded,
    #[serde(rename = "fail")]
    Failed,
}

/// A crucible test in progress, as shown next to the stress track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Crucible {
    #[serde(flatten)]
    pub test: CrucibleTest,
    pub status: CrucibleStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<i32>,
}

impl Crucible {
    pub fn pending(test: CrucibleTest) -> Self {
        Self {
            test,
            status: CrucibleStatus::Pending,
            total: None,
        }
    }

    /// Records the dice total of a pending test.
    pub fn record_roll(&mut self, total: i32) -> Result<CrucibleStatus, DomainError> {
        if self.status != CrucibleStatus::Pending {
            return Err(DomainError::invalid_state_transition(format!(
                "crucible already resolved as {:?}",
                self.status
            )));
        }
        self.total = Some(total);
        self.status = if self.test.passes(total) {
            CrucibleStatus::Succeeded
        } else {
            CrucibleStatus::Failed
        };
        tracing::debug!(total, dc = self.test.dc, status = ?self.status, "crucible rolled");
        Ok(self.status)
    }

    /// Forces a failed test into a success.
    pub fn burn_composure(&mut self) -> Result<(), DomainError> {
        if self.status != CrucibleStatus::Failed {
            return Err(DomainError::invalid_state_transition(
                "composure can only be burned after a failed crucible",
            ));
        }
        self.status = CrucibleStatus::Succeeded;
        Ok(())
    }

    pub fn is_success(&self) -> bool {
        self.status == CrucibleStatus::Succeeded
    }
}
