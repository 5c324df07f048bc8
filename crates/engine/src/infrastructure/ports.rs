//! Port traits for everything outside the engine.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use whisperspace_shared::DiceRollRequest;

use super::dice::RollError;

// =============================================================================
// Dice Roller
// =============================================================================

/// Sends roll requests to the external dice roller.
///
/// Totals come back asynchronously through a
/// [`RollCorrelator`](super::dice::RollCorrelator), never as the return value.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DiceRollerPort: Send + Sync {
    async fn request_roll(&self, request: DiceRollRequest) -> Result<(), RollError>;
}

// =============================================================================
// Testability Ports
// =============================================================================

#[cfg_attr(test, mockall::automock)]
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
