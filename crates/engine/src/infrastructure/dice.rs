//! Dice roll dispatch
//!
//! A roll is a request sent through [`DiceRollerPort`] and a total that
//! arrives later, tagged with the same roll id. [`RollCorrelator`] pairs the
//! two; [`RollDispatcher`] wraps the round trip with a timeout.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::oneshot;
use uuid::Uuid;

use whisperspace_domain::{RollNotation, RollRequestId};
use whisperspace_shared::{DiceRollRequest, DiceRollResult};

use super::ports::DiceRollerPort;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RollError {
    #[error("dice roller unavailable: {0}")]
    Transport(String),
    #[error("no dice result after {after_ms}ms")]
    TimedOut { after_ms: u64 },
    #[error("roll abandoned before a result arrived")]
    Abandoned,
}

/// Pending roll requests keyed by roll id.
#[derive(Debug, Default)]
pub struct RollCorrelator {
    pending: Mutex<HashMap<RollRequestId, oneshot::Sender<i32>>>,
}

impl RollCorrelator {
    pub fn new() -> Self {
        Self::default()
    }

    fn pending(&self) -> MutexGuard<'_, HashMap<RollRequestId, oneshot::Sender<i32>>> {
        // A panic while holding the lock cannot leave the map half-written
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Opens a slot for a new roll.
    pub fn register(&self) -> (RollRequestId, oneshot::Receiver<i32>) {
        let id = RollRequestId::new();
        let (tx, rx) = oneshot::channel();
        self.pending().insert(id, tx);
        (id, rx)
    }

    /// Delivers a total to its waiting roll.
    ///
    /// Returns `false` for ids that are unknown, malformed or already settled.
    pub fn resolve(&self, result: &DiceRollResult) -> bool {
        let Ok(uuid) = Uuid::parse_str(&result.roll_id) else {
            tracing::debug!(roll_id = %result.roll_id, "Ignoring dice result with malformed id");
            return false;
        };
        let Some(sender) = self.pending().remove(&RollRequestId::from_uuid(uuid)) else {
            tracing::debug!(roll_id = %result.roll_id, "Ignoring dice result for unknown roll");
            return false;
        };
        sender.send(result.total).is_ok()
    }

    /// Drops a pending roll so a late result is ignored.
    pub fn forget(&self, id: RollRequestId) {
        self.pending().remove(&id);
    }

    pub fn pending_count(&self) -> usize {
        self.pending().len()
    }
}

/// Pending slot that is released however its roll ends, including when the
/// waiting future is dropped.
struct PendingRoll<'a> {
    correlator: &'a RollCorrelator,
    id: RollRequestId,
}

impl Drop for PendingRoll<'_> {
    fn drop(&mut self) {
        self.correlator.forget(self.id);
    }
}

/// Sends a notation to the dice roller and waits for its total.
#[derive(Clone)]
pub struct RollDispatcher {
    roller: Arc<dyn DiceRollerPort>,
    correlator: Arc<RollCorrelator>,
    timeout: Duration,
}

impl RollDispatcher {
    pub fn new(
        roller: Arc<dyn DiceRollerPort>,
        correlator: Arc<RollCorrelator>,
        timeout: Duration,
    ) -> Self {
        Self {
            roller,
            correlator,
            timeout,
        }
    }

    pub fn correlator(&self) -> &Arc<RollCorrelator> {
        &self.correlator
    }

    /// Rolls once. A timed out roll is not retried.
    pub async fn roll(&self, notation: &RollNotation) -> Result<i32, RollError> {
        let (id, receiver) = self.correlator.register();
        let _pending = PendingRoll {
            correlator: &self.correlator,
            id,
        };
        let request = DiceRollRequest::new(id.to_string(), notation.to_string());

        tracing::debug!(roll_id = %id, notation = %request.dice_notation, "Requesting dice roll");
        self.roller.request_roll(request).await?;

        match tokio::time::timeout(self.timeout, receiver).await {
            Ok(Ok(total)) => {
                tracing::debug!(roll_id = %id, total, "Dice roll settled");
                Ok(total)
            }
            Ok(Err(_)) => Err(RollError::Abandoned),
            Err(_) => {
                let after_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
                tracing::warn!(roll_id = %id, after_ms, "Dice roll timed out");
                Err(RollError::TimedOut { after_ms })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::MockDiceRollerPort;
    use whisperspace_domain::NetDice;

    fn notation() -> RollNotation {
        RollNotation::new(NetDice::new(1).unwrap(), 2, "Pistol")
    }

    /// Roller that answers every request with `total` straight away.
    fn answering_roller(correlator: Arc<RollCorrelator>, total: i32) -> MockDiceRollerPort {
        let mut roller = MockDiceRollerPort::new();
        roller.expect_request_roll().returning(move |request| {
            correlator.resolve(&DiceRollResult {
                roll_id: request.roll_id,
                total,
            });
            Ok(())
        });
        roller
    }

    // =========================================================================
    // Correlator
    // =========================================================================

    mod correlator {
        use super::*;

        #[tokio::test]
        async fn test_delivers_total_to_registered_roll() {
            let correlator = RollCorrelator::new();
            let (id, rx) = correlator.register();

            let delivered = correlator.resolve(&DiceRollResult {
                roll_id: id.to_string(),
                total: 14,
            });

            assert!(delivered);
            assert_eq!(rx.await.unwrap(), 14);
            assert_eq!(correlator.pending_count(), 0);
        }

        #[test]
        fn test_ignores_unknown_and_malformed_ids() {
            let correlator = RollCorrelator::new();
            let (_id, _rx) = correlator.register();

            assert!(!correlator.resolve(&DiceRollResult {
                roll_id: Uuid::new_v4().to_string(),
                total: 3,
            }));
            assert!(!correlator.resolve(&DiceRollResult {
                roll_id: "not-a-uuid".into(),
                total: 3,
            }));
            assert_eq!(correlator.pending_count(), 1);
        }

        #[test]
        fn test_second_result_for_same_roll_is_ignored() {
            let correlator = RollCorrelator::new();
            let (id, _rx) = correlator.register();
            let result = DiceRollResult {
                roll_id: id.to_string(),
                total: 9,
            };

            assert!(correlator.resolve(&result));
            assert!(!correlator.resolve(&result));
        }

        #[test]
        fn test_forgotten_roll_ignores_late_result() {
            let correlator = RollCorrelator::new();
            let (id, _rx) = correlator.register();
            correlator.forget(id);

            assert!(!correlator.resolve(&DiceRollResult {
                roll_id: id.to_string(),
                total: 9,
            }));
        }
    }

    // =========================================================================
    // Dispatcher
    // =========================================================================

    mod dispatcher {
        use super::*;

        #[tokio::test]
        async fn test_returns_total_from_roller() {
            let correlator = Arc::new(RollCorrelator::new());
            let roller = answering_roller(correlator.clone(), 17);
            let dispatcher =
                RollDispatcher::new(Arc::new(roller), correlator.clone(), Duration::from_secs(1));

            assert_eq!(dispatcher.roll(&notation()).await, Ok(17));
            assert_eq!(correlator.pending_count(), 0);
        }

        #[tokio::test]
        async fn test_sends_formatted_notation() {
            let correlator = Arc::new(RollCorrelator::new());
            let mut roller = MockDiceRollerPort::new();
            let answer = correlator.clone();
            roller
                .expect_request_roll()
                .withf(|request| request.dice_notation == "2d12kh1+2 # Pistol")
                .times(1)
                .returning(move |request| {
                    answer.resolve(&DiceRollResult {
                        roll_id: request.roll_id,
                        total: 5,
                    });
                    Ok(())
                });
            let dispatcher =
                RollDispatcher::new(Arc::new(roller), correlator, Duration::from_secs(1));

            assert_eq!(dispatcher.roll(&notation()).await, Ok(5));
        }

        #[tokio::test(start_paused = true)]
        async fn test_silent_roller_times_out() {
            let correlator = Arc::new(RollCorrelator::new());
            let mut roller = MockDiceRollerPort::new();
            roller.expect_request_roll().times(1).returning(|_| Ok(()));
            let dispatcher = RollDispatcher::new(
                Arc::new(roller),
                correlator.clone(),
                Duration::from_millis(4000),
            );

            let result = dispatcher.roll(&notation()).await;

            assert_eq!(result, Err(RollError::TimedOut { after_ms: 4000 }));
            assert_eq!(correlator.pending_count(), 0);
        }

        #[tokio::test(start_paused = true)]
        async fn test_cancelled_roll_clears_pending_slot() {
            let correlator = Arc::new(RollCorrelator::new());
            let mut roller = MockDiceRollerPort::new();
            roller.expect_request_roll().times(1).returning(|_| Ok(()));
            let dispatcher = RollDispatcher::new(
                Arc::new(roller),
                correlator.clone(),
                Duration::from_secs(60),
            );

            let outer =
                tokio::time::timeout(Duration::from_millis(10), dispatcher.roll(&notation())).await;

            assert!(outer.is_err());
            assert_eq!(correlator.pending_count(), 0);
        }

        #[tokio::test]
        async fn test_transport_failure_clears_pending_roll() {
            let correlator = Arc::new(RollCorrelator::new());
            let mut roller = MockDiceRollerPort::new();
            roller
                .expect_request_roll()
                .returning(|_| Err(RollError::Transport("offline".into())));
            let dispatcher =
                RollDispatcher::new(Arc::new(roller), correlator.clone(), Duration::from_secs(1));

            let result = dispatcher.roll(&notation()).await;

            assert_eq!(result, Err(RollError::Transport("offline".into())));
            assert_eq!(correlator.pending_count(), 0);
        }
    }
}
