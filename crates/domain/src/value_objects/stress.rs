//! Stress and composure state.

use serde::{Deserialize, Serialize};

use crate::lenient;

/// Stress above this value triggers a crucible test.
pub const CRUCIBLE_THRESHOLD: u32 = 5;

/// Stress counters as stored on the character document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StressState {
    #[serde(default, deserialize_with = "lenient::count")]
    pub current: u32,
    /// Cached derived composure (cool under fire)
    #[serde(default, deserialize_with = "lenient::count")]
    pub cuf: u32,
    /// Composure burned to force crucible successes
    #[serde(default, deserialize_with = "lenient::count")]
    pub cuf_loss: u32,
}

impl StressState {
    /// True when going from `before` to `after` crosses the crucible threshold.
    pub fn crosses_threshold(before: u32, after: u32) -> bool {
        before <= CRUCIBLE_THRESHOLD && after > CRUCIBLE_THRESHOLD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crossing_requires_starting_at_or_below_five() {
        assert!(StressState::crosses_threshold(5, 6));
        assert!(StressState::crosses_threshold(0, 9));
        assert!(!StressState::crosses_threshold(6, 8));
        assert!(!StressState::crosses_threshold(3, 5));
    }

    #[test]
    fn test_deserializes_camel_case_with_defaults() {
        let stress: StressState = serde_json::from_str(r#"{"current":2,"cufLoss":1}"#).expect("parse");
        assert_eq!(stress, StressState { current: 2, cuf: 0, cuf_loss: 1 });

        let stress: StressState = serde_json::from_str(r#"{"current":"3","cufLoss":-2}"#).expect("parse");
        assert_eq!(stress, StressState { current: 3, cuf: 0, cuf_loss: 0 });
    }
}
