//! Application composition.

use std::sync::Arc;

use whisperspace_domain::RulesEngine;

use crate::infrastructure::settings::RelaySettings;
use crate::infrastructure::{DiceRollerPort, RollCorrelator, RollDispatcher};

/// State shared by every relay request.
pub struct App {
    pub settings: RelaySettings,
    pub rules: RulesEngine<'static>,
    /// Rolls waiting on the host's dice roller
    pub rolls: Arc<RollCorrelator>,
}

impl App {
    pub fn new(settings: RelaySettings) -> Self {
        Self {
            settings,
            rules: RulesEngine::whisperspace(),
            rolls: Arc::new(RollCorrelator::new()),
        }
    }

    /// Dispatcher for `roller`, sharing this app's pending rolls and
    /// configured timeout.
    pub fn roll_dispatcher(&self, roller: Arc<dyn DiceRollerPort>) -> RollDispatcher {
        RollDispatcher::new(roller, self.rolls.clone(), self.settings.dice_roll_timeout)
    }
}
