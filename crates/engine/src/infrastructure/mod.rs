//! Infrastructure: ports, settings and dice dispatch.

pub mod clock;
pub mod dice;
pub mod ports;
pub mod settings;

pub use clock::SystemClock;
pub use dice::{RollCorrelator, RollDispatcher, RollError};
pub use ports::{ClockPort, DiceRollerPort};
pub use settings::RelaySettings;
