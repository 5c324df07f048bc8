//! Use cases - dice-driven flows over the rules engine.

pub mod attack;
pub mod initiative;

pub use attack::{AttackError, AttackRequest, AttackService};
pub use initiative::InitiativeService;
