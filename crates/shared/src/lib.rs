//! Whisperspace wire contracts
//!
//! Types shared between the calculation relay and its callers:
//! - Relay request/response bodies (camelCase JSON)
//! - Relay error bodies and codes
//! - Dice roller request/result messages
//!
//! No business logic lives here; validated requests hand off to the domain
//! crate for every calculation.

pub mod dice;
pub mod relay;
pub mod responses;

pub use dice::{DiceRollRequest, DiceRollResult, RollTarget};
pub use relay::{
    AttackInput, AttackOutcomeRequest, AttackOutcomeResponse, MissingFields, NotationRequestError,
    NotationResponse, SkillNotationRequest, DEFAULT_ATTACK_LABEL,
};
pub use responses::{ErrorBody, ErrorCode};
