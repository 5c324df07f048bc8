//! Value objects - Immutable objects defined by their attributes

mod dice;
mod stat;
mod stress;
mod wounds;

pub use dice::{build_skill_notation, NetDice, NotationError, RollNotation, DIE_SIZE, MAX_NET_DICE};
pub use stat::{Attribute, AttributeSet, StatKey};
pub use stress::{StressState, CRUCIBLE_THRESHOLD};
pub use wounds::{WoundFill, WoundTier, WoundTrack, WOUND_TRACK_CAPACITY};
